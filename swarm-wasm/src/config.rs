use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_POPULATION: usize = 5_000;
pub const DEFAULT_COLOR: &str = "#0a0a0a";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("population must contain at least one agent")]
    EmptyPopulation,
    #[error("population {count} exceeds the supported maximum of {max}")]
    PopulationTooLarge { count: usize, max: usize },
    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: &'static str, value: f64 },
    #[error("{field} must be greater than zero, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },
    #[error("min_speed {min} must not exceed max_speed {max}")]
    SpeedRange { min: f32, max: f32 },
    #[error("{field} must lie in {range}, got {value}")]
    OutOfRange {
        field: &'static str,
        range: &'static str,
        value: f64,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NeighborQuery {
    #[default]
    AllPairs,
    Grid,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SwarmConfig {
    // Flock size/shape
    pub count: usize,
    pub side: f32,
    pub neighbor_radius: f32,
    pub separation_radius: f32,
    pub collision_iters: u32,
    pub neighbor_query: NeighborQuery,

    // Kinematics
    pub max_speed: f32,
    pub min_speed: f32,
    pub max_force: f32,
    pub align_weight: f32,
    pub cohere_weight: f32,
    pub separate_weight: f32,

    // Leader + behavior
    pub drift: f32,
    pub leader_weight: f32,
    pub leader_speed: f32,
    pub leader_amplitude: f32,
    pub leader_waves: f32,
    pub leader_wrap_margin: f32,
    pub cursor_idle_ms: f64,

    // Formation: inverted funnel
    pub base_gap: f32,
    pub gap_step: f32,
    pub lateral_spread: f32,
    pub funnel_curve: f32,
    /// Growth of tier populations toward the tail. Follows `funnel_curve`
    /// when unset.
    pub tier_growth: Option<f32>,
    pub slot_follow: f32,
    pub jitter_seed_base: u32,
    pub jitter_tier_stride: u32,

    // Spawn + warm-up
    pub spawn_inset: f32,
    pub spawn_spread: f32,
    pub spawn_seed: u32,
    pub warmup_frames: u32,

    // Boundaries + collisions
    pub boundary_margin: f32,
    pub restitution: f32,
    pub collision_overlap: f32,
    pub collision_damping: f32,

    // Drawing
    pub stroke_width: f32,
    pub fill_alpha: u8,
    pub stroke_alpha: u8,
    pub fallback_color: String,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            count: 38,
            side: 14.0,
            neighbor_radius: 100.0,
            separation_radius: 46.0,
            collision_iters: 2,
            neighbor_query: NeighborQuery::AllPairs,

            max_speed: 1.25,
            min_speed: 0.28,
            max_force: 0.035,
            align_weight: 0.8,
            cohere_weight: 0.6,
            separate_weight: 1.3,

            drift: 0.16,
            leader_weight: 0.8,
            leader_speed: 0.65,
            leader_amplitude: 0.30,
            leader_waves: 1.2,
            leader_wrap_margin: 120.0,
            cursor_idle_ms: 1_400.0,

            base_gap: 24.0,
            gap_step: 12.0,
            lateral_spread: 10.0,
            funnel_curve: 1.08,
            tier_growth: None,
            slot_follow: 0.65,
            jitter_seed_base: 1_000,
            jitter_tier_stride: 409,

            spawn_inset: 80.0,
            spawn_spread: 80.0,
            spawn_seed: 1_337,
            warmup_frames: 240,

            boundary_margin: 8.0,
            restitution: 1.04,
            collision_overlap: 0.95,
            collision_damping: 0.985,

            stroke_width: 1.2,
            fill_alpha: 0x14,
            stroke_alpha: 0x80,
            fallback_color: DEFAULT_COLOR.to_string(),
        }
    }
}

impl SwarmConfig {
    pub fn with_count(&self, count: usize) -> Self {
        Self {
            count,
            ..self.clone()
        }
    }

    pub fn tier_growth(&self) -> f32 {
        self.tier_growth.unwrap_or(self.funnel_curve)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.count == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.count > MAX_POPULATION {
            return Err(ConfigError::PopulationTooLarge {
                count: self.count,
                max: MAX_POPULATION,
            });
        }

        positive("side", self.side)?;
        positive("neighbor_radius", self.neighbor_radius)?;
        positive("separation_radius", self.separation_radius)?;
        positive("max_speed", self.max_speed)?;
        positive("max_force", self.max_force)?;
        positive("funnel_curve", self.funnel_curve)?;
        if let Some(growth) = self.tier_growth {
            positive("tier_growth", growth)?;
        }

        for (field, value) in [
            ("min_speed", self.min_speed),
            ("align_weight", self.align_weight),
            ("cohere_weight", self.cohere_weight),
            ("separate_weight", self.separate_weight),
            ("drift", self.drift),
            ("leader_weight", self.leader_weight),
            ("leader_speed", self.leader_speed),
            ("leader_amplitude", self.leader_amplitude),
            ("leader_waves", self.leader_waves),
            ("leader_wrap_margin", self.leader_wrap_margin),
            ("base_gap", self.base_gap),
            ("gap_step", self.gap_step),
            ("lateral_spread", self.lateral_spread),
            ("slot_follow", self.slot_follow),
            ("spawn_inset", self.spawn_inset),
            ("spawn_spread", self.spawn_spread),
            ("boundary_margin", self.boundary_margin),
            ("stroke_width", self.stroke_width),
        ] {
            non_negative(field, value)?;
        }

        if !self.cursor_idle_ms.is_finite() {
            return Err(ConfigError::NonFinite {
                field: "cursor_idle_ms",
                value: self.cursor_idle_ms,
            });
        }
        if self.cursor_idle_ms < 0.0 {
            return Err(ConfigError::Negative {
                field: "cursor_idle_ms",
                value: self.cursor_idle_ms,
            });
        }

        if self.min_speed > self.max_speed {
            return Err(ConfigError::SpeedRange {
                min: self.min_speed,
                max: self.max_speed,
            });
        }

        finite("restitution", self.restitution)?;
        if self.restitution < 1.0 {
            return Err(ConfigError::OutOfRange {
                field: "restitution",
                range: "[1, inf)",
                value: f64::from(self.restitution),
            });
        }
        unit_interval("collision_overlap", self.collision_overlap)?;
        unit_interval("collision_damping", self.collision_damping)?;

        Ok(())
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite {
            field,
            value: f64::from(value),
        })
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value <= 0.0 {
        return Err(ConfigError::NonPositive {
            field,
            value: f64::from(value),
        });
    }
    Ok(())
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(ConfigError::Negative {
            field,
            value: f64::from(value),
        });
    }
    Ok(())
}

fn unit_interval(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value <= 0.0 || value > 1.0 {
        return Err(ConfigError::OutOfRange {
            field,
            range: "(0, 1]",
            value: f64::from(value),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, NeighborQuery, SwarmConfig, MAX_POPULATION};

    #[test]
    fn defaults_are_valid() {
        assert_eq!(SwarmConfig::default().validate(), Ok(()));
    }

    #[test]
    fn empty_population_is_rejected() {
        let config = SwarmConfig::default().with_count(0);
        assert_eq!(config.validate(), Err(ConfigError::EmptyPopulation));

        let config = SwarmConfig::default().with_count(MAX_POPULATION + 1);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::PopulationTooLarge { .. })
        ));
    }

    #[test]
    fn non_positive_radii_are_rejected() {
        let config = SwarmConfig {
            separation_radius: 0.0,
            ..SwarmConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive {
                field: "separation_radius",
                ..
            })
        ));

        let config = SwarmConfig {
            neighbor_radius: f32::NAN,
            ..SwarmConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFinite {
                field: "neighbor_radius",
                ..
            })
        ));
    }

    #[test]
    fn inverted_speed_band_is_rejected() {
        let config = SwarmConfig {
            min_speed: 2.0,
            max_speed: 1.0,
            ..SwarmConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SpeedRange { .. })
        ));
    }

    #[test]
    fn damping_must_not_amplify() {
        let config = SwarmConfig {
            collision_damping: 1.2,
            ..SwarmConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange {
                field: "collision_damping",
                ..
            })
        ));
    }

    #[test]
    fn error_messages_name_the_field() {
        let err = ConfigError::NonPositive {
            field: "side",
            value: -1.0,
        };
        assert_eq!(err.to_string(), "side must be greater than zero, got -1");
    }

    #[test]
    fn tier_growth_follows_funnel_curve_unless_set() {
        let config = SwarmConfig {
            funnel_curve: 2.12,
            ..SwarmConfig::default()
        };
        assert_eq!(config.tier_growth(), 2.12);

        let config = SwarmConfig {
            tier_growth: Some(1.5),
            ..config
        };
        assert_eq!(config.tier_growth(), 1.5);

        let config = SwarmConfig {
            tier_growth: Some(0.0),
            ..config
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive {
                field: "tier_growth",
                ..
            })
        ));
    }

    #[test]
    fn neighbor_query_defaults_to_all_pairs() {
        assert_eq!(NeighborQuery::default(), NeighborQuery::AllPairs);
    }
}
