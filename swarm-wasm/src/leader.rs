use std::f32::consts::TAU;

use crate::config::SwarmConfig;
use crate::math::Vec2;
use crate::SurfaceSize;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerSample {
    pub pos: Vec2,
    pub moved_at_ms: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeaderSource {
    Pointer,
    Autonomous,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Leader {
    pub pos: Vec2,
    pub forward: Vec2,
    pub source: LeaderSource,
}

pub fn autonomous_path(frame: u64, size: SurfaceSize, config: &SwarmConfig) -> Vec2 {
    let margin = config.leader_wrap_margin;
    let period = f64::from(size.width + 2.0 * margin).max(1.0);
    let travelled = frame as f64 * f64::from(config.leader_speed);
    let x = (travelled % period) as f32 - margin;

    let (amplitude, k) = sway(size, config);
    let y = size.height * 0.5 + (k * x).sin() * amplitude;
    Vec2::new(x, y)
}

pub fn path_tangent(frame: u64, size: SurfaceSize, config: &SwarmConfig) -> Vec2 {
    let x = autonomous_path(frame, size, config).x;
    let (amplitude, k) = sway(size, config);
    let dx = config.leader_speed;
    let dy = (k * x).cos() * amplitude * k * config.leader_speed;
    Vec2::new(dx, dy).normalize_or(Vec2::FORWARD)
}

fn sway(size: SurfaceSize, config: &SwarmConfig) -> (f32, f32) {
    let amplitude = size.height * config.leader_amplitude;
    let k = TAU * config.leader_waves / size.width.max(1.0);
    (amplitude, k)
}

/// Pointer while it moved within the idle threshold, autonomous otherwise.
/// The switch is a plain comparison with no hysteresis or blending.
pub fn select_leader(
    pointer: Option<&PointerSample>,
    now_ms: f64,
    frame: u64,
    size: SurfaceSize,
    config: &SwarmConfig,
) -> Leader {
    let forward = path_tangent(frame, size, config);

    match pointer {
        Some(sample) if now_ms - sample.moved_at_ms < config.cursor_idle_ms => Leader {
            pos: sample.pos,
            forward,
            source: LeaderSource::Pointer,
        },
        _ => Leader {
            pos: autonomous_path(frame, size, config),
            forward,
            source: LeaderSource::Autonomous,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{autonomous_path, path_tangent, select_leader, LeaderSource, PointerSample};
    use crate::config::SwarmConfig;
    use crate::math::Vec2;
    use crate::SurfaceSize;
    use approx::assert_relative_eq;

    const SIZE: SurfaceSize = SurfaceSize {
        width: 800.0,
        height: 600.0,
    };

    #[test]
    fn pointer_leads_until_idle_threshold() {
        let config = SwarmConfig {
            cursor_idle_ms: 1_400.0,
            ..SwarmConfig::default()
        };
        let sample = PointerSample {
            pos: Vec2::new(120.0, 80.0),
            moved_at_ms: 0.0,
        };

        for now in [0.0, 16.7, 700.0, 1_399.9] {
            let leader = select_leader(Some(&sample), now, 10, SIZE, &config);
            assert_eq!(leader.source, LeaderSource::Pointer, "t={now}");
            assert_eq!(leader.pos, sample.pos);
        }

        for now in [1_400.0, 1_450.0, 1_500.0] {
            let leader = select_leader(Some(&sample), now, 10, SIZE, &config);
            assert_eq!(leader.source, LeaderSource::Autonomous, "t={now}");
            assert_eq!(leader.pos, autonomous_path(10, SIZE, &config));
        }
    }

    #[test]
    fn no_pointer_means_autonomous() {
        let config = SwarmConfig::default();
        let leader = select_leader(None, 0.0, 0, SIZE, &config);
        assert_eq!(leader.source, LeaderSource::Autonomous);
    }

    #[test]
    fn path_wraps_back_off_the_left_edge() {
        let config = SwarmConfig::default();
        let period = f64::from(SIZE.width + 2.0 * config.leader_wrap_margin);
        let frames_per_lap = (period / f64::from(config.leader_speed)).floor() as u64 + 1;

        let start = autonomous_path(0, SIZE, &config);
        assert_relative_eq!(start.x, -config.leader_wrap_margin);

        let late = autonomous_path(frames_per_lap - 1, SIZE, &config);
        assert!(late.x > SIZE.width);

        let wrapped = autonomous_path(frames_per_lap, SIZE, &config);
        assert!(wrapped.x < 0.0);
    }

    #[test]
    fn path_sways_within_amplitude() {
        let config = SwarmConfig::default();
        let amplitude = SIZE.height * config.leader_amplitude;
        for frame in (0..5_000).step_by(7) {
            let p = autonomous_path(frame, SIZE, &config);
            assert!((p.y - SIZE.height * 0.5).abs() <= amplitude + 1e-3);
        }
    }

    #[test]
    fn stationary_path_falls_back_to_forward_axis() {
        let config = SwarmConfig {
            leader_speed: 0.0,
            ..SwarmConfig::default()
        };
        assert_eq!(path_tangent(42, SIZE, &config), Vec2::FORWARD);
    }

    #[test]
    fn tangent_is_unit_length() {
        let config = SwarmConfig::default();
        for frame in [0, 100, 1_000, 10_000] {
            assert_relative_eq!(path_tangent(frame, SIZE, &config).length(), 1.0, epsilon = 1e-5);
        }
    }
}
