use log::{debug, info, warn};

use crate::collision::relax;
use crate::config::{ConfigError, SwarmConfig};
use crate::leader::{select_leader, LeaderSource, PointerSample};
use crate::math::{clamp_speed, Vec2};
use crate::population::{spawn_population, Agent};
use crate::render::{draw_swarm, RenderSurface, TriangleStyle};
use crate::steering::SteeringEngine;
use crate::SurfaceSize;

/// Latest value of every host signal. The host overwrites fields from its
/// event callbacks; the swarm reads a snapshot once per tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HostSignals {
    pub size: SurfaceSize,
    pub theme_color: String,
    pub pointer: Option<PointerSample>,
    pub reduced_motion: bool,
}

impl HostSignals {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32, now_ms: f64) {
        self.pointer = Some(PointerSample {
            pos: Vec2::new(x, y),
            moved_at_ms: now_ms,
        });
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameReport {
    pub frame: u64,
    pub leader: Option<LeaderSource>,
    pub drawn: bool,
    pub corrections: usize,
}

pub struct Swarm {
    config: SwarmConfig,
    agents: Vec<Agent>,
    clock: u64,
    size: SurfaceSize,
    steering: SteeringEngine,
    surface_degenerate: bool,
}

impl Swarm {
    pub fn new(config: SwarmConfig, size: SurfaceSize) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut swarm = Self {
            steering: SteeringEngine::new(&config),
            config,
            agents: Vec::new(),
            clock: 0,
            size,
            surface_degenerate: size.is_degenerate(),
        };
        if !swarm.surface_degenerate {
            swarm.spawn();
        }
        Ok(swarm)
    }

    pub fn config(&self) -> &SwarmConfig {
        &self.config
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Frames simulated so far. Frozen while reduced motion is requested.
    pub fn frame(&self) -> u64 {
        self.clock
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    pub fn reset(&mut self) {
        self.agents.clear();
        self.clock = 0;
        if !self.size.is_degenerate() {
            self.spawn();
        }
    }

    pub fn set_count(&mut self, count: usize) -> Result<(), ConfigError> {
        let config = self.config.with_count(count);
        config.validate()?;

        info!("population changed from {} to {}", self.config.count, count);
        self.steering = SteeringEngine::new(&config);
        self.config = config;
        self.reset();
        Ok(())
    }

    pub fn resize(&mut self, size: SurfaceSize) {
        if size.is_degenerate() || size == self.size {
            return;
        }

        info!(
            "surface resized from {}x{} to {}x{}",
            self.size.width, self.size.height, size.width, size.height
        );
        self.size = size;
        let left = -self.config.spawn_inset;
        for agent in &mut self.agents {
            agent.pos.x = agent.pos.x.clamp(left, size.width);
            agent.pos.y = agent.pos.y.clamp(0.0, size.height);
        }
    }

    pub fn tick<S: RenderSurface + ?Sized>(
        &mut self,
        now_ms: f64,
        signals: &HostSignals,
        surface: &mut S,
    ) -> FrameReport {
        let mut report = FrameReport {
            frame: self.clock,
            leader: None,
            drawn: false,
            corrections: 0,
        };

        if signals.size.is_degenerate() {
            if !self.surface_degenerate {
                warn!(
                    "surface is {}x{}; pausing until it has an area",
                    signals.size.width, signals.size.height
                );
                self.surface_degenerate = true;
            }
            return report;
        }
        if self.surface_degenerate {
            info!("surface restored to {}x{}", signals.size.width, signals.size.height);
            self.surface_degenerate = false;
        }

        self.resize(signals.size);
        if self.agents.is_empty() {
            self.spawn();
        }

        if !signals.reduced_motion {
            let leader = select_leader(
                signals.pointer.as_ref(),
                now_ms,
                self.clock,
                self.size,
                &self.config,
            );
            self.steering
                .step(&mut self.agents, &leader, self.clock, self.size, &self.config);
            report.corrections = relax(&mut self.agents, &self.config);

            // Reflection boosts and collision damping may nudge speeds out of
            // the band; agents leave every tick inside it.
            for agent in &mut self.agents {
                agent.vel = clamp_speed(agent.vel, self.config.min_speed, self.config.max_speed);
            }

            report.leader = Some(leader.source);
            self.clock += 1;
        }

        let style = TriangleStyle::from_theme(&signals.theme_color, &self.config);
        draw_swarm(surface, &self.agents, self.size, &style, &self.config);
        report.drawn = true;

        report
    }

    fn spawn(&mut self) {
        self.agents = spawn_population(&self.config, self.size.height);
        self.clock = 0;
        debug!(
            "spawned {} agents at x={} around y={}",
            self.agents.len(),
            -self.config.spawn_inset,
            self.size.height * 0.5
        );
    }
}
