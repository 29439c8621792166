use crate::config::{NeighborQuery, SwarmConfig};
use crate::leader::Leader;
use crate::math::{clamp01, clamp_speed, limit_magnitude, steer_towards, Vec2, EPSILON};
use crate::neighbor_grid::NeighborGrid;
use crate::population::Agent;
use crate::SurfaceSize;

const DRIFT_FORCE_SHARE: f32 = 0.5;

pub fn warmup_ramp(frame: u64, warmup_frames: u32) -> f32 {
    if warmup_frames == 0 {
        return 1.0;
    }
    clamp01((frame as f64 / f64::from(warmup_frames)) as f32)
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NeighborSums {
    pub count: usize,
    pub velocity: Vec2,
    pub position: Vec2,
    pub repulsion: Vec2,
}

impl NeighborSums {
    fn accumulate(&mut self, me: &Agent, other: &Agent, separation_radius_sq: f32) {
        let offset = other.pos - me.pos;
        let dist_sq = offset.length_sq();
        // Coincident agents give no usable direction.
        if dist_sq <= EPSILON {
            return;
        }

        self.count += 1;
        self.velocity += other.vel;
        self.position += other.pos;

        if dist_sq < separation_radius_sq {
            self.repulsion -= offset * (1.0 / dist_sq);
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SteeringForces {
    pub alignment: Vec2,
    pub cohesion: Vec2,
    pub separation: Vec2,
    pub leader: Vec2,
    pub slot: Vec2,
    pub drift: Vec2,
}

impl SteeringForces {
    pub fn compute(
        agent: &Agent,
        sums: &NeighborSums,
        leader: &Leader,
        config: &SwarmConfig,
    ) -> Self {
        let max_speed = config.max_speed;
        let max_force = config.max_force;
        let mut forces = SteeringForces::default();

        if sums.count > 0 {
            let n = sums.count as f32;
            forces.alignment =
                steer_towards(sums.velocity * (1.0 / n), agent.vel, max_speed, max_force);
            forces.cohesion = steer_towards(
                sums.position * (1.0 / n) - agent.pos,
                agent.vel,
                max_speed,
                max_force,
            );
            forces.separation = steer_towards(sums.repulsion, agent.vel, max_speed, max_force);
        }

        forces.leader = steer_towards(leader.pos - agent.pos, agent.vel, max_speed, max_force);

        let slot = slot_target(agent, leader, config);
        forces.slot = steer_towards(slot - agent.pos, agent.vel, max_speed, max_force);

        forces.drift = limit_magnitude(
            Vec2::new(config.drift, 0.0) - agent.vel,
            max_force * DRIFT_FORCE_SHARE,
        );

        forces
    }

    pub fn blend(&self, ramp: f32, config: &SwarmConfig) -> Vec2 {
        self.alignment * (config.align_weight * ramp)
            + self.cohesion * (config.cohere_weight * ramp)
            + self.separation * config.separate_weight
            + self.leader * (config.leader_weight * ramp)
            + self.slot * config.slot_follow
            + self.drift
    }
}

pub fn slot_target(agent: &Agent, leader: &Leader, config: &SwarmConfig) -> Vec2 {
    let depth = agent.tier() as f32;
    let longitudinal = config.base_gap + config.gap_step * depth;
    let spread = config.lateral_spread * config.funnel_curve.powf(depth);
    let lateral = agent.slot_jitter() * spread;

    let forward = leader.forward.normalize_or(Vec2::FORWARD);
    leader.pos - forward * longitudinal + forward.perp() * lateral
}

pub fn reflect(agent: &mut Agent, size: SurfaceSize, config: &SwarmConfig) -> bool {
    let margin = config.boundary_margin;
    let boost = config.restitution;
    let mut hit = false;

    let left = -config.spawn_inset;
    let right = size.width - margin;
    if agent.pos.x < left {
        agent.pos.x = left;
        agent.vel.x = agent.vel.x.abs() * boost;
        hit = true;
    } else if agent.pos.x > right {
        agent.pos.x = right;
        agent.vel.x = -agent.vel.x.abs() * boost;
        hit = true;
    }

    let top = margin;
    let bottom = size.height - margin;
    if agent.pos.y < top {
        agent.pos.y = top;
        agent.vel.y = agent.vel.y.abs() * boost;
        hit = true;
    } else if agent.pos.y > bottom {
        agent.pos.y = bottom;
        agent.vel.y = -agent.vel.y.abs() * boost;
        hit = true;
    }

    hit
}

pub struct SteeringEngine {
    grid: NeighborGrid,
    positions: Vec<Vec2>,
    sums: Vec<NeighborSums>,
    accel: Vec<Vec2>,
}

impl SteeringEngine {
    pub fn new(config: &SwarmConfig) -> Self {
        Self {
            grid: NeighborGrid::new(config.neighbor_radius),
            positions: Vec::with_capacity(config.count),
            sums: Vec::with_capacity(config.count),
            accel: Vec::with_capacity(config.count),
        }
    }

    pub fn scan_neighbors(
        &mut self,
        agents: &[Agent],
        size: SurfaceSize,
        config: &SwarmConfig,
    ) -> &[NeighborSums] {
        let neighbor_radius_sq = config.neighbor_radius * config.neighbor_radius;
        let separation_radius_sq = config.separation_radius * config.separation_radius;

        self.sums.clear();
        self.sums.resize(agents.len(), NeighborSums::default());

        match config.neighbor_query {
            NeighborQuery::AllPairs => {
                for (i, me) in agents.iter().enumerate() {
                    let sums = &mut self.sums[i];
                    for (j, other) in agents.iter().enumerate() {
                        if i == j || me.pos.distance_sq(other.pos) >= neighbor_radius_sq {
                            continue;
                        }
                        sums.accumulate(me, other, separation_radius_sq);
                    }
                }
            }
            NeighborQuery::Grid => {
                self.positions.clear();
                self.positions.extend(agents.iter().map(|a| a.pos));
                self.grid.rebuild(
                    &self.positions,
                    Vec2::new(-config.spawn_inset, 0.0),
                    Vec2::new(size.width, size.height),
                );

                let grid = &self.grid;
                for (i, me) in agents.iter().enumerate() {
                    let sums = &mut self.sums[i];
                    grid.for_each_neighbor(i, config.neighbor_radius, |j| {
                        sums.accumulate(me, &agents[j], separation_radius_sq);
                    });
                }
            }
        }

        &self.sums
    }

    /// One steering + integration step. All forces are computed from the
    /// same snapshot of the swarm before any agent moves.
    pub fn step(
        &mut self,
        agents: &mut [Agent],
        leader: &Leader,
        frame: u64,
        size: SurfaceSize,
        config: &SwarmConfig,
    ) {
        let ramp = warmup_ramp(frame, config.warmup_frames);
        self.scan_neighbors(agents, size, config);

        self.accel.clear();
        self.accel.extend(agents.iter().zip(&self.sums).map(|(agent, sums)| {
            SteeringForces::compute(agent, sums, leader, config).blend(ramp, config)
        }));

        for (agent, accel) in agents.iter_mut().zip(&self.accel) {
            agent.vel = clamp_speed(agent.vel + *accel, config.min_speed, config.max_speed);
            agent.pos += agent.vel;
            reflect(agent, size, config);
        }
    }
}
