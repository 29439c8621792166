use log::debug;
use std::f32::consts::TAU;

use crate::config::SwarmConfig;
use crate::math::Vec2;
use crate::rng::{slot_jitter, Mulberry32};

const MIN_TIERS: usize = 6;
const SPAWN_HEADING_SPREAD: f32 = 0.2;
const SPAWN_SPEED_MIN: f32 = 0.25;
const SPAWN_SPEED_RANGE: f32 = 0.25;
const SPAWN_DRIFT_SHARE: f32 = 0.7;

#[derive(Clone, Debug, PartialEq)]
pub struct Agent {
    pub pos: Vec2,
    pub vel: Vec2,
    tier: u32,
    slot_jitter: f32,
}

impl Agent {
    pub fn new(pos: Vec2, vel: Vec2, tier: u32, slot_jitter: f32) -> Self {
        Self {
            pos,
            vel,
            tier,
            slot_jitter,
        }
    }

    pub fn tier(&self) -> u32 {
        self.tier
    }

    pub fn slot_jitter(&self) -> f32 {
        self.slot_jitter
    }
}

pub fn tier_count(count: usize) -> usize {
    let by_sqrt = (count as f64).sqrt().ceil() as usize + 2;
    by_sqrt.max(MIN_TIERS).min(count)
}

/// Splits `count` agents across depth tiers with geometrically growing
/// weights, deeper tiers holding more. The result always sums to `count`
/// and no tier is empty.
pub fn allocate_tiers(count: usize, growth: f32) -> Vec<usize> {
    let tiers = tier_count(count);
    if tiers == 0 {
        return Vec::new();
    }

    let growth = f64::from(growth);
    let weights: Vec<f64> = (0..tiers).map(|d| growth.powi(d as i32)).collect();
    let total: f64 = weights.iter().sum();

    let mut allocated: Vec<usize> = weights
        .iter()
        .map(|w| {
            let share = (w / total * count as f64).round();
            if share.is_finite() {
                (share as usize).max(1)
            } else {
                1
            }
        })
        .collect();
    let mut sum: usize = allocated.iter().sum();

    // Trim surplus from the tail first; tiers <= count guarantees termination.
    while sum > count {
        for slot in allocated.iter_mut().rev() {
            if sum == count {
                break;
            }
            if *slot > 1 {
                *slot -= 1;
                sum -= 1;
            }
        }
    }
    if sum < count {
        if let Some(deepest) = allocated.last_mut() {
            *deepest += count - sum;
        }
    }

    allocated
}

pub fn spawn_population(config: &SwarmConfig, height: f32) -> Vec<Agent> {
    let allocation = allocate_tiers(config.count, config.tier_growth());
    debug!(
        "spawning {} agents across {} tiers: {:?}",
        config.count,
        allocation.len(),
        allocation
    );

    let mut rng = Mulberry32::new(config.spawn_seed);
    let mut agents = Vec::with_capacity(config.count);

    for (tier, &size) in allocation.iter().enumerate() {
        let tier = tier as u32;
        for _ in 0..size {
            let index = agents.len() as u32;

            let angle = rng.next_f32() * TAU;
            let radius = rng.next_f32() * config.spawn_spread;
            let pos = Vec2::new(
                -config.spawn_inset + angle.cos() * radius,
                height * 0.5 + angle.sin() * radius,
            );

            let heading = (rng.next_f32() - 0.5) * SPAWN_HEADING_SPREAD;
            let speed = SPAWN_SPEED_MIN + rng.next_f32() * SPAWN_SPEED_RANGE;
            let vel = Vec2::new(
                heading.cos() * speed + config.drift * SPAWN_DRIFT_SHARE,
                heading.sin() * speed,
            );

            let jitter = slot_jitter(
                config.jitter_seed_base,
                config.jitter_tier_stride,
                tier,
                index,
            );
            agents.push(Agent::new(pos, vel, tier, jitter));
        }
    }

    agents
}
