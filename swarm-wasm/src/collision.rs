use crate::config::SwarmConfig;
use crate::population::Agent;

/// Pushes overlapping agents apart. Purely positional: velocities are only
/// damped, never redirected, so the force model is left alone.
///
/// Returns the number of pair corrections applied across all passes.
pub fn relax(agents: &mut [Agent], config: &SwarmConfig) -> usize {
    let min_dist = config.separation_radius * config.collision_overlap;
    let min_dist_sq = min_dist * min_dist;
    let damping = config.collision_damping;
    let mut corrections = 0;

    for _ in 0..config.collision_iters {
        for i in 0..agents.len() {
            let (head, tail) = agents.split_at_mut(i + 1);
            let a = &mut head[i];
            for b in tail.iter_mut() {
                let delta = b.pos - a.pos;
                let dist_sq = delta.length_sq();
                // Coincident agents have no separating axis; leave them to
                // steering.
                if dist_sq <= 0.0 || dist_sq >= min_dist_sq {
                    continue;
                }

                let dist = dist_sq.sqrt();
                let overlap = (min_dist - dist) * 0.5;
                let push = delta * (overlap / dist);
                a.pos -= push;
                b.pos += push;
                a.vel = a.vel * damping;
                b.vel = b.vel * damping;
                corrections += 1;
            }
        }
    }

    corrections
}
