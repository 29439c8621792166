use wasm_bindgen::prelude::*;

pub mod collision;
pub mod config;
pub mod leader;
pub mod math;
pub mod neighbor_grid;
pub mod population;
pub mod render;
pub mod rng;
pub mod steering;
pub mod swarm;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{ConfigError, NeighborQuery, SwarmConfig};
pub use leader::{Leader, LeaderSource, PointerSample};
pub use math::Vec2;
pub use population::Agent;
pub use render::{RenderSurface, TriangleStyle};
pub use swarm::{FrameReport, HostSignals, Swarm};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SurfaceSize {
    pub width: f32,
    pub height: f32,
}

impl SurfaceSize {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_degenerate(self) -> bool {
        let finite = self.width.is_finite() && self.height.is_finite();
        !(finite && self.width >= 1.0 && self.height >= 1.0)
    }
}

#[wasm_bindgen]
pub fn version() -> String {
    format!("swarm-wasm {}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::SurfaceSize;

    #[test]
    fn degenerate_sizes() {
        assert!(SurfaceSize::new(0.0, 600.0).is_degenerate());
        assert!(SurfaceSize::new(800.0, 0.5).is_degenerate());
        assert!(SurfaceSize::new(f32::NAN, 600.0).is_degenerate());
        assert!(SurfaceSize::new(f32::INFINITY, 600.0).is_degenerate());
        assert!(!SurfaceSize::new(800.0, 600.0).is_degenerate());
    }
}
