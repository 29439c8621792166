use std::f32::consts::TAU;

use crate::config::SwarmConfig;
use crate::math::Vec2;
use crate::population::Agent;
use crate::SurfaceSize;

const THIRD_TURN: f32 = TAU / 3.0;

pub trait RenderSurface {
    fn clear(&mut self, size: SurfaceSize);

    fn draw_triangle(&mut self, vertices: [Vec2; 3], style: &TriangleStyle);
}

/// Theme color plus the opacities it is filled and stroked with. Opacity is
/// kept apart from the color so any CSS color syntax works.
#[derive(Clone, Debug, PartialEq)]
pub struct TriangleStyle {
    pub color: String,
    pub fill_opacity: f32,
    pub stroke_opacity: f32,
    pub stroke_width: f32,
}

impl TriangleStyle {
    pub fn from_theme(theme_color: &str, config: &SwarmConfig) -> Self {
        let color = match theme_color.trim() {
            "" => config.fallback_color.clone(),
            color => color.to_string(),
        };
        Self {
            color,
            fill_opacity: opacity(config.fill_alpha),
            stroke_opacity: opacity(config.stroke_alpha),
            stroke_width: config.stroke_width,
        }
    }
}

fn opacity(alpha: u8) -> f32 {
    f32::from(alpha) / f32::from(u8::MAX)
}

pub fn triangle_vertices(center: Vec2, heading: f32, side: f32) -> [Vec2; 3] {
    let radius = side / 3.0_f32.sqrt();
    [heading, heading + THIRD_TURN, heading - THIRD_TURN]
        .map(|angle| center + Vec2::new(angle.cos(), angle.sin()) * radius)
}

pub fn draw_swarm<S: RenderSurface + ?Sized>(
    surface: &mut S,
    agents: &[Agent],
    size: SurfaceSize,
    style: &TriangleStyle,
    config: &SwarmConfig,
) {
    surface.clear(size);
    for agent in agents {
        let vertices = triangle_vertices(agent.pos, agent.vel.angle(), config.side);
        surface.draw_triangle(vertices, style);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{draw_swarm, triangle_vertices, RenderSurface, TriangleStyle};
    use crate::config::SwarmConfig;
    use crate::math::Vec2;
    use crate::population::Agent;
    use crate::SurfaceSize;
    use approx::assert_relative_eq;

    #[derive(Clone, Debug, PartialEq)]
    pub(crate) struct DrawnTriangle {
        pub vertices: [Vec2; 3],
        pub style: TriangleStyle,
    }

    #[derive(Default)]
    pub(crate) struct RecordingSurface {
        pub clears: usize,
        pub triangles: Vec<DrawnTriangle>,
    }

    impl RenderSurface for RecordingSurface {
        fn clear(&mut self, _size: SurfaceSize) {
            self.clears += 1;
            self.triangles.clear();
        }

        fn draw_triangle(&mut self, vertices: [Vec2; 3], style: &TriangleStyle) {
            self.triangles.push(DrawnTriangle {
                vertices,
                style: style.clone(),
            });
        }
    }

    #[test]
    fn triangle_is_equilateral_and_centered() {
        let center = Vec2::new(50.0, 20.0);
        let [a, b, c] = triangle_vertices(center, 0.7, 14.0);

        for (p, q) in [(a, b), (b, c), (c, a)] {
            assert_relative_eq!(p.distance_sq(q).sqrt(), 14.0, epsilon = 1e-4);
        }
        let centroid = (a + b + c) * (1.0 / 3.0);
        assert_relative_eq!(centroid.x, center.x, epsilon = 1e-4);
        assert_relative_eq!(centroid.y, center.y, epsilon = 1e-4);
    }

    #[test]
    fn nose_points_along_heading() {
        let [nose, _, _] = triangle_vertices(Vec2::ZERO, 0.0, 14.0);
        assert_relative_eq!(nose.x, 14.0 / 3.0_f32.sqrt(), epsilon = 1e-5);
        assert_relative_eq!(nose.y, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn fill_is_fainter_than_stroke_for_any_color_syntax() {
        let config = SwarmConfig::default();
        for theme in ["#0a0a0a", "#fff", "rgb(10, 10, 10)", "oklch(0.2 0 0)", "rebeccapurple"] {
            let style = TriangleStyle::from_theme(theme, &config);
            assert_eq!(style.color, theme);
            assert!(style.fill_opacity < style.stroke_opacity, "{theme}");
            assert!(style.stroke_opacity < 1.0, "{theme}");
        }
    }

    #[test]
    fn opacities_come_from_alpha_bytes() {
        let style = TriangleStyle::from_theme("#0a0a0a", &SwarmConfig::default());
        assert_relative_eq!(style.fill_opacity, 20.0 / 255.0);
        assert_relative_eq!(style.stroke_opacity, 128.0 / 255.0);
    }

    #[test]
    fn blank_theme_uses_fallback() {
        let style = TriangleStyle::from_theme("  ", &SwarmConfig::default());
        assert_eq!(style.color, "#0a0a0a");
    }

    #[test]
    fn draws_one_triangle_per_agent() {
        let config = SwarmConfig::default();
        let agents = vec![
            Agent::new(Vec2::new(10.0, 10.0), Vec2::new(1.0, 0.0), 0, 0.0),
            Agent::new(Vec2::new(40.0, 10.0), Vec2::ZERO, 1, 0.0),
        ];
        let style = TriangleStyle::from_theme("#e5e5e5", &config);
        let mut surface = RecordingSurface::default();

        draw_swarm(
            &mut surface,
            &agents,
            SurfaceSize::new(100.0, 100.0),
            &style,
            &config,
        );

        assert_eq!(surface.clears, 1);
        assert_eq!(surface.triangles.len(), 2);
        assert_eq!(surface.triangles[0].style.color, "#e5e5e5");
        assert_eq!(surface.triangles[1].style.stroke_width, config.stroke_width);
        // Zero velocity draws with heading 0.
        assert_eq!(
            surface.triangles[1].vertices,
            triangle_vertices(Vec2::new(40.0, 10.0), 0.0, config.side)
        );
    }
}
