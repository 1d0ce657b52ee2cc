// Traffic points and their drawing strategies
//
// A TrafficPoint is one simulated particle traveling along an edge. Its
// renderer is picked once at spawn time and fixed for the point's lifetime:
// successful request traffic paints a small circle in the edge's stroke
// color, error traffic paints a concentric diamond pair in the error
// palette, TCP traffic paints a neutral circle.

use ratatui::style::Color;

use super::geometry::Point;
use super::surface::{DrawSurface, PaintStyle, SurfaceError};
use crate::theme::{FAILING_RED, TCP_POINT_FILL, TCP_POINT_STROKE};

/// One simulated particle on an edge.
///
/// `speed` is the fraction of the edge traversed per second (1.0 means the
/// full edge in one second). `delta` is the normalized position in [0, 1];
/// the owning edge advances it by `step_ms * speed / 1000` per frame and
/// discards the point once it passes 1. `offset` is a small render-time
/// jitter used for TCP points so simultaneous points do not overlap
/// perfectly.
#[derive(Debug, Clone, Copy)]
pub struct TrafficPoint {
    pub speed: f64,
    pub delta: f64,
    pub offset: Option<Point>,
    pub renderer: PointRenderer,
}

/// Radius and paint parameters for one diamond outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiamondSpec {
    pub radius: f64,
    pub style: PaintStyle,
}

/// Drawing strategy for a single traffic point.
///
/// Kept as a tagged variant rather than a trait object: the set of glyphs
/// is closed and dispatch stays a plain match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointRenderer {
    /// Filled, stroked circle.
    Circle { radius: f64, style: PaintStyle },
    /// Two concentric diamond outlines, outer painted first.
    ConcentricDiamond {
        outer: DiamondSpec,
        inner: DiamondSpec,
    },
}

impl PointRenderer {
    /// Paint this point at `at` (graph coordinates, offset already applied).
    pub fn render(&self, surface: &mut dyn DrawSurface, at: Point) -> Result<(), SurfaceError> {
        match self {
            PointRenderer::Circle { radius, style } => surface.draw_circle(at, *radius, *style),
            PointRenderer::ConcentricDiamond { outer, inner } => {
                surface.draw_diamond(at, outer.radius, outer.style)?;
                surface.draw_diamond(at, inner.radius, inner.style)
            }
        }
    }

    /// Renderer for a successful request-traffic point. The stroke follows
    /// the edge's current color so points read as part of the edge.
    pub fn rps_success(edge_stroke: Color) -> Self {
        PointRenderer::Circle {
            radius: 1.0,
            style: PaintStyle {
                fill: Color::White,
                stroke: edge_stroke,
                stroke_width: 2.0,
            },
        }
    }

    /// Renderer for an error request-traffic point: a distinguishable
    /// concentric diamond pair in the error palette.
    pub fn rps_error() -> Self {
        PointRenderer::ConcentricDiamond {
            outer: DiamondSpec {
                radius: 2.5,
                style: PaintStyle {
                    fill: Color::White,
                    stroke: FAILING_RED,
                    stroke_width: 1.0,
                },
            },
            inner: DiamondSpec {
                radius: 1.0,
                style: PaintStyle {
                    fill: FAILING_RED,
                    stroke: FAILING_RED,
                    stroke_width: 1.0,
                },
            },
        }
    }

    /// Renderer for a TCP traffic point: fixed neutral palette.
    pub fn tcp() -> Self {
        PointRenderer::Circle {
            radius: 0.8,
            style: PaintStyle {
                fill: TCP_POINT_FILL,
                stroke: TCP_POINT_STROKE,
                stroke_width: 1.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traffic::surface::{ShapeBuffer, ShapeKind};

    #[test]
    fn test_circle_renderer_paints_one_circle() {
        let mut surface = ShapeBuffer::new();
        let renderer = PointRenderer::rps_success(Color::Green);
        renderer
            .render(&mut surface, Point::new(10.0, 20.0))
            .unwrap();

        let shapes = surface.shapes();
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].kind, ShapeKind::Circle);
        assert_eq!(shapes[0].center, Point::new(10.0, 20.0));
        assert_eq!(shapes[0].style.stroke, Color::Green);
    }

    #[test]
    fn test_concentric_diamond_paints_outer_then_inner() {
        let mut surface = ShapeBuffer::new();
        PointRenderer::rps_error()
            .render(&mut surface, Point::new(0.0, 0.0))
            .unwrap();

        let shapes = surface.shapes();
        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[0].kind, ShapeKind::Diamond);
        assert_eq!(shapes[1].kind, ShapeKind::Diamond);
        assert!(
            shapes[0].radius > shapes[1].radius,
            "outer diamond must be painted before the inner one"
        );
    }

    #[test]
    fn test_render_propagates_surface_failure() {
        let mut surface = ShapeBuffer::new();
        let result =
            PointRenderer::tcp().render(&mut surface, Point::new(f64::INFINITY, 0.0));
        assert!(result.is_err());
    }
}
