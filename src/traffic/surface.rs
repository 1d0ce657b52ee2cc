// Drawing-surface boundary for the traffic animation engine
//
// The engine never talks to the terminal directly: point renderers paint
// through the DrawSurface trait, and the UI layer projects whatever was
// painted onto the topology canvas when it presents a frame. ShapeBuffer is
// the standard implementation; it doubles as a recording surface in tests.

use ratatui::style::Color;
use thiserror::Error;

use super::geometry::Point;

/// A single paint operation failed. The renderer tolerates this per point:
/// the point is skipped for the current frame and the animation continues.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("non-finite coordinates ({x}, {y})")]
    NonFiniteCoordinates { x: f64, y: f64 },

    #[error("non-finite radius {0}")]
    NonFiniteRadius(f64),
}

/// Pan/zoom state supplied by the host view.
///
/// Shapes are recorded in graph coordinates; the transform is applied when
/// the surface is presented, so panning does not disturb simulation state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            scale: 1.0,
        }
    }
}

impl ViewTransform {
    /// Project a graph-coordinate point into view coordinates.
    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            (p.x + self.offset_x) * self.scale,
            (p.y + self.offset_y) * self.scale,
        )
    }
}

/// Fill/stroke parameters for a painted glyph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaintStyle {
    pub fill: Color,
    pub stroke: Color,
    pub stroke_width: f64,
}

/// Shape kinds the point renderers know how to paint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Circle,
    Diamond,
}

/// One painted glyph, recorded in graph coordinates.
#[derive(Debug, Clone, Copy)]
pub struct PaintedShape {
    pub kind: ShapeKind,
    pub center: Point,
    pub radius: f64,
    pub style: PaintStyle,
}

/// 2D drawing surface provided by the host.
pub trait DrawSurface {
    /// Discard everything painted so far.
    fn clear(&mut self);

    /// Record the view transform to apply when the surface is presented.
    fn set_transform(&mut self, transform: ViewTransform);

    fn draw_circle(
        &mut self,
        center: Point,
        radius: f64,
        style: PaintStyle,
    ) -> Result<(), SurfaceError>;

    fn draw_diamond(
        &mut self,
        center: Point,
        radius: f64,
        style: PaintStyle,
    ) -> Result<(), SurfaceError>;
}

/// Retained list of shapes painted during the latest animation frame.
#[derive(Debug, Default)]
pub struct ShapeBuffer {
    shapes: Vec<PaintedShape>,
    transform: ViewTransform,
}

impl ShapeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shapes painted since the last clear, in paint order.
    pub fn shapes(&self) -> &[PaintedShape] {
        &self.shapes
    }

    /// Transform recorded for the current frame.
    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    fn push(
        &mut self,
        kind: ShapeKind,
        center: Point,
        radius: f64,
        style: PaintStyle,
    ) -> Result<(), SurfaceError> {
        if !center.x.is_finite() || !center.y.is_finite() {
            return Err(SurfaceError::NonFiniteCoordinates {
                x: center.x,
                y: center.y,
            });
        }
        if !radius.is_finite() {
            return Err(SurfaceError::NonFiniteRadius(radius));
        }
        self.shapes.push(PaintedShape {
            kind,
            center,
            radius,
            style,
        });
        Ok(())
    }
}

impl DrawSurface for ShapeBuffer {
    fn clear(&mut self) {
        self.shapes.clear();
    }

    fn set_transform(&mut self, transform: ViewTransform) {
        self.transform = transform;
    }

    fn draw_circle(
        &mut self,
        center: Point,
        radius: f64,
        style: PaintStyle,
    ) -> Result<(), SurfaceError> {
        self.push(ShapeKind::Circle, center, radius, style)
    }

    fn draw_diamond(
        &mut self,
        center: Point,
        radius: f64,
        style: PaintStyle,
    ) -> Result<(), SurfaceError> {
        self.push(ShapeKind::Diamond, center, radius, style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style() -> PaintStyle {
        PaintStyle {
            fill: Color::White,
            stroke: Color::Blue,
            stroke_width: 1.0,
        }
    }

    #[test]
    fn test_shapes_recorded_in_paint_order() {
        let mut buffer = ShapeBuffer::new();
        buffer
            .draw_circle(Point::new(1.0, 2.0), 2.0, style())
            .unwrap();
        buffer
            .draw_diamond(Point::new(3.0, 4.0), 2.5, style())
            .unwrap();

        let shapes = buffer.shapes();
        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[0].kind, ShapeKind::Circle);
        assert_eq!(shapes[1].kind, ShapeKind::Diamond);
        assert_eq!(shapes[1].center, Point::new(3.0, 4.0));
    }

    #[test]
    fn test_clear_discards_shapes() {
        let mut buffer = ShapeBuffer::new();
        buffer
            .draw_circle(Point::new(0.0, 0.0), 1.0, style())
            .unwrap();
        buffer.clear();
        assert!(buffer.shapes().is_empty());
    }

    #[test]
    fn test_non_finite_coordinates_rejected() {
        let mut buffer = ShapeBuffer::new();
        let result = buffer.draw_circle(Point::new(f64::NAN, 0.0), 1.0, style());
        assert!(result.is_err());
        assert!(buffer.shapes().is_empty(), "failed paint must not record");
    }

    #[test]
    fn test_transform_roundtrip() {
        let mut buffer = ShapeBuffer::new();
        let transform = ViewTransform {
            offset_x: 10.0,
            offset_y: -5.0,
            scale: 2.0,
        };
        buffer.set_transform(transform);
        assert_eq!(buffer.transform(), transform);

        let projected = transform.apply(Point::new(5.0, 5.0));
        assert_eq!(projected, Point::new(30.0, 0.0));
    }
}
