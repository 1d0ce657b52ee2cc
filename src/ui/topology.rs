// Topology canvas rendering
//
// Draws the mesh on a braille canvas: edge paths first, then the traffic
// engine's painted shapes projected through the view transform, then the
// node glyphs and labels on top.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols::Marker,
    text::Span,
    widgets::{
        canvas::{Canvas, Circle, Context, Line as CanvasLine},
        Block, BorderType, Borders,
    },
    Frame,
};

use crate::app::AppState;
use crate::mesh::MeshEdge;
use crate::theme::{ACCENT_BLUE, DIMMED_GREY, TEXT_GREY};
use crate::traffic::renderer::{edge_control_points, EdgeConnection};
use crate::traffic::{EdgeHandle, PaintedShape, Point, ShapeKind};

/// Segments used to flatten an edge path into canvas line strokes.
const PATH_SEGMENTS: usize = 24;

pub fn draw_topology(frame: &mut Frame, app: &AppState, area: Rect) {
    let transform = app.view;

    // Precompute projected geometry so the paint closure owns plain data.
    let mut edge_lines: Vec<(Point, Point, Color)> = Vec::new();
    for edge in app.topology.edges() {
        if !edge.is_visible() {
            continue;
        }
        let color = if edge.is_dimmed() {
            DIMMED_GREY
        } else {
            edge.stroke_color()
        };
        if let Some(path) = edge_path(edge) {
            for pair in path.windows(2) {
                edge_lines.push((transform.apply(pair[0]), transform.apply(pair[1]), color));
            }
        }
    }

    let nodes: Vec<(String, Color, Point, String)> = app
        .topology
        .nodes()
        .iter()
        .map(|node| {
            (
                node.kind.glyph().to_string(),
                node.kind.color(),
                transform.apply(node.position()),
                node.name.clone(),
            )
        })
        .collect();

    // Traffic overlay shapes, recorded in graph coordinates with the
    // transform of the frame they were painted in.
    let shapes: Vec<PaintedShape> = app.traffic.surface().shapes().to_vec();
    let overlay = app.traffic.surface().transform();

    let canvas = Canvas::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(ACCENT_BLUE))
                .title(" mesh topology "),
        )
        .marker(Marker::Braille)
        .x_bounds([0.0, 100.0])
        .y_bounds([0.0, 100.0])
        .paint(move |ctx| {
            for (a, b, color) in &edge_lines {
                ctx.draw(&CanvasLine {
                    x1: a.x,
                    y1: a.y,
                    x2: b.x,
                    y2: b.y,
                    color: *color,
                });
            }

            for shape in &shapes {
                let at = overlay.apply(shape.center);
                let radius = shape.radius * overlay.scale;
                match shape.kind {
                    ShapeKind::Circle => {
                        ctx.draw(&Circle {
                            x: at.x,
                            y: at.y,
                            radius,
                            color: shape.style.stroke,
                        });
                        // Approximate stroke width on the braille grid with
                        // a second ring, and the fill with a center dot.
                        if shape.style.stroke_width >= 2.0 {
                            ctx.draw(&Circle {
                                x: at.x,
                                y: at.y,
                                radius: radius * 0.6,
                                color: shape.style.stroke,
                            });
                        }
                        ctx.print(
                            at.x,
                            at.y,
                            Span::styled("·", Style::default().fg(shape.style.fill)),
                        );
                    }
                    ShapeKind::Diamond => draw_diamond(ctx, at, radius, shape.style.stroke),
                }
            }

            for (glyph, color, at, name) in &nodes {
                ctx.print(at.x, at.y, Span::styled(glyph.clone(), Style::default().fg(*color)));
                ctx.print(
                    at.x - 2.0,
                    at.y - 4.0,
                    Span::styled(name.clone(), Style::default().fg(TEXT_GREY)),
                );
            }
        });

    frame.render_widget(canvas, area);
}

/// Flatten an edge's path into points along its classified shape. Returns
/// None for geometry the engine cannot classify; such an edge is simply
/// not drawn here (the animation layer surfaces the failure).
fn edge_path(edge: &MeshEdge) -> Option<Vec<Point>> {
    let control_points = edge_control_points(edge);
    let connection = EdgeConnection::classify(&control_points).ok()?;
    Some(
        (0..=PATH_SEGMENTS)
            .map(|i| connection.point_at(i as f64 / PATH_SEGMENTS as f64))
            .collect(),
    )
}

/// Axis-aligned diamond outline (a rotated square) around `at`.
fn draw_diamond(ctx: &mut Context<'_>, at: Point, radius: f64, color: Color) {
    let corners = [
        (at.x, at.y + radius),
        (at.x + radius, at.y),
        (at.x, at.y - radius),
        (at.x - radius, at.y),
    ];
    for i in 0..corners.len() {
        let (x1, y1) = corners[i];
        let (x2, y2) = corners[(i + 1) % corners.len()];
        ctx.draw(&CanvasLine {
            x1,
            y1,
            x2,
            y2,
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::demo::demo_topology;

    #[test]
    fn test_edge_path_flattens_every_demo_edge() {
        let topology = demo_topology();
        for edge in topology.edges() {
            let path = edge_path(edge).expect("demo edges all classify");
            assert_eq!(path.len(), PATH_SEGMENTS + 1);
        }
    }
}
