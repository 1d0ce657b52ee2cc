// Theme module - color palette and status helpers
//
// Defines the palette used across the topology canvas, traffic points and
// panels. Edge and point colors follow the usual mesh-dashboard convention:
// green for healthy request traffic, orange for degraded, red for failing,
// blue for raw TCP flows.

use ratatui::style::Color;

use crate::traffic::Protocol;

/// Primary accent - borders, titles, selected items
pub const ACCENT_BLUE: Color = Color::Rgb(115, 188, 247);

/// Healthy request traffic (error rate below the degraded threshold)
pub const HEALTHY_GREEN: Color = Color::Rgb(62, 134, 53);

/// Degraded request traffic
pub const DEGRADED_ORANGE: Color = Color::Rgb(240, 171, 0);

/// Failing request traffic and error traffic points
pub const FAILING_RED: Color = Color::Rgb(201, 25, 11);

/// Raw TCP flows carry no error signal; drawn in a fixed blue
pub const TCP_BLUE: Color = Color::Rgb(0, 102, 204);

/// General panel text
pub const TEXT_GREY: Color = Color::Rgb(184, 187, 190);

/// De-emphasized edges and hidden list entries
pub const DIMMED_GREY: Color = Color::Rgb(92, 94, 102);

/// Fill for TCP traffic points (near-white neutral)
pub const TCP_POINT_FILL: Color = Color::Rgb(250, 250, 250);

/// Stroke for TCP traffic points (mid grey)
pub const TCP_POINT_STROKE: Color = Color::Rgb(139, 141, 143);

/// Error percentage at or above which an edge counts as degraded.
pub const DEGRADED_ERROR_PERCENT: f64 = 5.0;

/// Error percentage at or above which an edge counts as failing.
pub const FAILING_ERROR_PERCENT: f64 = 20.0;

/// Stroke color for an edge, from its protocol and current error percentage.
///
/// TCP edges have no request/error semantics and always use the fixed blue.
pub fn edge_stroke_color(protocol: Protocol, percent_err: Option<f64>) -> Color {
    if protocol == Protocol::Tcp {
        return TCP_BLUE;
    }
    match percent_err {
        Some(err) if err >= FAILING_ERROR_PERCENT => FAILING_RED,
        Some(err) if err >= DEGRADED_ERROR_PERCENT => DEGRADED_ORANGE,
        _ => HEALTHY_GREEN,
    }
}

/// Health label shown in the details panel, using the same thresholds as
/// the edge stroke color.
pub fn health_label(protocol: Protocol, percent_err: Option<f64>) -> &'static str {
    if protocol == Protocol::Tcp {
        return "Flowing";
    }
    match percent_err {
        Some(err) if err >= FAILING_ERROR_PERCENT => "Failing",
        Some(err) if err >= DEGRADED_ERROR_PERCENT => "Degraded",
        _ => "Healthy",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_stroke_color_thresholds() {
        assert_eq!(edge_stroke_color(Protocol::Http, None), HEALTHY_GREEN);
        assert_eq!(edge_stroke_color(Protocol::Http, Some(0.0)), HEALTHY_GREEN);
        assert_eq!(
            edge_stroke_color(Protocol::Grpc, Some(5.0)),
            DEGRADED_ORANGE
        );
        assert_eq!(edge_stroke_color(Protocol::Http, Some(20.0)), FAILING_RED);
    }

    #[test]
    fn test_tcp_edges_ignore_error_rate() {
        assert_eq!(edge_stroke_color(Protocol::Tcp, Some(99.0)), TCP_BLUE);
        assert_eq!(health_label(Protocol::Tcp, Some(99.0)), "Flowing");
    }
}
