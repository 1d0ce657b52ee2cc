// Edge list and telemetry details panel
//
// The upper half lists every edge with its protocol, headline rate and
// health color; the lower half shows the selected edge's telemetry along
// with the animation parameters derived from it.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::AppState;
use crate::mesh::MeshEdgeData;
use crate::theme::{self, ACCENT_BLUE, DIMMED_GREY, TEXT_GREY};
use crate::traffic::{EdgeHandle, Protocol};

pub fn draw_details(frame: &mut Frame, app: &mut AppState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(10)])
        .split(area);

    draw_edge_list(frame, app, chunks[0]);
    draw_selection(frame, app, chunks[1]);
}

fn draw_edge_list(frame: &mut Frame, app: &mut AppState, area: Rect) {
    let items: Vec<ListItem> = app
        .topology
        .edges()
        .iter()
        .map(|edge| {
            let data = edge.data();
            let color = if edge.is_visible() {
                edge.stroke_color()
            } else {
                DIMMED_GREY
            };
            let line = Line::from(vec![
                Span::styled(
                    format!("{} → {}", data.source, data.target),
                    Style::default().fg(TEXT_GREY),
                ),
                Span::raw("  "),
                Span::styled(
                    format!("{:<4}", data.telemetry.protocol.label()),
                    Style::default().fg(color),
                ),
                Span::styled(rate_label(&data), Style::default().fg(color)),
            ]);
            ListItem::new(line)
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(ACCENT_BLUE))
                .title(" edges "),
        )
        .highlight_style(Style::default().add_modifier(Modifier::BOLD).fg(ACCENT_BLUE))
        .highlight_symbol("▶ ");

    frame.render_stateful_widget(list, area, &mut app.edge_list_state);
}

fn draw_selection(frame: &mut Frame, app: &AppState, area: Rect) {
    let lines = match app.selected_edge {
        Some(index) => {
            let edge = &app.topology.edges()[index];
            let data = edge.data();
            let mut lines = vec![
                detail_line("route", format!("{} → {}", data.source, data.target)),
                detail_line("protocol", data.telemetry.protocol.label().to_string()),
                detail_line("rate", rate_label(&data).trim_start().to_string()),
                detail_line(
                    "errors",
                    data.percent_err()
                        .map_or("-".to_string(), |err| format!("{:.1}%", err)),
                ),
                detail_line(
                    "latency",
                    data.telemetry
                        .response_time_ms
                        .map_or("-".to_string(), |rt| format!("{:.0} ms", rt)),
                ),
                Line::from(vec![
                    Span::styled("health    ", Style::default().fg(TEXT_GREY)),
                    Span::styled(
                        theme::health_label(data.telemetry.protocol, data.percent_err()),
                        Style::default()
                            .fg(theme::edge_stroke_color(data.telemetry.protocol, data.percent_err())),
                    ),
                ]),
            ];
            // Derived animation pacing, when the engine tracks this edge.
            if let Some(traffic_edge) = app.traffic.traffic_edge(&data.id) {
                lines.push(detail_line(
                    "spawn",
                    traffic_edge
                        .timer()
                        .map_or("idle".to_string(), |t| format!("every {:.0} ms", t)),
                ));
                lines.push(detail_line(
                    "speed",
                    format!("{:.2} edge/s", traffic_edge.speed()),
                ));
                lines.push(detail_line(
                    "points",
                    traffic_edge.points().len().to_string(),
                ));
            }
            lines
        }
        None => vec![Line::from(Span::styled(
            "select an edge with ↑/↓",
            Style::default().fg(DIMMED_GREY),
        ))],
    };

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(ACCENT_BLUE))
            .title(" details "),
    );
    frame.render_widget(paragraph, area);
}

fn detail_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<10}", label), Style::default().fg(TEXT_GREY)),
        Span::raw(value),
    ])
}

/// Headline rate for the list: requests/s for HTTP and gRPC, a scaled
/// byte rate for TCP.
fn rate_label(data: &MeshEdgeData) -> String {
    match (data.telemetry.protocol, data.rate()) {
        (_, None) => " -".to_string(),
        (Protocol::Tcp, Some(rate)) => format!(" {}", format_bytes_per_sec(rate)),
        (_, Some(rate)) => format!(" {:.1} rps", rate),
    }
}

fn format_bytes_per_sec(rate: f64) -> String {
    if rate >= 1024.0 * 1024.0 {
        format!("{:.1} MiB/s", rate / (1024.0 * 1024.0))
    } else if rate >= 1024.0 {
        format!("{:.1} KiB/s", rate / 1024.0)
    } else {
        format!("{:.0} B/s", rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes_per_sec() {
        assert_eq!(format_bytes_per_sec(512.0), "512 B/s");
        assert_eq!(format_bytes_per_sec(2048.0), "2.0 KiB/s");
        assert_eq!(format_bytes_per_sec(3.0 * 1024.0 * 1024.0), "3.0 MiB/s");
    }
}
