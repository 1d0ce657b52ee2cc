// Status bar rendering
//
// One line at the bottom: animation state, protocol filter, refresh
// cadence, live point count, and the key hints.

use std::time::Duration;

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::AppState;
use crate::theme::{ACCENT_BLUE, DEGRADED_ORANGE, DIMMED_GREY, HEALTHY_GREEN, TEXT_GREY};

/// How long a freshly changed refresh interval stays highlighted.
const CHANGE_HIGHLIGHT: Duration = Duration::from_millis(800);

pub fn draw_status_bar(frame: &mut Frame, app: &AppState, area: Rect) {
    let animation = if app.traffic.is_running() {
        Span::styled("animating", Style::default().fg(HEALTHY_GREEN))
    } else {
        Span::styled("paused", Style::default().fg(DEGRADED_ORANGE))
    };

    let recently_changed = app
        .refresh_config
        .last_change
        .is_some_and(|at| at.elapsed() < CHANGE_HIGHLIGHT);
    let refresh_color = if recently_changed {
        ACCENT_BLUE
    } else {
        TEXT_GREY
    };

    let line = Line::from(vec![
        Span::raw(" "),
        animation,
        Span::styled(" │ filter: ", Style::default().fg(DIMMED_GREY)),
        Span::styled(app.protocol_filter.label(), Style::default().fg(TEXT_GREY)),
        Span::styled(" │ refresh: ", Style::default().fg(DIMMED_GREY)),
        Span::styled(
            format!("{}ms", app.refresh_config.refresh_ms),
            Style::default().fg(refresh_color),
        ),
        Span::styled(" │ edges: ", Style::default().fg(DIMMED_GREY)),
        Span::styled(
            app.traffic.edge_count().to_string(),
            Style::default().fg(TEXT_GREY),
        ),
        Span::styled(" │ points: ", Style::default().fg(DIMMED_GREY)),
        Span::styled(
            app.traffic.point_count().to_string(),
            Style::default().fg(TEXT_GREY),
        ),
        Span::styled(
            "   q quit · a animate · f filter · ↑↓ select · c clear · hjkl pan · z/x zoom · +/- refresh",
            Style::default().fg(DIMMED_GREY),
        ),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}
