// UI rendering module
//
// The main draw() function lays out the frame: the topology canvas on the
// left, the edge list and telemetry details on the right, and a one-line
// status bar at the bottom.

mod details;
mod status_bar;
mod topology;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::app::AppState;

pub fn draw(frame: &mut Frame, app: &mut AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(1)])
        .split(frame.area());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(66), Constraint::Percentage(34)])
        .split(chunks[0]);

    topology::draw_topology(frame, app, body[0]);
    details::draw_details(frame, app, body[1]);
    status_bar::draw_status_bar(frame, app, chunks[1]);
}
