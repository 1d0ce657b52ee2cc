// Application state management
//
// AppState owns the topology, the traffic animation controller, and the
// view/selection/filter state the UI reads each frame. Everything runs on
// the single event-loop thread: telemetry refreshes and animation frames
// are never interleaved mid-step.

pub mod config;
pub mod event;

pub use config::RefreshConfig;

use std::time::Instant;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::widgets::ListState;

use crate::mesh::{demo, MeshEdge, MeshTopology, ProtocolFilter};
use crate::traffic::{ShapeBuffer, TrafficRenderer, ViewTransform};
use config::{
    MAX_REFRESH_MS, MAX_ZOOM, MIN_REFRESH_MS, MIN_ZOOM, PAN_STEP, REFRESH_STEP, ZOOM_STEP,
};

/// Main application state
pub struct AppState {
    /// Whether the application is running
    pub running: bool,

    /// The mesh topology on display
    pub topology: MeshTopology,

    /// Traffic animation controller over the topology's edges
    pub traffic: TrafficRenderer<MeshEdge, ShapeBuffer>,

    /// Current pan/zoom of the topology view
    pub view: ViewTransform,

    /// Currently selected edge index, if any
    pub selected_edge: Option<usize>,

    /// List state for the edge panel (enables scrolling)
    pub edge_list_state: ListState,

    /// Protocol filter applied to edge visibility
    pub protocol_filter: ProtocolFilter,

    /// Telemetry refresh configuration
    pub refresh_config: RefreshConfig,

    /// Last time telemetry was refreshed
    last_refresh: Instant,

    /// RNG driving the demo telemetry drift
    rng: StdRng,
}

impl AppState {
    pub fn new() -> Self {
        let topology = demo::demo_topology();
        let mut traffic = TrafficRenderer::new(ShapeBuffer::new(), topology.edges());
        traffic.start();

        Self {
            running: true,
            topology,
            traffic,
            view: ViewTransform::default(),
            selected_edge: None,
            edge_list_state: ListState::default(),
            protocol_filter: ProtocolFilter::default(),
            refresh_config: RefreshConfig::new(),
            last_refresh: Instant::now(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Per-iteration tick: refresh telemetry when due, then advance the
    /// animation one frame. A structural animation failure propagates to
    /// the caller, which tears the terminal down before reporting it.
    pub fn on_tick(&mut self) -> Result<()> {
        let now = Instant::now();
        if now.duration_since(self.last_refresh) >= self.refresh_config.interval() {
            self.refresh_telemetry();
        }
        self.traffic
            .process_step(self.view)
            .context("traffic animation failed")?;
        Ok(())
    }

    /// Drift the demo telemetry and hand the refreshed edge set to the
    /// traffic controller. In-flight traffic points survive the refresh.
    fn refresh_telemetry(&mut self) {
        self.last_refresh = Instant::now();
        demo::drift_telemetry(&self.topology, &mut self.rng);
        self.traffic.set_edges(self.topology.edges());
    }

    /// Pause or resume the traffic animation.
    pub fn toggle_animation(&mut self) {
        if self.traffic.is_running() {
            self.traffic.stop();
        } else {
            self.traffic.start();
        }
    }

    /// Move edge selection up (decrease index)
    pub fn select_previous_edge(&mut self) {
        let count = self.topology.edges().len();
        if count == 0 {
            self.set_selection(None);
            return;
        }
        let next = match self.selected_edge {
            None => count - 1,
            Some(0) => 0,
            Some(index) => index - 1,
        };
        self.set_selection(Some(next));
    }

    /// Move edge selection down (increase index)
    pub fn select_next_edge(&mut self) {
        let count = self.topology.edges().len();
        if count == 0 {
            self.set_selection(None);
            return;
        }
        let next = match self.selected_edge {
            None => 0,
            Some(index) => (index + 1).min(count - 1),
        };
        self.set_selection(Some(next));
    }

    /// Drop the selection, un-dimming every edge.
    pub fn clear_selection(&mut self) {
        self.set_selection(None);
    }

    fn set_selection(&mut self, selected: Option<usize>) {
        self.selected_edge = selected;
        self.edge_list_state.select(selected);
        self.topology.apply_selection(selected);
    }

    /// Cycle the protocol filter and apply it to edge visibility. The
    /// surface is cleared so points of freshly hidden edges do not linger
    /// while the animation is paused.
    pub fn cycle_protocol_filter(&mut self) {
        self.protocol_filter = self.protocol_filter.next();
        self.topology.apply_filter(self.protocol_filter);
        self.traffic.clear();
    }

    /// Increase refresh rate (decrease interval, clamp to minimum)
    pub fn increase_refresh_rate(&mut self) {
        let new_interval = self.refresh_config.refresh_ms.saturating_sub(REFRESH_STEP);
        self.refresh_config.refresh_ms = new_interval.max(MIN_REFRESH_MS);
        self.refresh_config.last_change = Some(Instant::now());
    }

    /// Decrease refresh rate (increase interval, clamp to maximum)
    pub fn decrease_refresh_rate(&mut self) {
        let new_interval = self.refresh_config.refresh_ms.saturating_add(REFRESH_STEP);
        self.refresh_config.refresh_ms = new_interval.min(MAX_REFRESH_MS);
        self.refresh_config.last_change = Some(Instant::now());
    }

    /// Pan the topology view by whole steps.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.view.offset_x += dx * PAN_STEP;
        self.view.offset_y += dy * PAN_STEP;
    }

    pub fn zoom_in(&mut self) {
        self.view.scale = (self.view.scale + ZOOM_STEP).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.view.scale = (self.view.scale - ZOOM_STEP).max(MIN_ZOOM);
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
