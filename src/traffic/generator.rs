// Traffic point generation
//
// One generator per edge decides, once per animation step, whether a new
// point should be spawned. The countdown carries a randomized slack so
// points across edges do not spawn in lockstep, which would read as a
// "flat" animation.

use rand::Rng;
use ratatui::style::Color;

use super::edge::TrafficEdgeType;
use super::geometry::Point;
use super::point::{PointRenderer, TrafficPoint};

/// Upper bound (exclusive) of the random slack subtracted from the spawn
/// countdown, in milliseconds.
const SPAWN_JITTER_MS: f64 = 200.0;

/// Half-width of the per-axis positional jitter applied to TCP points so
/// concurrent points do not overlap perfectly. This moves points inside a
/// small square around the path rather than perpendicular to it; the
/// original dashboards shipped the same approximation and the visual
/// difference is negligible at point size.
const TCP_OFFSET_RANGE: f64 = 1.5;

/// Spawn state for one edge.
///
/// `timer` is the configured interval between spawns; `None` means the edge
/// currently has no traffic and must never spawn. `timer_for_next_point` is
/// the live countdown for the next spawn.
#[derive(Debug)]
pub struct TrafficPointGenerator {
    timer: Option<f64>,
    timer_for_next_point: Option<f64>,
    speed: f64,
    error_rate: f64,
    edge_type: TrafficEdgeType,
}

impl Default for TrafficPointGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl TrafficPointGenerator {
    pub fn new() -> Self {
        Self {
            timer: None,
            timer_for_next_point: None,
            speed: 0.0,
            error_rate: 0.0,
            edge_type: TrafficEdgeType::None,
        }
    }

    /// Process one animation step: decrement the countdown and emit a new
    /// point once it dips below a random threshold in `[0, 200)` ms.
    pub fn process_step<R: Rng>(
        &mut self,
        step_ms: f64,
        edge_stroke: Color,
        rng: &mut R,
    ) -> Option<TrafficPoint> {
        let remaining = self.timer_for_next_point.as_mut()?;
        *remaining -= step_ms;
        if *remaining <= rng.gen_range(0.0..SPAWN_JITTER_MS) {
            self.timer_for_next_point = self.timer;
            return self.next_point(edge_stroke, rng);
        }
        None
    }

    /// Reconfigure the spawn interval. An in-flight countdown is preserved;
    /// an edge that previously had no traffic starts counting immediately.
    pub fn set_timer(&mut self, timer: Option<f64>) {
        self.timer = timer;
        if self.timer_for_next_point.is_none() {
            self.timer_for_next_point = timer;
        }
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    pub fn set_error_rate(&mut self, error_rate: f64) {
        self.error_rate = error_rate;
    }

    pub fn set_type(&mut self, edge_type: TrafficEdgeType) {
        self.edge_type = edge_type;
    }

    pub fn timer(&self) -> Option<f64> {
        self.timer
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Remaining milliseconds until the next spawn attempt.
    #[cfg(test)]
    pub(crate) fn timer_for_next_point(&self) -> Option<f64> {
        self.timer_for_next_point
    }

    fn next_point<R: Rng>(&self, edge_stroke: Color, rng: &mut R) -> Option<TrafficPoint> {
        let (renderer, offset) = match self.edge_type {
            TrafficEdgeType::Rps => {
                let is_error_point = rng.gen::<f64>() <= self.error_rate;
                let renderer = if is_error_point {
                    PointRenderer::rps_error()
                } else {
                    PointRenderer::rps_success(edge_stroke)
                };
                (renderer, None)
            }
            TrafficEdgeType::Tcp => {
                let offset = Point::new(
                    rng.gen_range(-TCP_OFFSET_RANGE..TCP_OFFSET_RANGE),
                    rng.gen_range(-TCP_OFFSET_RANGE..TCP_OFFSET_RANGE),
                );
                (PointRenderer::tcp(), Some(offset))
            }
            TrafficEdgeType::None => return None,
        };

        Some(TrafficPoint {
            speed: self.speed,
            delta: 0.0,
            offset,
            renderer,
        })
    }
}
