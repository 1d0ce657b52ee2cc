// Traffic renderer - the animation controller
//
// Owns the edge-id -> TrafficEdge map, the drawing surface, and the frame
// clock. Each frame: clear the surface, re-apply the host view transform,
// advance every visible edge, prune finished points, and paint the rest.
// Spawn intervals and point speeds are derived from edge telemetry through
// the transfer functions at the bottom of this file.

use std::collections::HashMap;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tracing::{error, warn};

use super::edge::{EdgeHandle, Protocol, TrafficEdge, TrafficEdgeType};
use super::geometry::{
    self, bezier_length, distance, linear_interpolation, quadratic_bezier, Point,
};
use super::surface::{DrawSurface, ViewTransform};

/// Requests-per-second clamp for the spawn-interval mapping.
const TIMER_REQUEST_PER_SECOND_MIN: f64 = 0.0;
const TIMER_REQUEST_PER_SECOND_MAX: f64 = 750.0;

/// Interval range between spawned points, in ms. Higher request rates spawn
/// faster, approaching the minimum.
const TIMER_TIME_BETWEEN_DOTS_MIN: f64 = 20.0;
const TIMER_TIME_BETWEEN_DOTS_MAX: f64 = 1000.0;

/// Response-time clamp for the speed mapping, in ms.
const SPEED_RESPONSE_TIME_MIN: f64 = 0.0;
const SPEED_RESPONSE_TIME_MAX: f64 = 10_000.0;

/// Point speed range, in edge fractions per second. Higher latency maps to
/// lower speed.
const SPEED_RATE_MIN: f64 = 0.1;
const SPEED_RATE_MAX: f64 = 2.0;

/// TCP flows use a fixed base speed and their own interval/byte-rate bounds.
const TCP_BASE_SPEED: f64 = 0.5;
const TCP_TIMER_MIN: f64 = 150.0;
const TCP_TIMER_MAX: f64 = 600.0;
const TCP_SENT_RATE_MIN: f64 = 50.0;
const TCP_SENT_RATE_MAX: f64 = 1024.0 * 1024.0;
const TCP_ERROR_RATE: f64 = 0.0;

/// Reference edge length for speed normalization, so long and short edges
/// appear similarly paced.
const BASE_LENGTH: f64 = 50.0;

/// Nominal frame period in seconds.
pub const FRAME_RATE: f64 = 1.0 / 60.0;

/// Structural failure of the animation. A geometry the classifier cannot
/// handle will recur every frame, so the loop stops and propagates instead
/// of degrading silently.
#[derive(Debug, Error)]
pub enum TrafficError {
    #[error("unsupported edge geometry: {count} control points")]
    UnsupportedGeometry { count: usize },
}

/// Geometric shape of an edge's path, classified from its assembled
/// control-point count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeConnection {
    /// Straight segment between the endpoints.
    Linear(Point, Point),
    /// A single quadratic Bezier segment.
    Curve(Point, Point, Point),
    /// Self-loop: two chained quadratic segments sharing the middle point.
    Loop([Point; 5]),
}

impl EdgeConnection {
    /// Classify by control-point count: 2 is linear, 3 a curve, 5 a loop.
    /// Anything else breaks the graph-library contract.
    pub fn classify(control_points: &[Point]) -> Result<Self, TrafficError> {
        match control_points {
            [p0, p1] => Ok(EdgeConnection::Linear(*p0, *p1)),
            [p0, p1, p2] => Ok(EdgeConnection::Curve(*p0, *p1, *p2)),
            [p0, p1, p2, p3, p4] => Ok(EdgeConnection::Loop([*p0, *p1, *p2, *p3, *p4])),
            other => Err(TrafficError::UnsupportedGeometry { count: other.len() }),
        }
    }

    /// Interpolated position at normalized `t`, 0 at the source endpoint
    /// and 1 at the target.
    pub fn point_at(&self, t: f64) -> Point {
        match self {
            EdgeConnection::Linear(p0, p1) => linear_interpolation(*p0, *p1, t),
            EdgeConnection::Curve(p0, p1, p2) => quadratic_bezier(*p0, *p1, *p2, t),
            EdgeConnection::Loop(cp) => {
                // Two back-to-back quadratics; renormalize t into each half.
                if t < 0.5 {
                    quadratic_bezier(cp[0], cp[1], cp[2], t / 0.5)
                } else {
                    quadratic_bezier(cp[2], cp[3], cp[4], (t - 0.5) * 2.0)
                }
            }
        }
    }

    /// Path length in graph units.
    pub fn length(&self) -> f64 {
        match self {
            EdgeConnection::Linear(p0, p1) => distance(*p0, *p1),
            EdgeConnection::Curve(p0, p1, p2) => bezier_length(*p0, *p1, *p2),
            EdgeConnection::Loop(cp) => {
                bezier_length(cp[0], cp[1], cp[2]) + bezier_length(cp[2], cp[3], cp[4])
            }
        }
    }
}

/// Assemble the full control-point list for an edge: the source endpoint,
/// the raw interior points with a midpoint inserted between each
/// consecutive pair, then the target endpoint. A curve's single interior
/// point becomes the Bezier control point; a loop's two interior points
/// yield the five points of its chained segments.
pub fn edge_control_points<E: EdgeHandle>(edge: &E) -> Vec<Point> {
    let raw = edge.control_points();
    let mut control_points = Vec::with_capacity(raw.len() * 2 + 2);
    control_points.push(edge.source_endpoint());
    for i in 0..raw.len() {
        control_points.push(raw[i]);
        if i + 1 < raw.len() {
            control_points.push(Point::new(
                (raw[i].x + raw[i + 1].x) / 2.0,
                (raw[i].y + raw[i + 1].y) / 2.0,
            ));
        }
    }
    control_points.push(edge.target_endpoint());
    control_points
}

/// Spawn interval in ms for a request rate. `None` means no traffic: the
/// generator must never spawn.
///
/// The quadratic ease makes low rates spawn much more slowly than linear
/// scaling would, while high rates approach the minimum interval.
pub fn timer_from_rate(rate: f64) -> Option<f64> {
    if rate.is_nan() || rate == 0.0 {
        return None;
    }
    let delta = geometry::clamp(rate, TIMER_REQUEST_PER_SECOND_MIN, TIMER_REQUEST_PER_SECOND_MAX)
        / TIMER_REQUEST_PER_SECOND_MAX;
    Some(
        TIMER_TIME_BETWEEN_DOTS_MIN
            + (1.0 - delta).powi(2) * (TIMER_TIME_BETWEEN_DOTS_MAX - TIMER_TIME_BETWEEN_DOTS_MIN),
    )
}

/// Spawn interval in ms for a TCP byte rate; same shape as
/// `timer_from_rate` with bounds tuned for byte throughput.
pub fn timer_from_tcp_sent_rate(bytes_per_sec: f64) -> Option<f64> {
    if bytes_per_sec.is_nan() || bytes_per_sec == 0.0 {
        return None;
    }
    let delta =
        geometry::clamp(bytes_per_sec, TCP_SENT_RATE_MIN, TCP_SENT_RATE_MAX) / TCP_SENT_RATE_MAX;
    Some(TCP_TIMER_MIN + (1.0 - delta).powi(2) * (TCP_TIMER_MAX - TCP_TIMER_MIN))
}

/// Point speed for a response time. NaN reads as "everything is going as
/// fast as possible"; otherwise higher latency maps linearly to lower
/// speed within the clamp bounds.
pub fn speed_from_response_time(response_time_ms: f64) -> f64 {
    if response_time_ms.is_nan() {
        return SPEED_RATE_MAX;
    }
    let delta = geometry::clamp(
        response_time_ms,
        SPEED_RESPONSE_TIME_MIN,
        SPEED_RESPONSE_TIME_MAX,
    ) / SPEED_RESPONSE_TIME_MAX;
    SPEED_RATE_MIN + (1.0 - delta) * (SPEED_RATE_MAX - SPEED_RATE_MIN)
}

/// Frame clock, present only while the animation runs.
#[derive(Debug)]
struct FrameClock {
    previous_timestamp: Option<Instant>,
}

/// The animation controller for one mounted topology view.
pub struct TrafficRenderer<E: EdgeHandle, S: DrawSurface> {
    traffic_edges: HashMap<String, TrafficEdge<E>>,
    clock: Option<FrameClock>,
    surface: S,
    rng: StdRng,
}

impl<E: EdgeHandle + Clone, S: DrawSurface> TrafficRenderer<E, S> {
    /// Build a controller over the host's drawing surface and the current
    /// edge set.
    pub fn new(surface: S, edges: &[E]) -> Self {
        let mut renderer = Self {
            traffic_edges: HashMap::new(),
            clock: None,
            surface,
            rng: StdRng::from_entropy(),
        };
        renderer.set_edges(edges);
        renderer
    }

    /// Start the animation loop. Idempotent: any loop already running is
    /// stopped first.
    pub fn start(&mut self) {
        self.stop();
        self.clock = Some(FrameClock {
            previous_timestamp: None,
        });
    }

    /// Stop the animation loop and clear the surface. Safe to call when
    /// already stopped.
    pub fn stop(&mut self) {
        if self.clock.take().is_some() {
            self.surface.clear();
        }
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_some()
    }

    /// Clear the drawing surface without touching simulation state.
    pub fn clear(&mut self) {
        self.surface.clear();
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Rebuild the edge map from the supplied edge collection. Entries that
    /// survive the refresh keep their in-flight points; edges that
    /// disappeared, or whose protocol no longer carries traffic, are
    /// dropped.
    pub fn set_edges(&mut self, edges: &[E]) {
        let mut next: HashMap<String, TrafficEdge<E>> = HashMap::with_capacity(edges.len());
        for edge in edges {
            let edge_type = TrafficEdgeType::from_protocol(edge.telemetry().protocol);
            if edge_type == TrafficEdgeType::None {
                continue;
            }
            let id = edge.id();
            let mut traffic_edge = match self.traffic_edges.remove(&id) {
                Some(existing) => existing,
                None => TrafficEdge::new(edge.clone()),
            };
            traffic_edge.set_type(edge_type);
            fill_traffic_edge(&mut traffic_edge, edge);
            next.insert(id, traffic_edge);
        }
        self.traffic_edges = next;
    }

    pub fn edge_count(&self) -> usize {
        self.traffic_edges.len()
    }

    /// Total live points across all tracked edges.
    pub fn point_count(&self) -> usize {
        self.traffic_edges
            .values()
            .map(|edge| edge.points().len())
            .sum()
    }

    pub fn traffic_edge(&self, id: &str) -> Option<&TrafficEdge<E>> {
        self.traffic_edges.get(id)
    }

    #[cfg(test)]
    pub(crate) fn traffic_edge_mut(&mut self, id: &str) -> Option<&mut TrafficEdge<E>> {
        self.traffic_edges.get_mut(id)
    }

    /// Advance one frame using the wall clock. Does nothing while stopped.
    pub fn process_step(&mut self, transform: ViewTransform) -> Result<(), TrafficError> {
        self.step_frame(Instant::now(), transform)
    }

    /// Advance one frame at an explicit timestamp. The first frame after
    /// `start` uses the nominal frame period so the simulation never sees
    /// a zero step. A structural failure stops the loop and propagates:
    /// a frame that failed will keep failing, and spinning on it would
    /// only hide the broken contract.
    pub fn step_frame(&mut self, now: Instant, transform: ViewTransform) -> Result<(), TrafficError> {
        let step = match self.clock.as_ref() {
            Some(clock) => current_step(clock.previous_timestamp, now),
            None => return Ok(()),
        };

        match self.run_frame(step, transform) {
            Ok(()) => {
                if let Some(clock) = self.clock.as_mut() {
                    clock.previous_timestamp = Some(now);
                }
                Ok(())
            }
            Err(err) => {
                self.stop();
                Err(err)
            }
        }
    }

    fn run_frame(&mut self, step_ms: f64, transform: ViewTransform) -> Result<(), TrafficError> {
        self.surface.clear();
        self.surface.set_transform(transform);
        for traffic_edge in self.traffic_edges.values_mut() {
            // Edges hidden by host-side filters are not stepped at all.
            if !traffic_edge.edge().is_visible() {
                continue;
            }
            traffic_edge.process_step(step_ms, &mut self.rng);
            traffic_edge.remove_finished_points();
            render_edge(&mut self.surface, traffic_edge)?;
        }
        Ok(())
    }
}

/// Paint every point of one edge. Dimmed edges keep simulating but are not
/// painted. A failure while positioning or painting a single point is
/// logged and that point skipped for the frame; a geometry the classifier
/// rejects propagates and ends the animation.
fn render_edge<E: EdgeHandle, S: DrawSurface>(
    surface: &mut S,
    traffic_edge: &TrafficEdge<E>,
) -> Result<(), TrafficError> {
    let edge = traffic_edge.edge();
    if edge.is_dimmed() {
        return Ok(());
    }
    let control_points = edge_control_points(edge);
    let connection = EdgeConnection::classify(&control_points)?;
    for point in traffic_edge.points() {
        let mut at = connection.point_at(point.delta);
        if let Some(offset) = point.offset {
            at.x += offset.x;
            at.y += offset.y;
        }
        if let Err(err) = point.renderer.render(surface, at) {
            warn!(
                edge = %edge.id(),
                error = %err,
                "skipping traffic point for this frame"
            );
        }
    }
    Ok(())
}

/// Derive spawn interval, speed and error rate for an edge from its current
/// telemetry, and swap in the fresh edge handle.
fn fill_traffic_edge<E: EdgeHandle + Clone>(traffic_edge: &mut TrafficEdge<E>, edge: &E) {
    let edge_length_factor = match edge_length(edge) {
        Ok(length) => BASE_LENGTH / length.max(1.0),
        Err(err) => {
            error!(
                edge = %edge.id(),
                error = %err,
                "failed to measure edge, leaving traffic speed unnormalized"
            );
            1.0
        }
    };

    let telemetry = edge.telemetry();
    match traffic_edge.edge_type() {
        TrafficEdgeType::Rps => {
            let is_http = telemetry.protocol == Protocol::Http;
            let rate = if is_http {
                telemetry.http_rps
            } else {
                telemetry.grpc_rps
            };
            let percent_err = if is_http {
                telemetry.http_percent_err
            } else {
                telemetry.grpc_percent_err
            };

            let timer = timer_from_rate(rate.unwrap_or(f64::NAN));
            let speed = speed_from_response_time(telemetry.response_time_ms.unwrap_or(f64::NAN))
                * edge_length_factor;
            let error_rate = percent_err.map_or(0.0, |p| p / 100.0);
            traffic_edge.set_speed(speed);
            traffic_edge.set_timer(timer);
            traffic_edge.set_edge(edge.clone());
            traffic_edge.set_error_rate(error_rate);
        }
        TrafficEdgeType::Tcp => {
            traffic_edge.set_speed(TCP_BASE_SPEED * edge_length_factor);
            traffic_edge.set_error_rate(TCP_ERROR_RATE);
            traffic_edge.set_timer(timer_from_tcp_sent_rate(
                telemetry.tcp_sent_bytes_per_sec.unwrap_or(f64::NAN),
            ));
            traffic_edge.set_edge(edge.clone());
        }
        TrafficEdgeType::None => {}
    }
}

/// Path length of an edge in graph units.
fn edge_length<E: EdgeHandle>(edge: &E) -> Result<f64, TrafficError> {
    let control_points = edge_control_points(edge);
    Ok(EdgeConnection::classify(&control_points)?.length())
}

/// Wall-clock step since the previous frame, in ms. The first frame after
/// `start` reports the nominal frame period.
fn current_step(previous: Option<Instant>, now: Instant) -> f64 {
    let step = match previous {
        Some(prev) => now.duration_since(prev).as_secs_f64() * 1000.0,
        None => 0.0,
    };
    if step == 0.0 {
        FRAME_RATE * 1000.0
    } else {
        step
    }
}
