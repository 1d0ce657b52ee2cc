// Per-edge traffic simulation state
//
// A TrafficEdge owns the live points traveling along one topology edge and
// the generator that spawns them. It keeps a handle to the host graph's
// edge object, replaced on every topology refresh, so geometry lookups are
// always current while simulation state survives the refresh.

use rand::Rng;
use ratatui::style::Color;

use super::generator::TrafficPointGenerator;
use super::geometry::Point;
use super::point::TrafficPoint;

/// Protocol tag the host graph attaches to an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    Http,
    Grpc,
    Tcp,
    #[default]
    Unknown,
}

impl Protocol {
    pub fn label(&self) -> &'static str {
        match self {
            Protocol::Http => "HTTP",
            Protocol::Grpc => "gRPC",
            Protocol::Tcp => "TCP",
            Protocol::Unknown => "-",
        }
    }
}

/// Telemetry attributes attached to an edge by the host graph.
///
/// Metric fields are `None` when the backend reported no sample for the
/// current window. Which pair of rate/error fields applies depends on the
/// protocol; TCP edges only carry `tcp_sent_bytes_per_sec`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeTelemetry {
    pub protocol: Protocol,
    pub http_rps: Option<f64>,
    pub grpc_rps: Option<f64>,
    pub http_percent_err: Option<f64>,
    pub grpc_percent_err: Option<f64>,
    pub response_time_ms: Option<f64>,
    pub tcp_sent_bytes_per_sec: Option<f64>,
}

/// What kind of traffic an edge animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrafficEdgeType {
    /// Request-rate traffic (HTTP and gRPC).
    Rps,
    /// Byte-rate traffic.
    Tcp,
    /// No traffic is simulated for this edge.
    None,
}

impl TrafficEdgeType {
    pub fn from_protocol(protocol: Protocol) -> Self {
        match protocol {
            Protocol::Http | Protocol::Grpc => TrafficEdgeType::Rps,
            Protocol::Tcp => TrafficEdgeType::Tcp,
            Protocol::Unknown => TrafficEdgeType::None,
        }
    }
}

/// Narrow capability interface the engine requires from the host graph's
/// edge objects.
///
/// The engine holds these as shared, read-only handles: it re-reads
/// geometry, visibility and styling every frame and never mutates them.
pub trait EdgeHandle {
    /// Stable identifier; keys the simulation state across refreshes.
    fn id(&self) -> String;
    fn source_endpoint(&self) -> Point;
    fn target_endpoint(&self) -> Point;
    /// Raw interior control points; empty for straight edges.
    fn control_points(&self) -> Vec<Point>;
    /// False while the edge is hidden by host-side filters.
    fn is_visible(&self) -> bool;
    /// True while the host display state de-emphasizes the edge.
    fn is_dimmed(&self) -> bool;
    fn stroke_color(&self) -> Color;
    fn telemetry(&self) -> EdgeTelemetry;
}

/// Simulation state for one edge: the live points, their generator, and the
/// current handle to the underlying graph edge.
#[derive(Debug)]
pub struct TrafficEdge<E> {
    points: Vec<TrafficPoint>,
    generator: TrafficPointGenerator,
    edge: E,
    edge_type: TrafficEdgeType,
}

impl<E: EdgeHandle> TrafficEdge<E> {
    pub fn new(edge: E) -> Self {
        Self {
            points: Vec::new(),
            generator: TrafficPointGenerator::new(),
            edge,
            edge_type: TrafficEdgeType::None,
        }
    }

    /// Advance every live point by one step, then give the generator a
    /// chance to spawn. Finished points are pruned separately by
    /// `remove_finished_points` so a caller may inspect points that just
    /// crossed the end of the edge before they disappear.
    pub fn process_step<R: Rng>(&mut self, step_ms: f64, rng: &mut R) {
        for point in &mut self.points {
            point.delta += step_ms * point.speed / 1000.0;
        }
        let stroke = self.edge.stroke_color();
        if let Some(point) = self.generator.process_step(step_ms, stroke, rng) {
            self.points.push(point);
        }
    }

    /// Drop every point that has passed the end of the edge.
    pub fn remove_finished_points(&mut self) {
        self.points.retain(|point| point.delta <= 1.0);
    }

    pub fn points(&self) -> &[TrafficPoint] {
        &self.points
    }

    pub fn edge(&self) -> &E {
        &self.edge
    }

    pub fn edge_type(&self) -> TrafficEdgeType {
        self.edge_type
    }

    /// Current spawn interval in ms; `None` means the edge has no traffic.
    pub fn timer(&self) -> Option<f64> {
        self.generator.timer()
    }

    /// Speed applied to newly spawned points.
    pub fn speed(&self) -> f64 {
        self.generator.speed()
    }

    pub fn set_timer(&mut self, timer: Option<f64>) {
        self.generator.set_timer(timer);
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.generator.set_speed(speed);
    }

    pub fn set_error_rate(&mut self, error_rate: f64) {
        self.generator.set_error_rate(error_rate);
    }

    /// Replace the graph-edge handle so rendering uses current geometry.
    /// Simulation state is deliberately untouched.
    pub fn set_edge(&mut self, edge: E) {
        self.edge = edge;
    }

    pub fn set_type(&mut self, edge_type: TrafficEdgeType) {
        self.edge_type = edge_type;
        self.generator.set_type(edge_type);
    }

    #[cfg(test)]
    pub(crate) fn push_point(&mut self, point: TrafficPoint) {
        self.points.push(point);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    /// Shared stub edge for engine tests. Mirrors how the host hands the
    /// engine cheap-clone live handles onto mutable graph state.
    #[derive(Debug, Clone)]
    pub struct StubEdge(Rc<RefCell<StubEdgeData>>);

    #[derive(Debug)]
    pub struct StubEdgeData {
        pub id: String,
        pub source: Point,
        pub target: Point,
        pub control_points: Vec<Point>,
        pub visible: bool,
        pub dimmed: bool,
        pub stroke: Color,
        pub telemetry: EdgeTelemetry,
    }

    impl StubEdge {
        /// Straight edge between two endpoints with empty telemetry.
        pub fn linear(id: &str, source: Point, target: Point) -> Self {
            StubEdge(Rc::new(RefCell::new(StubEdgeData {
                id: id.to_string(),
                source,
                target,
                control_points: Vec::new(),
                visible: true,
                dimmed: false,
                stroke: Color::Green,
                telemetry: EdgeTelemetry::default(),
            })))
        }

        pub fn update<F: FnOnce(&mut StubEdgeData)>(&self, f: F) {
            f(&mut self.0.borrow_mut());
        }
    }

    impl EdgeHandle for StubEdge {
        fn id(&self) -> String {
            self.0.borrow().id.clone()
        }

        fn source_endpoint(&self) -> Point {
            self.0.borrow().source
        }

        fn target_endpoint(&self) -> Point {
            self.0.borrow().target
        }

        fn control_points(&self) -> Vec<Point> {
            self.0.borrow().control_points.clone()
        }

        fn is_visible(&self) -> bool {
            self.0.borrow().visible
        }

        fn is_dimmed(&self) -> bool {
            self.0.borrow().dimmed
        }

        fn stroke_color(&self) -> Color {
            self.0.borrow().stroke
        }

        fn telemetry(&self) -> EdgeTelemetry {
            self.0.borrow().telemetry
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::testing::StubEdge;
    use super::*;
    use crate::traffic::point::PointRenderer;

    fn stub() -> StubEdge {
        StubEdge::linear("a:b", Point::new(0.0, 0.0), Point::new(100.0, 0.0))
    }

    fn point(speed: f64, delta: f64) -> TrafficPoint {
        TrafficPoint {
            speed,
            delta,
            offset: None,
            renderer: PointRenderer::tcp(),
        }
    }

    #[test]
    fn test_from_protocol() {
        assert_eq!(
            TrafficEdgeType::from_protocol(Protocol::Http),
            TrafficEdgeType::Rps
        );
        assert_eq!(
            TrafficEdgeType::from_protocol(Protocol::Grpc),
            TrafficEdgeType::Rps
        );
        assert_eq!(
            TrafficEdgeType::from_protocol(Protocol::Tcp),
            TrafficEdgeType::Tcp
        );
        assert_eq!(
            TrafficEdgeType::from_protocol(Protocol::Unknown),
            TrafficEdgeType::None
        );
    }

    #[test]
    fn test_process_step_advances_deltas() {
        let mut edge = TrafficEdge::new(stub());
        edge.push_point(point(1.0, 0.0));
        edge.push_point(point(2.0, 0.5));

        let mut rng = ChaCha8Rng::seed_from_u64(7);
        edge.process_step(100.0, &mut rng);

        // 100ms at speed 1.0 covers a tenth of the edge, at 2.0 a fifth.
        assert!((edge.points()[0].delta - 0.1).abs() < 1e-12);
        assert!((edge.points()[1].delta - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_remove_finished_points() {
        let mut edge = TrafficEdge::new(stub());
        edge.push_point(point(1.0, 0.5));
        edge.push_point(point(1.0, 1.0));
        edge.push_point(point(1.0, 1.0001));

        edge.remove_finished_points();

        // Exactly 1.0 is still on the edge; anything past it is gone.
        assert_eq!(edge.points().len(), 2);
        assert!(edge.points().iter().all(|p| p.delta <= 1.0));
    }

    #[test]
    fn test_generator_spawn_appends_point() {
        let mut edge = TrafficEdge::new(stub());
        edge.set_type(TrafficEdgeType::Tcp);
        edge.set_speed(1.5);
        edge.set_timer(Some(100.0));

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        // A step far beyond the spawn interval forces a spawn.
        edge.process_step(1000.0, &mut rng);

        assert_eq!(edge.points().len(), 1);
        assert_eq!(edge.points()[0].delta, 0.0);
        assert_eq!(edge.points()[0].speed, 1.5);
    }

    #[test]
    fn test_set_edge_preserves_points() {
        let mut edge = TrafficEdge::new(stub());
        edge.push_point(point(1.0, 0.42));

        let replacement =
            StubEdge::linear("a:b", Point::new(10.0, 10.0), Point::new(90.0, 10.0));
        edge.set_edge(replacement);

        assert_eq!(edge.points().len(), 1);
        assert_eq!(edge.points()[0].delta, 0.42);
        assert_eq!(edge.edge().source_endpoint(), Point::new(10.0, 10.0));
    }

    proptest! {
        /// With positive speed, repeated steps never decrease delta.
        #[test]
        fn prop_delta_monotonic(
            speed in 0.0f64..4.0,
            steps in proptest::collection::vec(0.0f64..100.0, 1..20),
        ) {
            let mut edge = TrafficEdge::new(stub());
            edge.push_point(point(speed, 0.0));
            let mut rng = ChaCha8Rng::seed_from_u64(3);

            let mut last = 0.0;
            for step in steps {
                edge.process_step(step, &mut rng);
                let delta = edge.points()[0].delta;
                prop_assert!(delta >= last);
                last = delta;
            }
        }
    }
}
