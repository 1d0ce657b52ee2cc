// Built-in demo mesh
//
// A small storefront-style topology with every edge shape the renderer
// handles: straight edges, bowed curves where a node pair carries more
// than one edge, and a self-loop. Telemetry starts from fixed baselines
// and drifts each refresh with bounded random walks, so the animation has
// something believable to chew on without a metrics backend.

use rand::Rng;

use super::{MeshEdge, MeshEdgeData, MeshNode, MeshTopology, NodeKind};
use crate::traffic::geometry::clamp;
use crate::traffic::{EdgeTelemetry, Point, Protocol};

/// Bow height, in canvas units, for curved edges.
const CURVE_BOW: f64 = 7.0;

/// Horizontal and vertical reach of the self-loop control points.
const LOOP_REACH_X: f64 = 5.0;
const LOOP_REACH_Y: f64 = 11.0;

/// Bounds for drifting request rates (requests per second).
const RPS_MIN: f64 = 0.5;
const RPS_MAX: f64 = 800.0;

/// Bounds for drifting error percentages.
const PERCENT_ERR_MAX: f64 = 35.0;

/// Bounds for drifting response times (ms).
const RESPONSE_TIME_MIN: f64 = 20.0;
const RESPONSE_TIME_MAX: f64 = 8000.0;

/// Bounds for drifting TCP send rates (bytes per second).
const TCP_RATE_MIN: f64 = 1024.0;
const TCP_RATE_MAX: f64 = 1024.0 * 1024.0;

/// Build the demo topology.
pub fn demo_topology() -> MeshTopology {
    let nodes = vec![
        MeshNode::new("ingress", NodeKind::Gateway, 8.0, 50.0),
        MeshNode::new("web", NodeKind::Service, 30.0, 64.0),
        MeshNode::new("api", NodeKind::Service, 30.0, 36.0),
        MeshNode::new("catalog", NodeKind::Service, 56.0, 72.0),
        MeshNode::new("cart", NodeKind::Service, 56.0, 50.0),
        MeshNode::new("auth", NodeKind::Service, 56.0, 26.0),
        MeshNode::new("orders-db", NodeKind::Store, 82.0, 58.0),
        MeshNode::new("cache", NodeKind::Store, 82.0, 34.0),
    ];

    let at = |name: &str| -> Point {
        nodes
            .iter()
            .find(|n| n.name == name)
            .map(|n| n.position())
            .unwrap_or_default()
    };

    let edges = vec![
        http_edge(at("ingress"), at("web"), "ingress", "web", 240.0, 0.8, 180.0),
        http_edge(at("ingress"), at("api"), "ingress", "api", 120.0, 1.2, 220.0),
        http_edge(at("web"), at("catalog"), "web", "catalog", 160.0, 0.4, 150.0),
        // web and api both call cart; bow the web edge so they stay apart.
        curved(http_edge(
            at("web"),
            at("cart"),
            "web",
            "cart",
            90.0,
            2.5,
            300.0,
        )),
        http_edge(at("api"), at("cart"), "api", "cart", 70.0, 6.5, 260.0),
        grpc_edge(at("api"), at("auth"), "api", "auth", 55.0, 0.2, 90.0),
        curved(grpc_edge(
            at("web"),
            at("auth"),
            "web",
            "auth",
            25.0,
            0.0,
            110.0,
        )),
        // auth retries itself on token refresh; renders as a self-loop.
        looped(grpc_edge(
            at("auth"),
            at("auth"),
            "auth",
            "auth",
            4.0,
            1.0,
            60.0,
        )),
        tcp_edge(at("catalog"), at("orders-db"), "catalog", "orders-db", 320.0 * 1024.0),
        tcp_edge(at("cart"), at("cache"), "cart", "cache", 96.0 * 1024.0),
    ];

    MeshTopology::new(nodes, edges)
}

/// Drift every edge's telemetry one refresh step. Metrics that are absent
/// stay absent; present metrics random-walk within their bounds.
pub fn drift_telemetry<R: Rng>(topology: &MeshTopology, rng: &mut R) {
    for edge in topology.edges() {
        edge.update(|data| {
            let t = &mut data.telemetry;
            t.http_rps = t.http_rps.map(|v| walk_scale(rng, v, RPS_MIN, RPS_MAX));
            t.grpc_rps = t.grpc_rps.map(|v| walk_scale(rng, v, RPS_MIN, RPS_MAX));
            t.http_percent_err = t
                .http_percent_err
                .map(|v| walk_add(rng, v, PERCENT_ERR_MAX));
            t.grpc_percent_err = t
                .grpc_percent_err
                .map(|v| walk_add(rng, v, PERCENT_ERR_MAX));
            t.response_time_ms = t
                .response_time_ms
                .map(|v| walk_scale(rng, v, RESPONSE_TIME_MIN, RESPONSE_TIME_MAX));
            t.tcp_sent_bytes_per_sec = t
                .tcp_sent_bytes_per_sec
                .map(|v| walk_scale(rng, v, TCP_RATE_MIN, TCP_RATE_MAX));
        });
    }
}

/// Multiplicative random walk, +-10% per refresh.
fn walk_scale<R: Rng>(rng: &mut R, value: f64, min: f64, max: f64) -> f64 {
    clamp(value * (1.0 + rng.gen_range(-0.1..0.1)), min, max)
}

/// Additive random walk for percentages, +-2 points per refresh.
fn walk_add<R: Rng>(rng: &mut R, value: f64, max: f64) -> f64 {
    clamp(value + rng.gen_range(-2.0..2.0), 0.0, max)
}

fn base_edge(source_point: Point, target_point: Point, source: &str, target: &str) -> MeshEdgeData {
    MeshEdgeData {
        id: format!("{}:{}", source, target),
        source: source.to_string(),
        target: target.to_string(),
        source_point,
        target_point,
        control_points: Vec::new(),
        visible: true,
        dimmed: false,
        telemetry: EdgeTelemetry::default(),
    }
}

fn http_edge(
    source_point: Point,
    target_point: Point,
    source: &str,
    target: &str,
    rps: f64,
    percent_err: f64,
    response_time_ms: f64,
) -> MeshEdge {
    let mut data = base_edge(source_point, target_point, source, target);
    data.telemetry = EdgeTelemetry {
        protocol: Protocol::Http,
        http_rps: Some(rps),
        http_percent_err: Some(percent_err),
        response_time_ms: Some(response_time_ms),
        ..EdgeTelemetry::default()
    };
    MeshEdge::new(data)
}

fn grpc_edge(
    source_point: Point,
    target_point: Point,
    source: &str,
    target: &str,
    rps: f64,
    percent_err: f64,
    response_time_ms: f64,
) -> MeshEdge {
    let mut data = base_edge(source_point, target_point, source, target);
    data.telemetry = EdgeTelemetry {
        protocol: Protocol::Grpc,
        grpc_rps: Some(rps),
        grpc_percent_err: Some(percent_err),
        response_time_ms: Some(response_time_ms),
        ..EdgeTelemetry::default()
    };
    MeshEdge::new(data)
}

fn tcp_edge(
    source_point: Point,
    target_point: Point,
    source: &str,
    target: &str,
    bytes_per_sec: f64,
) -> MeshEdge {
    let mut data = base_edge(source_point, target_point, source, target);
    data.telemetry = EdgeTelemetry {
        protocol: Protocol::Tcp,
        tcp_sent_bytes_per_sec: Some(bytes_per_sec),
        ..EdgeTelemetry::default()
    };
    MeshEdge::new(data)
}

/// Bow an edge into a curve: one control point at the segment midpoint,
/// pushed out along the perpendicular.
fn curved(edge: MeshEdge) -> MeshEdge {
    edge.update(|data| {
        let (s, t) = (data.source_point, data.target_point);
        let mid = Point::new((s.x + t.x) / 2.0, (s.y + t.y) / 2.0);
        let (dx, dy) = (t.x - s.x, t.y - s.y);
        let len = (dx * dx + dy * dy).sqrt().max(1.0);
        data.control_points = vec![Point::new(
            mid.x - dy / len * CURVE_BOW,
            mid.y + dx / len * CURVE_BOW,
        )];
    });
    edge
}

/// Turn an edge whose endpoints coincide into a self-loop: two control
/// points reaching above the node.
fn looped(edge: MeshEdge) -> MeshEdge {
    edge.update(|data| {
        let p = data.source_point;
        data.control_points = vec![
            Point::new(p.x - LOOP_REACH_X, p.y + LOOP_REACH_Y),
            Point::new(p.x + LOOP_REACH_X, p.y + LOOP_REACH_Y),
        ];
    });
    edge
}
