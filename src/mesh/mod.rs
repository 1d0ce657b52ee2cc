// Mesh topology model
//
// Owns the nodes and edges the dashboard displays. Edges are shared,
// cheap-clone handles (Rc<RefCell<..>>) so the traffic engine keeps a live
// reference across telemetry refreshes while this module mutates telemetry
// and display flags in place. The engine only ever reads through the
// EdgeHandle trait.

pub mod demo;

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use ratatui::style::Color;

use crate::theme;
use crate::traffic::{EdgeHandle, EdgeTelemetry, Point, Protocol};

/// Workload kind, determines the node glyph on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Traffic entry point into the mesh
    Gateway,
    /// Regular workload
    Service,
    /// Backing store (database, cache, queue)
    Store,
}

impl NodeKind {
    pub fn glyph(&self) -> &'static str {
        match self {
            NodeKind::Gateway => "◈",
            NodeKind::Service => "●",
            NodeKind::Store => "▣",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            NodeKind::Gateway => theme::ACCENT_BLUE,
            NodeKind::Service => theme::TEXT_GREY,
            NodeKind::Store => theme::TCP_BLUE,
        }
    }
}

/// One workload in the mesh, positioned in canvas space.
#[derive(Debug, Clone)]
pub struct MeshNode {
    pub name: String,
    pub kind: NodeKind,
    pub x: f64,
    pub y: f64,
}

impl MeshNode {
    pub fn new(name: &str, kind: NodeKind, x: f64, y: f64) -> Self {
        Self {
            name: name.to_string(),
            kind,
            x,
            y,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Mutable state behind a shared edge handle.
#[derive(Debug)]
pub struct MeshEdgeData {
    pub id: String,
    pub source: String,
    pub target: String,
    pub source_point: Point,
    pub target_point: Point,
    /// Raw interior control points: empty for a straight edge, one for a
    /// curve, two for a self-loop.
    pub control_points: Vec<Point>,
    pub visible: bool,
    pub dimmed: bool,
    pub telemetry: EdgeTelemetry,
}

impl MeshEdgeData {
    /// The error percentage relevant for this edge's protocol.
    pub fn percent_err(&self) -> Option<f64> {
        match self.telemetry.protocol {
            Protocol::Http => self.telemetry.http_percent_err,
            Protocol::Grpc => self.telemetry.grpc_percent_err,
            Protocol::Tcp | Protocol::Unknown => None,
        }
    }

    /// The headline rate for this edge's protocol: requests/s for HTTP and
    /// gRPC, bytes/s for TCP.
    pub fn rate(&self) -> Option<f64> {
        match self.telemetry.protocol {
            Protocol::Http => self.telemetry.http_rps,
            Protocol::Grpc => self.telemetry.grpc_rps,
            Protocol::Tcp => self.telemetry.tcp_sent_bytes_per_sec,
            Protocol::Unknown => None,
        }
    }
}

/// Shared handle onto one mesh edge.
#[derive(Debug, Clone)]
pub struct MeshEdge(Rc<RefCell<MeshEdgeData>>);

impl MeshEdge {
    pub fn new(data: MeshEdgeData) -> Self {
        MeshEdge(Rc::new(RefCell::new(data)))
    }

    pub fn data(&self) -> Ref<'_, MeshEdgeData> {
        self.0.borrow()
    }

    pub fn update<F: FnOnce(&mut MeshEdgeData)>(&self, f: F) {
        f(&mut self.0.borrow_mut());
    }
}

impl EdgeHandle for MeshEdge {
    fn id(&self) -> String {
        self.0.borrow().id.clone()
    }

    fn source_endpoint(&self) -> Point {
        self.0.borrow().source_point
    }

    fn target_endpoint(&self) -> Point {
        self.0.borrow().target_point
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
        let data = self.0.borrow();
        theme::edge_stroke_color(data.telemetry.protocol, data.percent_err())
    }

    fn telemetry(&self) -> EdgeTelemetry {
        self.0.borrow().telemetry
    }
}

/// Protocol filter the user cycles through to narrow the displayed traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProtocolFilter {
    #[default]
    All,
    Http,
    Grpc,
    Tcp,
}

impl ProtocolFilter {
    pub fn next(self) -> Self {
        match self {
            ProtocolFilter::All => ProtocolFilter::Http,
            ProtocolFilter::Http => ProtocolFilter::Grpc,
            ProtocolFilter::Grpc => ProtocolFilter::Tcp,
            ProtocolFilter::Tcp => ProtocolFilter::All,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProtocolFilter::All => "all",
            ProtocolFilter::Http => "HTTP",
            ProtocolFilter::Grpc => "gRPC",
            ProtocolFilter::Tcp => "TCP",
        }
    }

    pub fn matches(&self, protocol: Protocol) -> bool {
        match self {
            ProtocolFilter::All => true,
            ProtocolFilter::Http => protocol == Protocol::Http,
            ProtocolFilter::Grpc => protocol == Protocol::Grpc,
            ProtocolFilter::Tcp => protocol == Protocol::Tcp,
        }
    }
}

/// The topology currently on screen.
#[derive(Debug)]
pub struct MeshTopology {
    nodes: Vec<MeshNode>,
    edges: Vec<MeshEdge>,
}

impl MeshTopology {
    pub fn new(nodes: Vec<MeshNode>, edges: Vec<MeshEdge>) -> Self {
        Self { nodes, edges }
    }

    pub fn nodes(&self) -> &[MeshNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[MeshEdge] {
        &self.edges
    }

    /// Dim every edge except the selected one. With no selection, nothing
    /// is dimmed.
    pub fn apply_selection(&self, selected: Option<usize>) {
        for (index, edge) in self.edges.iter().enumerate() {
            edge.update(|data| data.dimmed = selected.is_some_and(|s| s != index));
        }
    }

    /// Show only edges matching the protocol filter.
    pub fn apply_filter(&self, filter: ProtocolFilter) {
        for edge in &self.edges {
            edge.update(|data| data.visible = filter.matches(data.telemetry.protocol));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(id: &str, protocol: Protocol) -> MeshEdge {
        MeshEdge::new(MeshEdgeData {
            id: id.to_string(),
            source: "a".to_string(),
            target: "b".to_string(),
            source_point: Point::new(0.0, 0.0),
            target_point: Point::new(10.0, 0.0),
            control_points: Vec::new(),
            visible: true,
            dimmed: false,
            telemetry: EdgeTelemetry {
                protocol,
                ..EdgeTelemetry::default()
            },
        })
    }

    #[test]
    fn test_apply_selection_dims_other_edges() {
        let topology = MeshTopology::new(
            Vec::new(),
            vec![
                edge("a", Protocol::Http),
                edge("b", Protocol::Http),
                edge("c", Protocol::Tcp),
            ],
        );

        topology.apply_selection(Some(1));
        assert!(topology.edges()[0].is_dimmed());
        assert!(!topology.edges()[1].is_dimmed());
        assert!(topology.edges()[2].is_dimmed());

        topology.apply_selection(None);
        assert!(topology.edges().iter().all(|e| !e.is_dimmed()));
    }

    #[test]
    fn test_apply_filter_hides_non_matching_edges() {
        let topology = MeshTopology::new(
            Vec::new(),
            vec![edge("a", Protocol::Http), edge("b", Protocol::Tcp)],
        );

        topology.apply_filter(ProtocolFilter::Tcp);
        assert!(!topology.edges()[0].is_visible());
        assert!(topology.edges()[1].is_visible());

        topology.apply_filter(ProtocolFilter::All);
        assert!(topology.edges().iter().all(|e| e.is_visible()));
    }

    #[test]
    fn test_protocol_filter_cycle_returns_to_all() {
        let mut filter = ProtocolFilter::All;
        for _ in 0..4 {
            filter = filter.next();
        }
        assert_eq!(filter, ProtocolFilter::All);
    }

    #[test]
    fn test_edge_handle_reads_live_state() {
        let handle = edge("a", Protocol::Http);
        let clone = handle.clone();

        clone.update(|data| {
            data.telemetry.http_percent_err = Some(50.0);
            data.visible = false;
        });

        // Both handles observe the same underlying data.
        assert!(!handle.is_visible());
        assert_eq!(handle.telemetry().http_percent_err, Some(50.0));
        assert_eq!(handle.stroke_color(), theme::FAILING_RED);
    }
}
