// Traffic animation engine
//
// Turns per-edge telemetry (request rate, response latency, error
// percentage, byte throughput) into a continuous animation of points
// traveling along the topology's edges. The engine only knows the host
// graph through the EdgeHandle trait and only paints through the
// DrawSurface trait; everything else here is self-contained simulation.

pub mod edge;
pub mod generator;
pub mod geometry;
pub mod point;
pub mod renderer;
pub mod surface;

pub use edge::{EdgeHandle, EdgeTelemetry, Protocol, TrafficEdge, TrafficEdgeType};
pub use geometry::Point;
pub use point::{PointRenderer, TrafficPoint};
pub use renderer::{TrafficError, TrafficRenderer, FRAME_RATE};
pub use surface::{
    DrawSurface, PaintStyle, PaintedShape, ShapeBuffer, ShapeKind, SurfaceError, ViewTransform,
};
