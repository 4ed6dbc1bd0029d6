pub mod connector;
pub mod error;
pub mod graph;
pub mod id;
pub mod model;
pub mod snapshot;
pub mod transform;

pub use connector::{Connector, ConnectorManager, ConnectorRecord, NodeLookup};
pub use error::{ConnectError, ValidationError};
pub use graph::{Graph, NodeStore};
pub use id::{ConnectorId, NodeId};
pub use model::*;
pub use snapshot::{GraphSnapshot, LoadReport};
pub use transform::{ViewTransform, Viewport, screen_to_viewport, snap, snap_point};

// Re-export kurbo geometry so downstream crates share one version
pub use kurbo::{Line, Point, Rect, Size, Vec2};
