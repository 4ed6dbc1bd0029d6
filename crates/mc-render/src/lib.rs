pub mod connectors;
pub mod frame;
pub mod hit;
pub mod paint;

pub use connectors::ConnectorLayer;
pub use frame::{FrameScheduler, Recompute};
pub use hit::hit_test;
pub use paint::{ConnectorVisual, DisplayList, Highlight, NodeVisual, css_transform, paint_scene};
