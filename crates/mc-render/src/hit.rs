//! Hit testing: point → node lookup.
//!
//! Walks nodes back-to-front (last inserted = drawn on top) and returns the
//! first one whose bounds contain the world-space point.

use mc_core::{Graph, NodeId, Point, Rect};

/// Find the topmost node at a world-space point.
/// Returns `None` if no node is hit (background).
pub fn hit_test(graph: &Graph, world: Point) -> Option<NodeId> {
    graph
        .nodes()
        .iter()
        .rev()
        .find(|node| contains(node.bounds(), world))
        .map(|node| node.id)
}

// Edges inclusive on both sides.
fn contains(bounds: Rect, p: Point) -> bool {
    p.x >= bounds.x0 && p.x <= bounds.x1 && p.y >= bounds.y0 && p.y <= bounds.y1
}
