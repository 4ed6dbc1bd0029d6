//! Graph → display list.
//!
//! Produces a flat, render-agnostic description of one frame: node boxes in
//! viewport space with their resolved text color, connector lines from the
//! `ConnectorLayer`, and the CSS transform the host applies to its world
//! layer. The host draws it however it likes.

use crate::connectors::ConnectorLayer;
use mc_core::{ConnectorId, Graph, Line, Node, NodeId, Rect, ViewTransform};

/// Orthogonal UI state that changes how nodes are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Highlight {
    pub selected: Option<NodeId>,
    /// Start node of an in-progress connection.
    pub connect_source: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeVisual {
    pub id: NodeId,
    /// World-space bounds.
    pub bounds: Rect,
    /// Viewport-space bounds after the view transform.
    pub screen: Rect,
    pub title: String,
    pub description: String,
    pub icon: Option<String>,
    pub fill: String,
    pub text_color: &'static str,
    pub selected: bool,
    pub connect_source: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectorVisual {
    pub id: ConnectorId,
    /// World-space line between node centers.
    pub line: Line,
    /// The same line in viewport space.
    pub screen: Line,
}

/// One frame's worth of drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayList {
    pub transform: ViewTransform,
    pub css_transform: String,
    pub nodes: Vec<NodeVisual>,
    pub connectors: Vec<ConnectorVisual>,
}

/// Build the display list for the current graph and view.
///
/// Nodes come out back-to-front. Connectors use the cached lines in
/// `layer`; a connector missing from the cache is skipped.
pub fn paint_scene(
    graph: &Graph,
    layer: &ConnectorLayer,
    view: &ViewTransform,
    highlight: Highlight,
) -> DisplayList {
    let nodes = graph
        .nodes()
        .iter()
        .map(|node| paint_node(node, view, highlight))
        .collect();

    let connectors = layer
        .lines(graph)
        .map(|(id, line)| ConnectorVisual {
            id,
            line,
            screen: Line::new(view.to_viewport(line.p0), view.to_viewport(line.p1)),
        })
        .collect();

    DisplayList {
        transform: *view,
        css_transform: css_transform(view),
        nodes,
        connectors,
    }
}

fn paint_node(node: &Node, view: &ViewTransform, highlight: Highlight) -> NodeVisual {
    let bounds = node.bounds();
    let screen = Rect::from_origin_size(view.to_viewport(bounds.origin()), view.scale_size(bounds.size()));
    NodeVisual {
        id: node.id,
        bounds,
        screen,
        title: node.title.clone(),
        description: node.description.clone(),
        icon: node.icon.as_ref().map(|icon| icon.as_str().to_string()),
        fill: node.color.clone(),
        text_color: node.text_color(),
        selected: highlight.selected == Some(node.id),
        connect_source: highlight.connect_source == Some(node.id),
    }
}

// ─── Host transform ──────────────────────────────────────────────────────────

/// CSS transform for the host's world layer: `translate(<x>px, <y>px) scale(<s>)`.
pub fn css_transform(view: &ViewTransform) -> String {
    format!("translate({}px, {}px) scale({})", view.x, view.y, view.scale)
}
