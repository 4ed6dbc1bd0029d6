//! Connector line cache.
//!
//! Holds the last computed world-space `Line` for every connector so a node
//! drag only recomputes the connectors touching that node. Lines are
//! derived from model geometry, never measured from a rendering surface.

use mc_core::{ConnectorId, Graph, Line, NodeId};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct ConnectorLayer {
    lines: HashMap<ConnectorId, Line>,
}

impl ConnectorLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute every connector. Used after load, import, zoom and resize.
    pub fn redraw_all(&mut self, graph: &Graph) {
        self.lines.clear();
        for connector in graph.connectors().iter() {
            if let Some(line) = graph.connector_line(connector) {
                self.lines.insert(connector.id, line);
            }
        }
        log::trace!("connector layer redrawn: {} line(s)", self.lines.len());
    }

    /// Recompute only the connectors touching `node`. Returns how many
    /// lines were refreshed.
    pub fn update_for_node(&mut self, graph: &Graph, node: NodeId) -> usize {
        let lines = graph.lines_for_node(node);
        for &(id, line) in &lines {
            self.lines.insert(id, line);
        }
        lines.len()
    }

    /// Add (or refresh) a single connector's line.
    pub fn insert(&mut self, graph: &Graph, id: ConnectorId) {
        let line = graph
            .connectors()
            .get(id)
            .and_then(|connector| graph.connector_line(connector));
        match line {
            Some(line) => {
                self.lines.insert(id, line);
            }
            None => {
                self.lines.remove(&id);
            }
        }
    }

    pub fn remove(&mut self, id: ConnectorId) -> Option<Line> {
        self.lines.remove(&id)
    }

    pub fn remove_all<I: IntoIterator<Item = ConnectorId>>(&mut self, ids: I) {
        for id in ids {
            self.lines.remove(&id);
        }
    }

    pub fn line(&self, id: ConnectorId) -> Option<Line> {
        self.lines.get(&id).copied()
    }

    /// Cached lines in the graph's connector order.
    pub fn lines<'a>(&'a self, graph: &'a Graph) -> impl Iterator<Item = (ConnectorId, Line)> + 'a {
        graph
            .connectors()
            .iter()
            .filter_map(|connector| self.line(connector.id).map(|line| (connector.id, line)))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
