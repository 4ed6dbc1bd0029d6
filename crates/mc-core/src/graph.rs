//! The mind-map aggregate: nodes plus the connectors between them.
//!
//! `Graph` is the only place nodes are deleted, so it is where the cascade
//! invariant lives: deleting a node removes every connector touching it.

use crate::connector::{Connector, ConnectorManager, ConnectorRecord, NodeLookup};
use crate::error::ConnectError;
use crate::id::{ConnectorId, NodeId};
use crate::model::{Node, NodeContent};
use kurbo::{Line, Point, Size};
use smallvec::SmallVec;
use std::collections::HashMap;

/// Nodes in insertion order (later = drawn on top) with an id index.
#[derive(Debug, Clone, Default)]
pub struct NodeStore {
    nodes: Vec<Node>,
    /// Index from NodeId → position in `nodes`.
    id_index: HashMap<NodeId, usize>,
}

impl NodeLookup for NodeStore {
    fn node(&self, id: NodeId) -> Option<&Node> {
        self.id_index.get(&id).map(|&i| &self.nodes[i])
    }
}

impl NodeStore {
    fn insert(&mut self, node: Node) {
        if let Some(&i) = self.id_index.get(&node.id) {
            log::warn!("replacing node with duplicate id {}", node.id);
            self.nodes[i] = node;
            return;
        }
        self.id_index.insert(node.id, self.nodes.len());
        self.nodes.push(node);
    }

    fn remove(&mut self, id: NodeId) -> Option<Node> {
        let i = self.id_index.remove(&id)?;
        let node = self.nodes.remove(i);
        self.rebuild_index();
        Some(node)
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.id_index.get(&id).copied().map(|i| &mut self.nodes[i])
    }

    /// Rebuild the `id_index` after positions shift.
    fn rebuild_index(&mut self) {
        self.id_index.clear();
        for (i, node) in self.nodes.iter().enumerate() {
            self.id_index.insert(node.id, i);
        }
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.id_index.clear();
    }
}

/// Nodes and connectors, kept mutually consistent.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: NodeStore,
    connectors: ConnectorManager,
}

impl Graph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a node with a fresh id at `position` and return its id.
    ///
    /// A non-finite position is replaced by the origin; it could not be
    /// written to JSON.
    pub fn add_node(&mut self, position: Point, size: Size, content: NodeContent, now_ms: u64) -> NodeId {
        let position = if position.is_finite() {
            position
        } else {
            log::warn!("non-finite node position ({}, {}), placing at origin", position.x, position.y);
            Point::ZERO
        };
        let id = NodeId::generate(now_ms);
        self.nodes.insert(Node::new(id, position, size, content, now_ms));
        log::debug!("node {id} added at ({}, {})", position.x, position.y);
        id
    }

    /// Insert a fully built node (load/import path). A node with the same id
    /// is replaced in place.
    pub fn insert_node(&mut self, node: Node) {
        self.nodes.insert(node);
    }

    /// Delete a node and every connector touching it.
    pub fn delete_node(&mut self, id: NodeId) -> Option<(Node, SmallVec<[ConnectorId; 4]>)> {
        let node = self.nodes.remove(id)?;
        let removed = self.connectors.remove_connectors_for_node(id);
        log::debug!("node {id} deleted with {} connector(s)", removed.len());
        Some((node, removed))
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.node(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.node(id).is_some()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.nodes.len()
    }

    pub fn lookup(&self) -> &NodeStore {
        &self.nodes
    }

    /// Move a node's top-left corner. Returns false for unknown ids and
    /// non-finite positions.
    pub fn move_node(&mut self, id: NodeId, position: Point) -> bool {
        if !position.is_finite() {
            log::warn!("ignoring non-finite move of {id} to ({}, {})", position.x, position.y);
            return false;
        }
        match self.nodes.get_mut(id) {
            Some(node) => {
                node.set_position(position);
                true
            }
            None => false,
        }
    }

    pub fn connect(&mut self, from: NodeId, to: NodeId) -> Result<Connector, ConnectError> {
        self.connectors.create(&self.nodes, from, to)
    }

    pub fn remove_connector(&mut self, id: ConnectorId) -> Option<Connector> {
        self.connectors.remove(id)
    }

    pub fn connectors(&self) -> &ConnectorManager {
        &self.connectors
    }

    /// World-space line for a connector, if both endpoints exist.
    pub fn connector_line(&self, connector: &Connector) -> Option<Line> {
        ConnectorManager::endpoints_of(connector, &self.nodes)
    }

    /// Lines of the connectors touching `node` only: O(degree).
    pub fn lines_for_node(&self, node: NodeId) -> SmallVec<[(ConnectorId, Line); 4]> {
        self.connectors
            .connectors_for_node(node)
            .iter()
            .filter_map(|c| self.connector_line(c).map(|line| (c.id, line)))
            .collect()
    }

    /// Replace all content. Connector records are resolved against the new
    /// node set; unresolvable ones are dropped and counted.
    pub fn replace(&mut self, nodes: Vec<Node>, connectors: &[ConnectorRecord]) -> usize {
        self.clear();
        for node in nodes {
            self.nodes.insert(node);
        }
        self.connectors.load_serialized_data(connectors, &self.nodes)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.connectors.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.nodes.is_empty()
    }
}
