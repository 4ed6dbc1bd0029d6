//! Connectors: undirected links between two nodes.
//!
//! The `ConnectorManager` owns the connector set and enforces its rules:
//! no self-loops, at most one connector per unordered node pair, and both
//! endpoints must resolve through the supplied `NodeLookup`. A connector has
//! no geometry of its own; its endpoints are the live centers of its nodes.

use crate::error::ConnectError;
use crate::id::{ConnectorId, NodeId};
use crate::model::Node;
use kurbo::Line;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Read access to nodes by id, supplied by whoever owns the node set.
pub trait NodeLookup {
    fn node(&self, id: NodeId) -> Option<&Node>;
}

/// A link between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connector {
    pub id: ConnectorId,
    pub from: NodeId,
    pub to: NodeId,
}

impl Connector {
    /// Whether this connector touches `node`.
    pub fn touches(&self, node: NodeId) -> bool {
        self.from == node || self.to == node
    }

    /// Order-independent pair comparison.
    pub fn links(&self, a: NodeId, b: NodeId) -> bool {
        (self.from == a && self.to == b) || (self.from == b && self.to == a)
    }

    pub fn to_record(&self) -> ConnectorRecord {
        ConnectorRecord {
            id: self.id,
            from_node_id: self.from,
            to_node_id: self.to,
        }
    }
}

/// Serialized connector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorRecord {
    pub id: ConnectorId,
    #[serde(rename = "fromNodeId")]
    pub from_node_id: NodeId,
    #[serde(rename = "toNodeId")]
    pub to_node_id: NodeId,
}

/// Owns every connector in the map.
#[derive(Debug, Clone, Default)]
pub struct ConnectorManager {
    connectors: Vec<Connector>,
}

impl ConnectorManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect `from` to `to`.
    ///
    /// # Errors
    /// `SelfLoop` when both ids are equal, `UnknownNode` when either id does
    /// not resolve, `Duplicate` when the pair is already linked in either
    /// direction. The set is untouched on error.
    pub fn create(
        &mut self,
        nodes: &impl NodeLookup,
        from: NodeId,
        to: NodeId,
    ) -> Result<Connector, ConnectError> {
        if from == to {
            return Err(ConnectError::SelfLoop(from));
        }
        for id in [from, to] {
            if nodes.node(id).is_none() {
                return Err(ConnectError::UnknownNode(id));
            }
        }
        if self.find_between(from, to).is_some() {
            return Err(ConnectError::Duplicate { from, to });
        }

        let connector = Connector {
            id: self.unused_id(ConnectorId::between(from, to)),
            from,
            to,
        };
        self.connectors.push(connector);
        log::debug!("connector {} created", connector.id);
        Ok(connector)
    }

    /// Remove one connector by id.
    pub fn remove(&mut self, id: ConnectorId) -> Option<Connector> {
        let pos = self.connectors.iter().position(|c| c.id == id)?;
        Some(self.connectors.remove(pos))
    }

    /// Remove every connector touching `node`. Returns the removed ids.
    ///
    /// Node deletion must go through here so no connector outlives its nodes.
    pub fn remove_connectors_for_node(&mut self, node: NodeId) -> SmallVec<[ConnectorId; 4]> {
        let mut removed = SmallVec::new();
        self.connectors.retain(|c| {
            if c.touches(node) {
                removed.push(c.id);
                false
            } else {
                true
            }
        });
        removed
    }

    /// The connector linking `a` and `b`, in either direction.
    pub fn find_between(&self, a: NodeId, b: NodeId) -> Option<&Connector> {
        self.connectors.iter().find(|c| c.links(a, b))
    }

    pub fn get(&self, id: ConnectorId) -> Option<&Connector> {
        self.connectors.iter().find(|c| c.id == id)
    }

    /// Connectors touching `node`, in creation order.
    pub fn connectors_for_node(&self, node: NodeId) -> SmallVec<[Connector; 4]> {
        self.connectors.iter().filter(|c| c.touches(node)).copied().collect()
    }

    /// World-space line between the centers of the two endpoint nodes.
    ///
    /// `None` when either endpoint does not resolve, which can happen
    /// transiently while a bulk load is in progress.
    pub fn endpoints_of(connector: &Connector, nodes: &impl NodeLookup) -> Option<Line> {
        let from = nodes.node(connector.from)?;
        let to = nodes.node(connector.to)?;
        Some(Line::new(from.center(), to.center()))
    }

    /// Replace the whole set from records, dropping any whose endpoints do
    /// not resolve (or that would be a self-loop or duplicate).
    /// Returns how many records were dropped.
    pub fn load_serialized_data(
        &mut self,
        records: &[ConnectorRecord],
        nodes: &impl NodeLookup,
    ) -> usize {
        self.connectors.clear();
        let mut dropped = 0;
        for record in records {
            let (from, to) = (record.from_node_id, record.to_node_id);
            let valid = from != to
                && nodes.node(from).is_some()
                && nodes.node(to).is_some()
                && self.find_between(from, to).is_none();
            if valid {
                let id = self.unused_id(record.id);
                if id != record.id {
                    log::debug!("connector record {} renamed to {id}", record.id);
                }
                self.connectors.push(Connector { id, from, to });
            } else {
                log::debug!("dropping connector record {} ({from} -> {to})", record.id);
                dropped += 1;
            }
        }
        dropped
    }

    /// `base`, or `base#2`, `base#3`, ... when taken. Generated ids can
    /// collide when node ids contain `_` (`a_b`+`c` vs `a`+`b_c`).
    fn unused_id(&self, base: ConnectorId) -> ConnectorId {
        if self.get(base).is_none() {
            return base;
        }
        let mut n = 2u32;
        loop {
            let id = ConnectorId::intern(&format!("{}#{n}", base.as_str()));
            if self.get(id).is_none() {
                return id;
            }
            n += 1;
        }
    }

    pub fn serialized_data(&self) -> Vec<ConnectorRecord> {
        self.connectors.iter().map(Connector::to_record).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Connector> {
        self.connectors.iter()
    }

    pub fn len(&self) -> usize {
        self.connectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }

    pub fn clear(&mut self) {
        self.connectors.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DEFAULT_NODE_SIZE, NodeContent};
    use kurbo::Point;
    use std::collections::HashMap;

    struct Nodes(HashMap<NodeId, Node>);

    impl NodeLookup for Nodes {
        fn node(&self, id: NodeId) -> Option<&Node> {
            self.0.get(&id)
        }
    }

    fn nodes(ids: &[(&str, f64, f64)]) -> Nodes {
        Nodes(
            ids.iter()
                .map(|&(id, x, y)| {
                    let id = NodeId::intern(id);
                    let n = Node::new(id, Point::new(x, y), DEFAULT_NODE_SIZE, NodeContent::default(), 0);
                    (id, n)
                })
                .collect(),
        )
    }

    #[test]
    fn reverse_duplicate_is_rejected() {
        let lookup = nodes(&[("ca", 0.0, 0.0), ("cb", 100.0, 0.0)]);
        let (a, b) = (NodeId::intern("ca"), NodeId::intern("cb"));
        let mut mgr = ConnectorManager::new();
        let c = mgr.create(&lookup, a, b).unwrap();
        assert_eq!(c.id.as_str(), "conn_ca_cb");
        assert_eq!(
            mgr.create(&lookup, b, a),
            Err(ConnectError::Duplicate { from: b, to: a })
        );
        assert_eq!(mgr.len(), 1);
    }

    #[test]
    fn self_loop_is_rejected() {
        let lookup = nodes(&[("solo", 0.0, 0.0)]);
        let a = NodeId::intern("solo");
        let mut mgr = ConnectorManager::new();
        assert_eq!(mgr.create(&lookup, a, a), Err(ConnectError::SelfLoop(a)));
        assert!(mgr.is_empty());
    }

    #[test]
    fn unknown_endpoint_is_rejected() {
        let lookup = nodes(&[("known", 0.0, 0.0)]);
        let mut mgr = ConnectorManager::new();
        let ghost = NodeId::intern("ghost");
        assert_eq!(
            mgr.create(&lookup, NodeId::intern("known"), ghost),
            Err(ConnectError::UnknownNode(ghost))
        );
    }

    #[test]
    fn removing_node_connectors_leaves_others() {
        let lookup = nodes(&[("ra", 0.0, 0.0), ("rb", 0.0, 0.0), ("rc", 0.0, 0.0), ("rd", 0.0, 0.0)]);
        let [a, b, c, d] = ["ra", "rb", "rc", "rd"].map(NodeId::intern);
        let mut mgr = ConnectorManager::new();
        mgr.create(&lookup, a, b).unwrap();
        mgr.create(&lookup, c, a).unwrap();
        let keep = mgr.create(&lookup, c, d).unwrap();

        let removed = mgr.remove_connectors_for_node(a);
        assert_eq!(removed.len(), 2);
        assert_eq!(mgr.iter().copied().collect::<Vec<_>>(), vec![keep]);
    }

    #[test]
    fn endpoints_are_node_centers() {
        let lookup = nodes(&[("ea", 0.0, 0.0), ("eb", 100.0, 0.0)]);
        let mut mgr = ConnectorManager::new();
        let c = mgr
            .create(&lookup, NodeId::intern("ea"), NodeId::intern("eb"))
            .unwrap();
        let line = ConnectorManager::endpoints_of(&c, &lookup).unwrap();
        assert_eq!(line.p0, Point::new(90.0, 36.0));
        assert_eq!(line.p1, Point::new(190.0, 36.0));
    }

    #[test]
    fn endpoints_of_dangling_connector_is_none() {
        let lookup = nodes(&[("da", 0.0, 0.0)]);
        let c = Connector {
            id: ConnectorId::intern("conn_da_gone"),
            from: NodeId::intern("da"),
            to: NodeId::intern("gone"),
        };
        assert!(ConnectorManager::endpoints_of(&c, &lookup).is_none());
    }

    #[test]
    fn ambiguous_generated_ids_are_made_unique() {
        let lookup = nodes(&[("a", 0.0, 0.0), ("a_b", 0.0, 0.0), ("b_c", 0.0, 0.0), ("c", 0.0, 0.0)]);
        let [a, a_b, b_c, c] = ["a", "a_b", "b_c", "c"].map(NodeId::intern);
        let mut mgr = ConnectorManager::new();
        let first = mgr.create(&lookup, a_b, c).unwrap();
        let second = mgr.create(&lookup, a, b_c).unwrap();
        assert_eq!(first.id.as_str(), "conn_a_b_c");
        assert_eq!(second.id.as_str(), "conn_a_b_c#2");

        mgr.remove_connectors_for_node(c);
        assert_eq!(mgr.iter().copied().collect::<Vec<_>>(), vec![second]);
    }

    #[test]
    fn load_renames_records_with_repeated_ids() {
        let lookup = nodes(&[("a", 0.0, 0.0), ("a_b", 0.0, 0.0), ("b_c", 0.0, 0.0), ("c", 0.0, 0.0)]);
        let records: Vec<ConnectorRecord> = serde_json::from_str(
            r#"[
                {"id":"conn_a_b_c","fromNodeId":"a_b","toNodeId":"c"},
                {"id":"conn_a_b_c","fromNodeId":"a","toNodeId":"b_c"}
            ]"#,
        )
        .unwrap();
        let mut mgr = ConnectorManager::new();
        assert_eq!(mgr.load_serialized_data(&records, &lookup), 0);
        let ids: Vec<&str> = mgr.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["conn_a_b_c", "conn_a_b_c#2"]);
    }

    #[test]
    fn load_drops_records_with_missing_endpoints() {
        let lookup = nodes(&[("la", 0.0, 0.0), ("lb", 0.0, 0.0)]);
        let records: Vec<ConnectorRecord> = serde_json::from_str(
            r#"[
                {"id":"conn_la_lb","fromNodeId":"la","toNodeId":"lb"},
                {"id":"conn_la_deleted","fromNodeId":"la","toNodeId":"deleted"}
            ]"#,
        )
        .unwrap();
        let mut mgr = ConnectorManager::new();
        let dropped = mgr.load_serialized_data(&records, &lookup);
        assert_eq!(dropped, 1);
        assert_eq!(mgr.serialized_data(), records[..1].to_vec());
    }
}
