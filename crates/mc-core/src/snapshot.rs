//! Graph snapshots: the unit of persistence and import/export.
//!
//! A snapshot document looks like:
//!
//! ```json
//! {
//!   "nodes": [{ "id": "node_…", "x": 0, "y": 0, "title": "…", … }],
//!   "connectors": [{ "id": "conn_a_b", "fromNodeId": "a", "toNodeId": "b" }],
//!   "viewTransform": { "x": 0, "y": 0, "scale": 1 },
//!   "snapToGridEnabled": false
//! }
//! ```
//!
//! Imports are validated strictly (both arrays must be present) before
//! anything is mutated. Stored snapshots are read leniently: missing arrays
//! mean "empty". In both cases connectors whose endpoints are missing are
//! dropped, not reported.

use crate::connector::ConnectorRecord;
use crate::error::ValidationError;
use crate::graph::Graph;
use crate::model::{Node, NodeRecord};
use crate::transform::ViewTransform;
use kurbo::Size;
use serde::{Deserialize, Serialize};

/// Serialized form of a whole map.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSnapshot {
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub connectors: Vec<ConnectorRecord>,
    #[serde(default)]
    pub view_transform: Option<ViewTransform>,
    #[serde(default)]
    pub snap_to_grid_enabled: bool,
}

/// What a load did beyond the happy path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadReport {
    pub nodes: usize,
    pub connectors: usize,
    /// Connector records dropped because an endpoint was missing.
    pub dropped_connectors: usize,
}

impl GraphSnapshot {
    /// Capture a graph plus view state.
    pub fn capture(graph: &Graph, view: ViewTransform, snap_to_grid: bool) -> Self {
        Self {
            nodes: graph.nodes().iter().map(Node::to_record).collect(),
            connectors: graph.connectors().serialized_data(),
            view_transform: Some(view),
            snap_to_grid_enabled: snap_to_grid,
        }
    }

    /// Parse an import document.
    ///
    /// # Errors
    /// `NotJson` for unparseable text, `NotAnObject` when the root is not an
    /// object, `NotAnArray` when `nodes` or `connectors` is missing or not an
    /// array, `Malformed` when a record has the wrong shape.
    pub fn parse_import(text: &str) -> Result<Self, ValidationError> {
        let value: serde_json::Value = serde_json::from_str(text).map_err(ValidationError::NotJson)?;
        Self::from_import_value(value)
    }

    /// Validate an already-parsed import document.
    pub fn from_import_value(value: serde_json::Value) -> Result<Self, ValidationError> {
        let object = value.as_object().ok_or(ValidationError::NotAnObject)?;
        for field in ["nodes", "connectors"] {
            if !object.get(field).is_some_and(serde_json::Value::is_array) {
                return Err(ValidationError::NotAnArray(field));
            }
        }
        serde_json::from_value(value).map_err(ValidationError::Malformed)
    }

    /// Parse a stored snapshot. Missing arrays read as empty.
    pub fn parse_stored(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Build a fresh graph from this snapshot.
    pub fn restore(&self, default_size: Size, now_ms: u64) -> (Graph, LoadReport) {
        let nodes: Vec<Node> = self
            .nodes
            .iter()
            .cloned()
            .map(|record| Node::from_record(record, default_size, now_ms))
            .collect();
        let mut graph = Graph::new();
        let dropped = graph.replace(nodes, &self.connectors);
        let report = LoadReport {
            nodes: graph.node_count(),
            connectors: graph.connectors().len(),
            dropped_connectors: dropped,
        };
        if dropped > 0 {
            log::debug!("snapshot restore dropped {dropped} dangling connector(s)");
        }
        (graph, report)
    }

    /// The stored view transform, repaired if out of range.
    pub fn view(&self) -> ViewTransform {
        self.view_transform.map(ViewTransform::sanitized).unwrap_or_default()
    }
}
