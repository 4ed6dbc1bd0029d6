//! Error types for the graph model and snapshot import.

use crate::id::NodeId;
use thiserror::Error;

/// A rejected import document. Nothing is mutated when this is returned.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("document is not valid JSON: {0}")]
    NotJson(#[source] serde_json::Error),

    #[error("document must be a JSON object")]
    NotAnObject,

    #[error("`{0}` must be an array")]
    NotAnArray(&'static str),

    #[error("malformed map data: {0}")]
    Malformed(#[source] serde_json::Error),
}

/// Why a connector could not be created.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("cannot connect {0} to itself")]
    SelfLoop(NodeId),

    #[error("{from} and {to} are already connected")]
    Duplicate { from: NodeId, to: NodeId },

    #[error("no node with id {0}")]
    UnknownNode(NodeId),
}
