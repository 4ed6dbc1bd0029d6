//! Platform-neutral input events.
//!
//! The host resolves which element was under the pointer and reports it as
//! a `PointerTarget`; positions are raw screen coordinates.

use mc_core::{NodeId, Point};

/// Which pointer button changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerButton {
    #[default]
    Primary,
    Middle,
    Secondary,
}

impl PointerButton {
    /// Map a DOM `MouseEvent.button` value.
    pub fn from_dom(button: i16) -> Self {
        match button {
            0 => PointerButton::Primary,
            1 => PointerButton::Middle,
            _ => PointerButton::Secondary,
        }
    }
}

/// What the pointer was over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// Empty canvas background.
    Canvas,
    /// A node's body.
    Node(NodeId),
    /// An editable text region inside a node.
    NodeText(NodeId),
}

impl PointerTarget {
    pub fn node(self) -> Option<NodeId> {
        match self {
            PointerTarget::Canvas => None,
            PointerTarget::Node(id) | PointerTarget::NodeText(id) => Some(id),
        }
    }

    /// Parse a host target descriptor: `"canvas"`, `"node"` or `"node-text"`
    /// plus the node id for the latter two.
    pub fn from_parts(kind: &str, node: Option<&str>) -> Option<Self> {
        match (kind, node) {
            ("canvas", _) => Some(PointerTarget::Canvas),
            ("node", Some(id)) => Some(PointerTarget::Node(NodeId::intern(id))),
            ("node-text", Some(id)) => Some(PointerTarget::NodeText(NodeId::intern(id))),
            _ => None,
        }
    }
}

/// Input events the interaction controller consumes.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown {
        screen: Point,
        button: PointerButton,
        target: PointerTarget,
    },
    PointerMove {
        screen: Point,
    },
    PointerUp {
        screen: Point,
    },
    /// A completed click, delivered after `PointerUp`.
    Click {
        target: PointerTarget,
    },
    /// One wheel notch. `middle_held` mirrors `buttons & 4`.
    Wheel {
        delta_y: f64,
        middle_held: bool,
    },
}

impl InputEvent {
    /// False when a coordinate the controller reads is NaN or infinite.
    /// `PointerUp` always passes so a gesture can still end.
    pub fn is_finite(&self) -> bool {
        match *self {
            InputEvent::PointerDown { screen, .. } | InputEvent::PointerMove { screen } => {
                screen.is_finite()
            }
            InputEvent::Wheel { delta_y, .. } => delta_y.is_finite(),
            InputEvent::PointerUp { .. } | InputEvent::Click { .. } => true,
        }
    }
}
