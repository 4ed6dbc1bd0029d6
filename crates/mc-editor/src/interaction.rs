//! Gesture state machine for the canvas.
//!
//! `InteractionState` owns the view transform, the active gesture and the
//! selection. It reads the graph but never mutates it: handlers return
//! `Effect`s that the `Session` applies, the same way tools emit mutations
//! for the engine to apply.
//!
//! ```text
//!            pointer-down canvas            pointer-up
//!   Idle ─────────────────────────▶ Panning ──────────▶ Idle
//!    │  pointer-down node                              ▲
//!    ├────────────────────────────▶ DraggingNode ──────┤ pointer-up (commit)
//!    │  start connect                                  │
//!    └────────────────────────────▶ Connecting ────────┘ click node / canvas / cancel
//! ```
//!
//! Entering a gesture while another one is active is a no-op.

use crate::config::EditorConfig;
use crate::input::{InputEvent, PointerButton, PointerTarget};
use mc_core::transform::{screen_to_viewport, snap_point};
use mc_core::{Graph, NodeId, Point, Vec2, ViewTransform, Viewport};

/// The one active gesture.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    /// `pan_start` is the pointer (viewport space) minus the offset at grab time.
    Panning { pan_start: Vec2 },
    /// `offset` is the grab point inside the node, in world units.
    DraggingNode { node: NodeId, offset: Vec2 },
    Connecting { start: NodeId },
}

/// A change the owner of the graph has to carry out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    MoveNode { id: NodeId, position: Point },
    /// A drag finished; the new position should be persisted.
    DragCommitted { id: NodeId },
    SelectionChanged(Option<NodeId>),
    CreateConnector { from: NodeId, to: NodeId },
    ConnectStarted { from: NodeId },
    /// Connecting mode ended, with or without a connector.
    ConnectEnded,
    /// The view transform changed. `rescaled` is set for zooms.
    ViewChanged { rescaled: bool },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragEnd {
    node: NodeId,
    at_ms: u64,
}

#[derive(Debug, Clone)]
pub struct InteractionState {
    transform: ViewTransform,
    gesture: Gesture,
    selected: Option<NodeId>,
    snap_to_grid: bool,
    last_drag_end: Option<DragEnd>,
    viewport: Viewport,
    /// Screen position of the canvas container's top-left corner.
    container_origin: Point,
    grid_size: f64,
    zoom_step: f64,
    scale_min: f64,
    scale_max: f64,
    drag_grace_ms: u64,
}

impl InteractionState {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            transform: ViewTransform::IDENTITY,
            gesture: Gesture::Idle,
            selected: None,
            snap_to_grid: config.snap_to_grid,
            last_drag_end: None,
            viewport: Viewport::default(),
            container_origin: Point::ZERO,
            grid_size: config.grid_size,
            zoom_step: config.zoom_step,
            scale_min: config.scale_min,
            scale_max: config.scale_max,
            drag_grace_ms: config.drag_grace_ms,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn set_transform(&mut self, transform: ViewTransform) {
        self.transform = transform.sanitized();
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn is_connecting(&self) -> bool {
        matches!(self.gesture, Gesture::Connecting { .. })
    }

    pub fn connection_start(&self) -> Option<NodeId> {
        match self.gesture {
            Gesture::Connecting { start } => Some(start),
            _ => None,
        }
    }

    pub fn snap_to_grid(&self) -> bool {
        self.snap_to_grid
    }

    pub fn set_snap_to_grid(&mut self, enabled: bool) {
        self.snap_to_grid = enabled;
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, viewport: Viewport) {
        if !(viewport.width.is_finite() && viewport.height.is_finite()) {
            log::warn!("ignoring non-finite viewport {}x{}", viewport.width, viewport.height);
            return;
        }
        self.viewport = viewport;
    }

    pub fn set_container_origin(&mut self, origin: Point) {
        if !origin.is_finite() {
            log::warn!("ignoring non-finite container origin ({}, {})", origin.x, origin.y);
            return;
        }
        self.container_origin = origin;
    }

    /// Screen → viewport.
    pub fn to_viewport(&self, screen: Point) -> Point {
        screen_to_viewport(screen, self.container_origin)
    }

    /// Screen → world.
    pub fn screen_to_world(&self, screen: Point) -> Point {
        self.transform.to_world(self.to_viewport(screen))
    }

    /// World point under the middle of the viewport.
    pub fn viewport_center_world(&self) -> Point {
        self.transform.to_world(self.viewport.center())
    }

    /// Drop all gesture and selection state (after clear, load or import).
    pub fn reset(&mut self) {
        self.gesture = Gesture::Idle;
        self.selected = None;
        self.last_drag_end = None;
    }

    // ─── Event dispatch ──────────────────────────────────────────────────

    pub fn handle(&mut self, event: &InputEvent, graph: &Graph, now_ms: u64) -> Vec<Effect> {
        if !event.is_finite() {
            log::debug!("ignoring non-finite input {event:?}");
            return vec![];
        }
        match *event {
            InputEvent::PointerDown {
                screen,
                button,
                target,
            } => {
                let at = self.to_viewport(screen);
                match target {
                    PointerTarget::Canvas => self.begin_pan(at, button),
                    PointerTarget::Node(id) if button == PointerButton::Primary => {
                        self.begin_drag(id, at, graph)
                    }
                    // Text regions pass through for editing.
                    PointerTarget::Node(_) | PointerTarget::NodeText(_) => vec![],
                }
            }
            InputEvent::PointerMove { screen } => self.pointer_move(self.to_viewport(screen)),
            InputEvent::PointerUp { .. } => self.pointer_up(now_ms),
            InputEvent::Click { target } => match target.node() {
                Some(id) => self.click_node(id, now_ms),
                None => self.click_canvas(),
            },
            InputEvent::Wheel {
                delta_y,
                middle_held,
            } => {
                if matches!(self.gesture, Gesture::Panning { .. }) || middle_held {
                    return vec![];
                }
                self.zoom_step_by(delta_y < 0.0)
            }
        }
    }

    fn begin_pan(&mut self, at: Point, button: PointerButton) -> Vec<Effect> {
        if self.gesture != Gesture::Idle || button == PointerButton::Secondary {
            return vec![];
        }
        self.gesture = Gesture::Panning {
            pan_start: at.to_vec2() - self.transform.offset(),
        };
        vec![]
    }

    fn begin_drag(&mut self, id: NodeId, at: Point, graph: &Graph) -> Vec<Effect> {
        if self.gesture != Gesture::Idle {
            return vec![];
        }
        let Some(node) = graph.node(id) else {
            log::debug!("pointer-down on unknown node {id}");
            return vec![];
        };
        let top_left = self.transform.to_viewport(node.position());
        let offset = (at - top_left) / self.transform.scale;
        self.gesture = Gesture::DraggingNode { node: id, offset };
        log::trace!("drag {id} offset ({}, {})", offset.x, offset.y);
        self.set_selected(Some(id))
    }

    fn pointer_move(&mut self, at: Point) -> Vec<Effect> {
        match self.gesture {
            Gesture::Panning { pan_start } => {
                self.transform.set_offset(at.to_vec2() - pan_start);
                vec![Effect::ViewChanged { rescaled: false }]
            }
            Gesture::DraggingNode { node, offset } => {
                let mut position = self.transform.to_world(at) - offset;
                if self.snap_to_grid {
                    position = snap_point(position, self.grid_size);
                }
                vec![Effect::MoveNode { id: node, position }]
            }
            Gesture::Idle | Gesture::Connecting { .. } => vec![],
        }
    }

    fn pointer_up(&mut self, now_ms: u64) -> Vec<Effect> {
        match self.gesture {
            Gesture::Panning { .. } => {
                self.gesture = Gesture::Idle;
                vec![]
            }
            Gesture::DraggingNode { node, .. } => {
                self.gesture = Gesture::Idle;
                self.last_drag_end = Some(DragEnd { node, at_ms: now_ms });
                vec![Effect::DragCommitted { id: node }]
            }
            Gesture::Idle | Gesture::Connecting { .. } => vec![],
        }
    }

    fn click_node(&mut self, id: NodeId, now_ms: u64) -> Vec<Effect> {
        if let Some(end) = self.last_drag_end.take()
            && end.node == id
            && now_ms.saturating_sub(end.at_ms) < self.drag_grace_ms
        {
            log::trace!("click on {id} swallowed after drag");
            return vec![];
        }
        if matches!(self.gesture, Gesture::DraggingNode { .. }) {
            return vec![];
        }
        self.select(id)
    }

    fn click_canvas(&mut self) -> Vec<Effect> {
        let mut effects = self.set_selected(None);
        effects.extend(self.cancel_connect());
        effects
    }

    // ─── Selection and connecting ────────────────────────────────────────

    /// Select `id`, or complete a connection when one is in progress.
    pub fn select(&mut self, id: NodeId) -> Vec<Effect> {
        match self.gesture {
            Gesture::Connecting { start } if start != id => {
                self.gesture = Gesture::Idle;
                vec![
                    Effect::CreateConnector { from: start, to: id },
                    Effect::ConnectEnded,
                ]
            }
            Gesture::Connecting { .. } => vec![],
            _ => self.set_selected(Some(id)),
        }
    }

    pub fn deselect(&mut self) -> Vec<Effect> {
        self.set_selected(None)
    }

    fn set_selected(&mut self, id: Option<NodeId>) -> Vec<Effect> {
        if self.selected == id {
            return vec![];
        }
        self.selected = id;
        vec![Effect::SelectionChanged(id)]
    }

    /// Enter connecting mode from `from`. Clears the selection.
    pub fn start_connect(&mut self, from: NodeId) -> Vec<Effect> {
        if self.gesture != Gesture::Idle {
            return vec![];
        }
        self.gesture = Gesture::Connecting { start: from };
        let mut effects = self.set_selected(None);
        effects.push(Effect::ConnectStarted { from });
        effects
    }

    pub fn cancel_connect(&mut self) -> Vec<Effect> {
        if !self.is_connecting() {
            return vec![];
        }
        self.gesture = Gesture::Idle;
        vec![Effect::ConnectEnded]
    }

    /// Forget every reference to a deleted node.
    pub fn node_removed(&mut self, id: NodeId) -> Vec<Effect> {
        let mut effects = vec![];
        if self.selected == Some(id) {
            effects.extend(self.set_selected(None));
        }
        match self.gesture {
            Gesture::Connecting { start } if start == id => effects.extend(self.cancel_connect()),
            Gesture::DraggingNode { node, .. } if node == id => self.gesture = Gesture::Idle,
            _ => {}
        }
        if self.last_drag_end.is_some_and(|end| end.node == id) {
            self.last_drag_end = None;
        }
        effects
    }

    // ─── View ────────────────────────────────────────────────────────────

    /// One zoom step anchored at the viewport center.
    pub fn zoom_step_by(&mut self, zoom_in: bool) -> Vec<Effect> {
        let factor = if zoom_in {
            1.0 + self.zoom_step
        } else {
            1.0 - self.zoom_step
        };
        let zoomed = self.transform.zoom_around(
            self.viewport.center(),
            factor,
            self.scale_min,
            self.scale_max,
        );
        if zoomed.scale == self.transform.scale {
            return vec![];
        }
        self.transform = zoomed;
        vec![Effect::ViewChanged { rescaled: true }]
    }

    pub fn reset_view(&mut self) -> Vec<Effect> {
        if self.transform == ViewTransform::IDENTITY {
            return vec![];
        }
        self.transform = ViewTransform::IDENTITY;
        vec![Effect::ViewChanged { rescaled: true }]
    }
}
