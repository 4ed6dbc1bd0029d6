//! Editing session: the graph, the gesture state machine and the render
//! caches, wired to persistence, notifications and a clock.
//!
//! The session is the only place the graph is mutated. It applies the
//! `Effect`s produced by `InteractionState`, keeps the connector line cache
//! in step, persists after every committed mutation and reports outcomes
//! through the `Notifier`. Every failure leaves the graph as it was.

use crate::clock::Clock;
use crate::config::EditorConfig;
use crate::input::{InputEvent, PointerButton, PointerTarget};
use crate::interaction::{Effect, InteractionState};
use crate::notify::{Notifier, NotifyLevel};
use crate::storage::{Persistence, SnapshotStore};
use mc_core::{
    ConnectError, Connector, Graph, GraphSnapshot, LoadReport, NodeContent, NodeId, Point,
    ValidationError, ViewTransform, Viewport,
};
use mc_render::{
    ConnectorLayer, DisplayList, FrameScheduler, Highlight, Recompute, hit_test, paint_scene,
};

pub struct Session {
    config: EditorConfig,
    graph: Graph,
    interaction: InteractionState,
    connectors: ConnectorLayer,
    frames: FrameScheduler,
    persistence: Persistence,
    notifier: Box<dyn Notifier>,
    clock: Box<dyn Clock>,
}

impl Session {
    pub fn new(
        config: EditorConfig,
        store: Box<dyn SnapshotStore>,
        notifier: Box<dyn Notifier>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let config = config.validated();
        let persistence = Persistence::new(store, config.storage_key.clone());
        Self {
            interaction: InteractionState::new(&config),
            config,
            graph: Graph::new(),
            connectors: ConnectorLayer::new(),
            frames: FrameScheduler::new(),
            persistence,
            notifier,
            clock,
        }
    }

    // ─── Read access ─────────────────────────────────────────────────────

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn transform(&self) -> ViewTransform {
        self.interaction.transform()
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.interaction.selected()
    }

    pub fn connector_layer(&self) -> &ConnectorLayer {
        &self.connectors
    }

    /// Whether a paint tick has work queued.
    pub fn frame_pending(&self) -> bool {
        self.frames.is_pending()
    }

    /// Snapshot of the whole map, as saved and exported.
    pub fn to_serializable_snapshot(&self) -> GraphSnapshot {
        GraphSnapshot::capture(
            &self.graph,
            self.interaction.transform(),
            self.interaction.snap_to_grid(),
        )
    }

    /// Everything the host needs to draw the current frame.
    pub fn display_list(&self) -> DisplayList {
        let highlight = Highlight {
            selected: self.interaction.selected(),
            connect_source: self.interaction.connection_start(),
        };
        paint_scene(&self.graph, &self.connectors, &self.interaction.transform(), highlight)
    }

    /// Topmost node under a screen point.
    pub fn node_at(&self, screen: Point) -> Option<NodeId> {
        hit_test(&self.graph, self.interaction.screen_to_world(screen))
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Feed one input event through the state machine and apply the result.
    pub fn handle(&mut self, event: &InputEvent) -> Vec<Effect> {
        let now = self.clock.now_ms();
        let effects = self.interaction.handle(event, &self.graph, now);
        self.apply(&effects);
        effects
    }

    pub fn pointer_down(&mut self, screen: Point, button: PointerButton, target: PointerTarget) -> Vec<Effect> {
        self.handle(&InputEvent::PointerDown {
            screen,
            button,
            target,
        })
    }

    pub fn pointer_move(&mut self, screen: Point) -> Vec<Effect> {
        self.handle(&InputEvent::PointerMove { screen })
    }

    pub fn pointer_up(&mut self, screen: Point) -> Vec<Effect> {
        self.handle(&InputEvent::PointerUp { screen })
    }

    pub fn click(&mut self, target: PointerTarget) -> Vec<Effect> {
        self.handle(&InputEvent::Click { target })
    }

    pub fn wheel(&mut self, delta_y: f64, middle_held: bool) -> Vec<Effect> {
        self.handle(&InputEvent::Wheel {
            delta_y,
            middle_held,
        })
    }

    fn apply(&mut self, effects: &[Effect]) {
        for effect in effects {
            match *effect {
                Effect::MoveNode { id, position } => {
                    if self.graph.move_node(id, position) {
                        self.connectors.update_for_node(&self.graph, id);
                    }
                }
                Effect::DragCommitted { id } => {
                    log::debug!("drag of {id} committed");
                    self.persist();
                }
                Effect::CreateConnector { from, to } => match self.connect(from, to) {
                    Ok(connector) => log::debug!("connected by click: {}", connector.id),
                    // Already reported through the notifier.
                    Err(_) => {}
                },
                Effect::ConnectStarted { from } => {
                    let title = self.title_of(from);
                    self.notify(
                        &format!("Click another idea to connect it with \"{title}\", or click empty space to cancel."),
                        NotifyLevel::Info,
                    );
                }
                Effect::ViewChanged { rescaled: true } => {
                    self.frames.request();
                }
                Effect::ViewChanged { rescaled: false }
                | Effect::SelectionChanged(_)
                | Effect::ConnectEnded => {}
            }
        }
    }

    // ─── Nodes ───────────────────────────────────────────────────────────

    /// Add a node under the viewport center.
    pub fn add_node(&mut self) -> NodeId {
        let at = self.interaction.viewport_center_world();
        self.add_node_at(at)
    }

    /// Add a node with its top-left corner at a world position.
    pub fn add_node_at(&mut self, world: Point) -> NodeId {
        let now = self.clock.now_ms();
        let id = self
            .graph
            .add_node(world, self.config.node_size(), NodeContent::default(), now);
        let title = self.title_of(id);
        self.notify(&format!("Idea \"{title}\" added."), NotifyLevel::Info);
        self.persist();
        id
    }

    /// Delete a node and its connectors. Returns false for unknown ids.
    pub fn delete_node(&mut self, id: NodeId) -> bool {
        let Some((node, removed)) = self.graph.delete_node(id) else {
            return false;
        };
        self.connectors.remove_all(removed);
        let effects = self.interaction.node_removed(id);
        self.apply(&effects);
        self.notify(&format!("Idea \"{}\" deleted.", node.title), NotifyLevel::Info);
        self.persist();
        true
    }

    pub fn delete_selected(&mut self) -> bool {
        match self.interaction.selected() {
            Some(id) => self.delete_node(id),
            None => false,
        }
    }

    /// Select a node, or complete a pending connection. `None` deselects.
    pub fn select(&mut self, id: Option<NodeId>) -> Vec<Effect> {
        let effects = match id {
            Some(id) if self.graph.contains(id) => self.interaction.select(id),
            Some(_) => vec![],
            None => self.interaction.deselect(),
        };
        self.apply(&effects);
        effects
    }

    /// Write new title and description. Returns whether anything changed.
    pub fn update_content(&mut self, id: NodeId, title: &str, description: &str) -> bool {
        let now = self.clock.now_ms();
        let changed = self
            .graph
            .node_mut(id)
            .is_some_and(|node| node.update_content(title, description, now));
        if changed {
            self.persist();
        }
        changed
    }

    pub fn set_color(&mut self, id: NodeId, color: &str) -> bool {
        let now = self.clock.now_ms();
        let changed = self
            .graph
            .node_mut(id)
            .is_some_and(|node| node.set_color(color, now));
        if changed {
            self.persist();
        }
        changed
    }

    /// Set or clear (`None` / `""`) a node's icon.
    pub fn set_icon(&mut self, id: NodeId, icon: Option<&str>) -> bool {
        let now = self.clock.now_ms();
        let changed = self
            .graph
            .node_mut(id)
            .is_some_and(|node| node.set_icon(icon, now));
        if changed {
            self.persist();
        }
        changed
    }

    // ─── Connectors ──────────────────────────────────────────────────────

    /// Toggle connecting mode from the selected node.
    pub fn toggle_connect(&mut self) -> Vec<Effect> {
        if self.interaction.is_connecting() {
            return self.cancel_connect();
        }
        match self.interaction.selected() {
            Some(id) => self.start_connect_from(id),
            None => {
                self.notify("Select a node to connect from first.", NotifyLevel::Warning);
                vec![]
            }
        }
    }

    /// Enter connecting mode from any node.
    pub fn start_connect_from(&mut self, id: NodeId) -> Vec<Effect> {
        if !self.graph.contains(id) {
            return vec![];
        }
        let effects = self.interaction.start_connect(id);
        self.apply(&effects);
        effects
    }

    pub fn cancel_connect(&mut self) -> Vec<Effect> {
        let effects = self.interaction.cancel_connect();
        self.apply(&effects);
        effects
    }

    /// Create a connector directly, notifying the outcome.
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> Result<Connector, ConnectError> {
        match self.graph.connect(from, to) {
            Ok(connector) => {
                self.connectors.insert(&self.graph, connector.id);
                let (a, b) = (self.title_of(from), self.title_of(to));
                self.notify(&format!("Connected \"{a}\" and \"{b}\"."), NotifyLevel::Success);
                self.persist();
                Ok(connector)
            }
            Err(e) => {
                log::debug!("connector rejected: {e}");
                match &e {
                    ConnectError::Duplicate { .. } => {
                        self.notify("These two ideas are already connected.", NotifyLevel::Warning)
                    }
                    ConnectError::SelfLoop(_) => {
                        self.notify("An idea cannot be connected to itself.", NotifyLevel::Warning)
                    }
                    ConnectError::UnknownNode(_) => {}
                }
                Err(e)
            }
        }
    }

    // ─── View ────────────────────────────────────────────────────────────

    pub fn zoom_in(&mut self) -> Vec<Effect> {
        let effects = self.interaction.zoom_step_by(true);
        self.apply(&effects);
        effects
    }

    pub fn zoom_out(&mut self) -> Vec<Effect> {
        let effects = self.interaction.zoom_step_by(false);
        self.apply(&effects);
        effects
    }

    pub fn reset_view(&mut self) -> Vec<Effect> {
        let effects = self.interaction.reset_view();
        self.apply(&effects);
        effects
    }

    /// The canvas container changed size.
    pub fn resize(&mut self, viewport: Viewport) {
        self.interaction.resize(viewport);
        self.frames.request();
    }

    pub fn set_container_origin(&mut self, origin: Point) {
        self.interaction.set_container_origin(origin);
    }

    /// Applies to later drags only; placed nodes stay where they are.
    pub fn set_snap_to_grid(&mut self, enabled: bool) {
        if self.interaction.snap_to_grid() == enabled {
            return;
        }
        self.interaction.set_snap_to_grid(enabled);
        self.persist();
    }

    /// Paint tick. Returns true when connector lines were recomputed.
    pub fn on_frame(&mut self) -> bool {
        match self.frames.take() {
            Recompute::Connectors => {
                self.connectors.redraw_all(&self.graph);
                true
            }
            Recompute::Nothing => false,
        }
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    pub fn save(&mut self) -> bool {
        let snapshot = self.to_serializable_snapshot();
        self.persistence.save(&snapshot)
    }

    /// Restore the stored map, if any.
    pub fn load(&mut self) -> Option<LoadReport> {
        let snapshot = self.persistence.load()?;
        let report = self.install(&snapshot);
        log::info!(
            "map loaded: {} node(s), {} connector(s)",
            report.nodes,
            report.connectors
        );
        self.notify("Previous map loaded.", NotifyLevel::Info);
        Some(report)
    }

    /// Empty the canvas and the store.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.connectors.clear();
        self.interaction.reset();
        self.persistence.clear();
        log::info!("map cleared");
    }

    /// Pretty-printed snapshot for a download.
    pub fn export_json(&mut self) -> Result<String, serde_json::Error> {
        let json = self.to_serializable_snapshot().to_json_pretty()?;
        self.notify("Map exported to JSON.", NotifyLevel::Success);
        Ok(json)
    }

    /// Replace the whole map with an imported document.
    ///
    /// # Errors
    /// A `ValidationError` when the document is rejected; the current map is
    /// left untouched and the user is notified.
    pub fn import_json(&mut self, text: &str) -> Result<LoadReport, ValidationError> {
        let snapshot = match GraphSnapshot::parse_import(text) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("import rejected: {e}");
                self.notify(&format!("Import failed: {e}"), NotifyLevel::Error);
                return Err(e);
            }
        };
        let report = self.install(&snapshot);
        log::info!(
            "map imported: {} node(s), {} connector(s), {} dropped",
            report.nodes,
            report.connectors,
            report.dropped_connectors
        );
        self.notify("Map imported from JSON.", NotifyLevel::Success);
        self.persist();
        Ok(report)
    }

    fn install(&mut self, snapshot: &GraphSnapshot) -> LoadReport {
        let (graph, report) = snapshot.restore(self.config.node_size(), self.clock.now_ms());
        self.graph = graph;
        self.interaction.reset();
        self.interaction.set_transform(snapshot.view());
        self.interaction.set_snap_to_grid(snapshot.snap_to_grid_enabled);
        self.connectors.redraw_all(&self.graph);
        self.frames.request();
        report
    }

    fn persist(&mut self) {
        self.save();
    }

    // ─── Helpers ─────────────────────────────────────────────────────────

    fn notify(&self, message: &str, level: NotifyLevel) {
        self.notifier.notify(message, level);
    }

    fn title_of(&self, id: NodeId) -> String {
        self.graph
            .node(id)
            .map(|node| node.title.clone())
            .unwrap_or_default()
    }
}
