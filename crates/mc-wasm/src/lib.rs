//! WASM bridge for Mindcraft: exposes the editing session to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. The host page owns the DOM:
//! it forwards pointer, click and wheel events with a target descriptor,
//! draws whatever `render_json()` returns, and calls `on_frame()` from
//! `requestAnimationFrame` whenever `needs_frame()` is true.

mod host;
mod scene;

pub use host::{JsClock, JsNotifier, LocalStorageStore};

use mc_core::{NodeId, Point, Viewport};
use mc_editor::{Clock, EditorConfig, PointerButton, PointerTarget, Session, SnapshotStore};
use wasm_bindgen::prelude::*;

/// Middle-button bit of `MouseEvent.buttons`.
const MIDDLE_BUTTON_MASK: u16 = 4;

/// The WASM-facing canvas controller.
#[wasm_bindgen]
pub struct MindmapCanvas {
    session: Session,
}

#[wasm_bindgen]
impl MindmapCanvas {
    /// Create a controller for a canvas of the given size.
    ///
    /// `config` is an optional JSON object of editor settings; `notify` an
    /// optional `(message, level)` callback.
    #[wasm_bindgen(constructor)]
    pub fn new(
        width: f64,
        height: f64,
        config: Option<String>,
        notify: Option<js_sys::Function>,
    ) -> Self {
        console_error_panic_hook_setup();

        let config = EditorConfig::from_json_or_default(config.as_deref());
        let mut session = Session::new(
            config,
            host_store(),
            Box::new(JsNotifier::new(notify)),
            host_clock(),
        );
        session.resize(Viewport::new(width, height));
        Self { session }
    }

    /// Restore the map saved by a previous visit. Returns true if one existed.
    pub fn load(&mut self) -> bool {
        self.session.load().is_some()
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.session.resize(Viewport::new(width, height));
    }

    /// Screen position of the canvas container (`getBoundingClientRect`).
    pub fn set_container_origin(&mut self, left: f64, top: f64) {
        self.session.set_container_origin(Point::new(left, top));
    }

    // ─── Pointer input ───────────────────────────────────────────────────

    /// `target` is `"canvas"`, `"node"` or `"node-text"`; node targets carry
    /// the node id. Returns true if anything visible changed.
    pub fn handle_pointer_down(
        &mut self,
        x: f64,
        y: f64,
        button: i16,
        target: &str,
        node_id: Option<String>,
    ) -> bool {
        let Some(target) = parse_target(target, node_id.as_deref()) else {
            return false;
        };
        let before = self.session.interaction().gesture();
        let effects = self
            .session
            .pointer_down(Point::new(x, y), PointerButton::from_dom(button), target);
        !effects.is_empty() || self.session.interaction().gesture() != before
    }

    pub fn handle_pointer_move(&mut self, x: f64, y: f64) -> bool {
        !self.session.pointer_move(Point::new(x, y)).is_empty()
    }

    pub fn handle_pointer_up(&mut self, x: f64, y: f64) -> bool {
        let before = self.session.interaction().gesture();
        let effects = self.session.pointer_up(Point::new(x, y));
        !effects.is_empty() || self.session.interaction().gesture() != before
    }

    pub fn handle_click(&mut self, target: &str, node_id: Option<String>) -> bool {
        let Some(target) = parse_target(target, node_id.as_deref()) else {
            return false;
        };
        !self.session.click(target).is_empty()
    }

    /// `buttons` is `WheelEvent.buttons`.
    pub fn handle_wheel(&mut self, delta_y: f64, buttons: u16) -> bool {
        !self
            .session
            .wheel(delta_y, buttons & MIDDLE_BUTTON_MASK != 0)
            .is_empty()
    }

    // ─── Nodes ───────────────────────────────────────────────────────────

    /// Add a node at the viewport center. Returns its id.
    pub fn add_node(&mut self) -> String {
        self.session.add_node().as_str().to_string()
    }

    pub fn delete_node(&mut self, node_id: &str) -> bool {
        self.session.delete_node(NodeId::intern(node_id))
    }

    pub fn delete_selected(&mut self) -> bool {
        self.session.delete_selected()
    }

    /// Select a node by id; an empty or missing id deselects.
    pub fn select_node(&mut self, node_id: Option<String>) -> bool {
        let id = node_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(NodeId::intern);
        !self.session.select(id).is_empty()
    }

    /// Id of the topmost node under a screen point, or `""`.
    pub fn node_at(&self, x: f64, y: f64) -> String {
        self.session
            .node_at(Point::new(x, y))
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }

    /// Selected node id, or `""`.
    pub fn get_selected_id(&self) -> String {
        self.session
            .selected()
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }

    pub fn update_content(&mut self, node_id: &str, title: &str, description: &str) -> bool {
        self.session
            .update_content(NodeId::intern(node_id), title, description)
    }

    pub fn set_color(&mut self, node_id: &str, color: &str) -> bool {
        self.session.set_color(NodeId::intern(node_id), color)
    }

    pub fn set_icon(&mut self, node_id: &str, icon: Option<String>) -> bool {
        self.session
            .set_icon(NodeId::intern(node_id), icon.as_deref())
    }

    /// Node history as a JSON array, oldest first. `[]` for unknown ids.
    pub fn get_history_json(&self, node_id: &str) -> String {
        self.session
            .graph()
            .node(NodeId::intern(node_id))
            .and_then(|node| serde_json::to_string(node.history()).ok())
            .unwrap_or_else(|| "[]".to_string())
    }

    // ─── Connecting ──────────────────────────────────────────────────────

    pub fn toggle_connect(&mut self) -> bool {
        !self.session.toggle_connect().is_empty()
    }

    pub fn start_connect_from(&mut self, node_id: &str) -> bool {
        !self
            .session
            .start_connect_from(NodeId::intern(node_id))
            .is_empty()
    }

    pub fn cancel_connect(&mut self) -> bool {
        !self.session.cancel_connect().is_empty()
    }

    pub fn is_connecting(&self) -> bool {
        self.session.interaction().is_connecting()
    }

    // ─── View ────────────────────────────────────────────────────────────

    pub fn zoom_in(&mut self) -> bool {
        !self.session.zoom_in().is_empty()
    }

    pub fn zoom_out(&mut self) -> bool {
        !self.session.zoom_out().is_empty()
    }

    pub fn reset_view(&mut self) -> bool {
        !self.session.reset_view().is_empty()
    }

    pub fn set_snap_to_grid(&mut self, enabled: bool) {
        self.session.set_snap_to_grid(enabled);
    }

    pub fn get_snap_to_grid(&self) -> bool {
        self.session.interaction().snap_to_grid()
    }

    /// Whether the host should schedule an animation frame.
    pub fn needs_frame(&self) -> bool {
        self.session.frame_pending()
    }

    /// Run from `requestAnimationFrame`. Returns true if connector lines
    /// were recomputed.
    pub fn on_frame(&mut self) -> bool {
        self.session.on_frame()
    }

    /// Everything needed to draw the current frame, as JSON.
    pub fn render_json(&self) -> String {
        scene::display_list_json(&self.session.display_list()).to_string()
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    pub fn save(&mut self) -> bool {
        self.session.save()
    }

    pub fn clear(&mut self) {
        self.session.clear();
    }

    /// Pretty JSON for `mindcraft_map.json`; `""` if serialization failed.
    pub fn export_json(&mut self) -> String {
        match self.session.export_json() {
            Ok(json) => json,
            Err(e) => {
                log::error!("export failed: {e}");
                String::new()
            }
        }
    }

    /// Import a map document (e.g. from a `FileReader` load). Returns true
    /// on success; failures are reported through the notify callback.
    pub fn import_json(&mut self, text: &str) -> bool {
        self.session.import_json(text).is_ok()
    }
}

fn parse_target(kind: &str, node_id: Option<&str>) -> Option<PointerTarget> {
    let target = PointerTarget::from_parts(kind, node_id);
    if target.is_none() {
        log::warn!("unrecognized pointer target {kind:?} ({node_id:?})");
    }
    target
}

// ─── Host collaborators ──────────────────────────────────────────────────

fn host_store() -> Box<dyn SnapshotStore> {
    #[cfg(target_arch = "wasm32")]
    {
        Box::new(LocalStorageStore)
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        Box::new(mc_editor::MemoryStore::new())
    }
}

fn host_clock() -> Box<dyn Clock> {
    #[cfg(target_arch = "wasm32")]
    {
        Box::new(JsClock)
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        Box::new(mc_editor::SystemClock)
    }
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Mindcraft WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
