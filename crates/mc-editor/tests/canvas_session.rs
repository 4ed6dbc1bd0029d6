//! Integration tests: editing session (mc-editor ↔ mc-core ↔ mc-render).
//!
//! Drives a `Session` through pointer events the way a host would and
//! checks the graph, view transform, connector cache, storage and
//! notifications that come out the other side.

use mc_core::{NodeId, Point, ValidationError, ViewTransform, Viewport};
use mc_editor::*;
use pretty_assertions::assert_eq;

const KEY: &str = "mindcraft_map_data";
const EPS: f64 = 1e-9;

struct Host {
    session: Session,
    store: MemoryStore,
    notes: RecordingNotifier,
    clock: ManualClock,
}

fn host() -> Host {
    let _ = env_logger::builder().is_test(true).try_init();
    host_with(MemoryStore::new())
}

fn host_with(store: MemoryStore) -> Host {
    host_configured(store, EditorConfig::default())
}

fn host_configured(store: MemoryStore, config: EditorConfig) -> Host {
    let notes = RecordingNotifier::new();
    let clock = ManualClock::new(1_700_000_000_000);
    let mut session = Session::new(
        config,
        Box::new(store.clone()),
        Box::new(notes.clone()),
        Box::new(clock.clone()),
    );
    session.resize(Viewport::new(800.0, 600.0));
    Host {
        session,
        store,
        notes,
        clock,
    }
}

fn close(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS
}

// ─── Pan / zoom ─────────────────────────────────────────────────────────

#[test]
fn pan_then_convert_back_to_world() {
    let mut h = host();
    let id = h.session.add_node_at(Point::new(100.0, 100.0));

    h.session.pointer_down(Point::new(0.0, 0.0), PointerButton::Primary, PointerTarget::Canvas);
    h.session.pointer_move(Point::new(50.0, -20.0));
    h.session.pointer_up(Point::new(50.0, -20.0));

    let view = h.session.transform();
    assert_eq!(view, ViewTransform::new(50.0, -20.0, 1.0));

    // The node now shows up shifted by the pan, and maps back to where it was.
    let node_screen = view.to_viewport(h.session.graph().node(id).unwrap().position());
    assert!(close(node_screen, Point::new(150.0, 80.0)));
    assert!(close(
        h.session.interaction().screen_to_world(node_screen),
        Point::new(100.0, 100.0)
    ));
    // The pan start point carried the world origin along with it.
    assert!(close(
        h.session.interaction().screen_to_world(Point::new(50.0, -20.0)),
        Point::ZERO
    ));
}

#[test]
fn middle_button_pan_blocks_wheel_zoom() {
    let mut h = host();
    h.session.pointer_down(Point::new(10.0, 10.0), PointerButton::Middle, PointerTarget::Canvas);
    assert!(h.session.wheel(-120.0, true).is_empty());
    h.session.pointer_up(Point::new(10.0, 10.0));
    assert_eq!(h.session.transform().scale, 1.0);

    assert_eq!(
        h.session.wheel(-120.0, false),
        vec![Effect::ViewChanged { rescaled: true }]
    );
    assert!((h.session.transform().scale - 1.05).abs() < EPS);
}

#[test]
fn inverted_scale_range_in_config_still_zooms() {
    let config = EditorConfig::from_json_or_default(Some(r#"{"scaleMin": 3.0, "scaleMax": 0.2}"#));
    let mut h = host_configured(MemoryStore::new(), config);
    assert_eq!(
        h.session.wheel(-100.0, false),
        vec![Effect::ViewChanged { rescaled: true }]
    );
    assert!((h.session.transform().scale - 1.05).abs() < EPS);
}

#[test]
fn unvalidated_config_is_repaired_by_the_session() {
    let config = EditorConfig {
        scale_min: 3.0,
        scale_max: 0.2,
        grid_size: 0.0,
        ..EditorConfig::default()
    };
    let mut h = host_configured(MemoryStore::new(), config);
    assert_eq!(h.session.config().grid_size, 20.0);
    h.session.zoom_out();
    assert!((h.session.transform().scale - 0.95).abs() < EPS);
}

// ─── Dragging ───────────────────────────────────────────────────────────

#[test]
fn dragging_a_moves_only_its_connector_endpoint() {
    let mut h = host();
    let a = h.session.add_node_at(Point::new(0.0, 0.0));
    let b = h.session.add_node_at(Point::new(100.0, 0.0));
    let conn = h.session.connect(a, b).unwrap();
    let before = h.session.connector_layer().line(conn.id).unwrap();

    // Grab A at its top-left corner and move it to (0, 50).
    h.session.pointer_down(Point::new(0.0, 0.0), PointerButton::Primary, PointerTarget::Node(a));
    h.session.pointer_move(Point::new(0.0, 50.0));
    h.session.pointer_up(Point::new(0.0, 50.0));

    assert_eq!(h.session.graph().node(a).unwrap().position(), Point::new(0.0, 50.0));
    let after = h.session.connector_layer().line(conn.id).unwrap();
    assert_eq!(after.p0, Point::new(90.0, 86.0));
    assert_eq!(after.p1, before.p1);
}

#[test]
fn drag_commit_persists_and_swallows_the_trailing_click() {
    let mut h = host();
    let a = h.session.add_node_at(Point::new(0.0, 0.0));
    let b = h.session.add_node_at(Point::new(400.0, 0.0));

    h.session.pointer_down(Point::new(10.0, 10.0), PointerButton::Primary, PointerTarget::Node(a));
    h.session.pointer_move(Point::new(60.0, 30.0));
    h.clock.advance(5);
    h.session.pointer_up(Point::new(60.0, 30.0));

    let stored = h.store.get(KEY).unwrap();
    assert!(stored.contains("\"x\":50.0"));
    assert_eq!(h.session.selected(), Some(a));

    // Spurious click fired by the browser right after the release.
    h.clock.advance(20);
    assert!(h.session.click(PointerTarget::Node(a)).is_empty());
    assert_eq!(h.session.selected(), Some(a));

    // A real click elsewhere still works.
    h.clock.advance(500);
    h.session.click(PointerTarget::Node(b));
    assert_eq!(h.session.selected(), Some(b));
}

#[test]
fn snap_to_grid_is_not_retroactive() {
    let mut h = host();
    let a = h.session.add_node_at(Point::new(13.0, 27.0));
    h.session.set_snap_to_grid(true);
    assert_eq!(h.session.graph().node(a).unwrap().position(), Point::new(13.0, 27.0));

    h.session.pointer_down(Point::new(13.0, 27.0), PointerButton::Primary, PointerTarget::Node(a));
    h.session.pointer_move(Point::new(45.0, 49.0));
    h.session.pointer_up(Point::new(45.0, 49.0));
    assert_eq!(h.session.graph().node(a).unwrap().position(), Point::new(40.0, 40.0));
}

#[test]
fn non_finite_input_never_reaches_storage() {
    let store = MemoryStore::new();
    let config = EditorConfig {
        grid_size: 0.0,
        snap_to_grid: true,
        ..EditorConfig::default()
    };
    let mut h = host_configured(store.clone(), config);
    let a = h.session.add_node_at(Point::new(10.0, 10.0));

    h.session.pointer_down(Point::new(15.0, 15.0), PointerButton::Primary, PointerTarget::Node(a));
    h.session.pointer_move(Point::new(f64::NAN, 40.0));
    h.session.pointer_move(Point::new(47.0, 31.0));
    h.session.pointer_up(Point::new(47.0, 31.0));
    h.session.pointer_down(Point::new(0.0, 0.0), PointerButton::Primary, PointerTarget::Canvas);
    h.session.pointer_move(Point::new(f64::INFINITY, 0.0));
    h.session.pointer_up(Point::new(0.0, 0.0));
    let b = h.session.add_node_at(Point::new(f64::NAN, 0.0));
    h.session.save();

    let mut reopened = host_with(store);
    let report = reopened.session.load().unwrap();
    assert_eq!(report.nodes, 2);
    let graph = reopened.session.graph();
    assert_eq!(graph.node(a).unwrap().position(), Point::new(40.0, 20.0));
    assert_eq!(graph.node(b).unwrap().position(), Point::ZERO);
    assert_eq!(reopened.session.transform(), ViewTransform::IDENTITY);
}

// ─── Connecting ─────────────────────────────────────────────────────────

#[test]
fn connect_mode_by_clicks() {
    let mut h = host();
    let a = h.session.add_node_at(Point::new(0.0, 0.0));
    let b = h.session.add_node_at(Point::new(300.0, 0.0));

    h.session.click(PointerTarget::Node(a));
    h.session.toggle_connect();
    assert!(h.session.interaction().is_connecting());
    assert_eq!(h.session.selected(), None);

    h.session.click(PointerTarget::Node(b));
    assert!(!h.session.interaction().is_connecting());
    assert_eq!(h.session.graph().connectors().len(), 1);
    assert_eq!(
        h.notes.last().unwrap(),
        Notification {
            message: "Connected \"New idea\" and \"New idea\".".into(),
            level: NotifyLevel::Success,
        }
    );

    // Reverse direction is a duplicate.
    h.session.start_connect_from(b);
    h.session.click(PointerTarget::Node(a));
    assert_eq!(h.session.graph().connectors().len(), 1);
    assert_eq!(h.notes.last().unwrap().level, NotifyLevel::Warning);
    assert!(!h.session.interaction().is_connecting());
}

#[test]
fn underscore_ids_keep_distinct_connectors() {
    let mut h = host();
    h.session
        .import_json(
            r#"{"nodes": [
                {"id": "a", "x": 0, "y": 0},
                {"id": "a_b", "x": 200, "y": 0},
                {"id": "b_c", "x": 0, "y": 200},
                {"id": "c", "x": 200, "y": 200}
            ], "connectors": []}"#,
        )
        .unwrap();
    let [a, a_b, b_c, c] = ["a", "a_b", "b_c", "c"].map(NodeId::intern);
    let first = h.session.connect(a_b, c).unwrap();
    let second = h.session.connect(a, b_c).unwrap();
    assert_ne!(first.id, second.id);

    assert!(h.session.delete_node(c));
    assert_eq!(h.session.graph().connectors().len(), 1);
    assert_eq!(h.session.connector_layer().len(), 1);
    assert!(h.session.connector_layer().line(second.id).is_some());
    assert_eq!(h.session.display_list().connectors.len(), 1);
}

#[test]
fn empty_canvas_click_cancels_connecting() {
    let mut h = host();
    let a = h.session.add_node_at(Point::new(0.0, 0.0));
    h.session.start_connect_from(a);
    h.session.click(PointerTarget::Canvas);
    assert!(!h.session.interaction().is_connecting());
    assert!(h.session.graph().connectors().is_empty());
}

#[test]
fn deleting_the_start_node_ends_connecting() {
    let mut h = host();
    let a = h.session.add_node_at(Point::new(0.0, 0.0));
    h.session.start_connect_from(a);
    assert!(h.session.delete_node(a));
    assert!(!h.session.interaction().is_connecting());
}

// ─── Persistence and import ─────────────────────────────────────────────

#[test]
fn reload_restores_map_and_view() {
    let store = MemoryStore::new();
    let mut h = host_with(store.clone());
    let a = h.session.add_node_at(Point::new(0.0, 0.0));
    let b = h.session.add_node_at(Point::new(300.0, 0.0));
    h.session.connect(a, b).unwrap();
    h.session.zoom_out();
    h.session.save();
    let view = h.session.transform();

    let mut reopened = host_with(store);
    let report = reopened.session.load().unwrap();
    assert_eq!(report.nodes, 2);
    assert_eq!(report.connectors, 1);
    let restored = reopened.session.transform();
    assert!((restored.scale - view.scale).abs() < EPS);
    assert!(close(Point::new(restored.x, restored.y), Point::new(view.x, view.y)));
    assert_eq!(reopened.session.connector_layer().len(), 1);
    assert_eq!(reopened.notes.last().unwrap().message, "Previous map loaded.");
}

#[test]
fn load_with_nothing_stored_is_quiet() {
    let mut h = host();
    assert!(h.session.load().is_none());
    assert!(h.notes.is_empty());
}

#[test]
fn failed_import_leaves_state_unchanged() {
    let mut h = host();
    let a = h.session.add_node_at(Point::new(0.0, 0.0));
    let before = h.session.to_serializable_snapshot();
    h.notes.clear();

    let err = h.session.import_json(r#"{"nodes": [], "connectors": "nope"}"#).unwrap_err();
    assert!(matches!(err, ValidationError::NotAnArray("connectors")));
    assert_eq!(h.session.to_serializable_snapshot(), before);
    assert!(h.session.graph().contains(a));
    let note = h.notes.last().unwrap();
    assert_eq!(note.level, NotifyLevel::Error);
    assert!(note.message.starts_with("Import failed: "));
}

#[test]
fn import_drops_dangling_connectors() {
    let mut h = host();
    let report = h
        .session
        .import_json(include_str!("fixtures/legacy_map.json"))
        .unwrap();
    assert_eq!(report.nodes, 3);
    assert_eq!(report.connectors, 2);
    assert_eq!(report.dropped_connectors, 1);
    assert_eq!(h.session.transform().scale, 3.0);
    assert!(h.store.get(KEY).is_some());
}

#[test]
fn display_list_marks_selection_and_connect_source() {
    let mut h = host();
    let a = h.session.add_node_at(Point::new(0.0, 0.0));
    let b = h.session.add_node_at(Point::new(300.0, 0.0));
    h.session.select(Some(b));
    let scene = h.session.display_list();
    assert!(scene.nodes[1].selected);
    assert_eq!(scene.css_transform, "translate(0px, 0px) scale(1)");

    h.session.start_connect_from(a);
    let scene = h.session.display_list();
    assert!(scene.nodes[0].connect_source);
    assert!(!scene.nodes[1].selected);
}

#[test]
fn node_at_prefers_the_topmost_overlap() {
    let mut h = host();
    let a = h.session.add_node_at(Point::new(0.0, 0.0));
    let b = h.session.add_node_at(Point::new(100.0, 0.0));
    assert_eq!(h.session.node_at(Point::new(50.0, 10.0)), Some(a));
    assert_eq!(h.session.node_at(Point::new(150.0, 10.0)), Some(b));
    assert_eq!(h.session.node_at(Point::new(500.0, 500.0)), None);
}
