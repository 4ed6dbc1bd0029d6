//! Integration tests: loading stored and imported maps (mc-core).
//!
//! Exercises the snapshot document end to end: legacy records without
//! sizes or history, dangling connectors, and out-of-range view state.

use mc_core::*;
use pretty_assertions::assert_eq;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn legacy() -> GraphSnapshot {
    GraphSnapshot::parse_import(include_str!("fixtures/legacy_map.json")).unwrap()
}

// ─── Records ────────────────────────────────────────────────────────────

#[test]
fn legacy_nodes_get_defaults() {
    init_logger();
    let (graph, report) = legacy().restore(DEFAULT_NODE_SIZE, 42);
    assert_eq!(report.nodes, 3);

    let branch = graph.node(NodeId::intern("node_1700000001000_k4")).unwrap();
    assert_eq!(branch.size(), DEFAULT_NODE_SIZE);
    assert_eq!(branch.icon, None);
    assert_eq!(branch.history().len(), 1);
    assert_eq!(branch.history().latest().unwrap().timestamp, 42);

    let leaf = graph.node(NodeId::intern("node_1700000002000_k5")).unwrap();
    assert_eq!(leaf.icon, Some(Icon::Emoji("🌱".into())));
    assert_eq!(leaf.history().len(), 1);
    assert_eq!(leaf.history().latest().unwrap().title, "Leaf");
}

#[test]
fn stored_history_is_kept_verbatim() {
    let (graph, _) = legacy().restore(DEFAULT_NODE_SIZE, 0);
    let central = graph.node(NodeId::intern("node_1700000000000_k3")).unwrap();
    let titles: Vec<&str> = central.history().iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["New idea", "Central idea"]);
    assert_eq!(central.icon, Some(Icon::Glyph("fa-lightbulb".into())));
    assert_eq!(central.text_color(), "#ffffff");
}

#[test]
fn long_stored_history_keeps_the_newest_ten() {
    let entries: Vec<String> = (0..12)
        .map(|i| format!(r#"{{"title": "t{i}", "description": "", "icon": null, "timestamp": {i}}}"#))
        .collect();
    let doc = format!(
        r#"{{"nodes": [{{"id": "long_history", "x": 0, "y": 0, "title": "t11", "history": [{}]}}], "connectors": []}}"#,
        entries.join(",")
    );
    let (graph, _) = GraphSnapshot::parse_import(&doc)
        .unwrap()
        .restore(DEFAULT_NODE_SIZE, 0);
    let node = graph.node(NodeId::intern("long_history")).unwrap();
    assert_eq!(node.history().len(), HISTORY_LIMIT);
    let titles: Vec<&str> = node.history().iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles.first(), Some(&"t2"));
    assert_eq!(titles.last(), Some(&"t11"));
}

// ─── Connectors ─────────────────────────────────────────────────────────

#[test]
fn dangling_connector_is_dropped_silently() {
    init_logger();
    let (graph, report) = legacy().restore(DEFAULT_NODE_SIZE, 0);
    assert_eq!(report.connectors, 2);
    assert_eq!(report.dropped_connectors, 1);
    assert!(
        graph
            .connectors()
            .iter()
            .all(|c| graph.contains(c.from) && graph.contains(c.to))
    );
}

#[test]
fn connector_endpoints_follow_node_centers() {
    let (graph, _) = legacy().restore(DEFAULT_NODE_SIZE, 0);
    let conn = *graph
        .connectors()
        .find_between(
            NodeId::intern("node_1700000001000_k4"),
            NodeId::intern("node_1700000000000_k3"),
        )
        .unwrap();
    let line = graph.connector_line(&conn).unwrap();
    assert_eq!(line.p0, Point::new(210.0, 116.0));
    assert_eq!(line.p1, Point::new(510.0, 96.0));
}

// ─── View ───────────────────────────────────────────────────────────────

#[test]
fn out_of_range_scale_is_clamped() {
    let snapshot = legacy();
    assert_eq!(snapshot.view(), ViewTransform::new(-35.5, 12.0, 3.0));
    assert!(!snapshot.snap_to_grid_enabled);
}

#[test]
fn resaved_map_parses_back_to_the_same_graph() {
    let (graph, _) = legacy().restore(DEFAULT_NODE_SIZE, 0);
    let json = GraphSnapshot::capture(&graph, ViewTransform::IDENTITY, false)
        .to_json_pretty()
        .unwrap();
    let (again, report) = GraphSnapshot::parse_import(&json)
        .unwrap()
        .restore(Size::new(1.0, 1.0), 0);
    assert_eq!(report.dropped_connectors, 0);
    assert_eq!(again.nodes(), graph.nodes());
}
