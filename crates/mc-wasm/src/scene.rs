//! Display list → JSON for the host renderer.

use mc_core::{Line, Rect};
use mc_render::DisplayList;
use serde_json::{Value, json};

/// Serialize one frame. Shape:
///
/// ```json
/// {
///   "transform": { "x": 0, "y": 0, "scale": 1 },
///   "css": "translate(0px, 0px) scale(1)",
///   "nodes": [{ "id": "…", "x": 0, "y": 0, "width": 180, "height": 72,
///               "screen": { "x": 0, "y": 0, "width": 180, "height": 72 },
///               "title": "…", "description": "…", "icon": null,
///               "color": "#ffffff", "textColor": "#333333",
///               "selected": false, "connectSource": false }],
///   "connectors": [{ "id": "conn_a_b", "from": [90, 36], "to": [190, 36],
///                    "screen": { "from": [90, 36], "to": [190, 36] } }]
/// }
/// ```
pub fn display_list_json(scene: &DisplayList) -> Value {
    let nodes: Vec<Value> = scene
        .nodes
        .iter()
        .map(|node| {
            let mut obj = rect_json(node.bounds);
            obj["id"] = json!(node.id.as_str());
            obj["screen"] = rect_json(node.screen);
            obj["title"] = json!(node.title);
            obj["description"] = json!(node.description);
            obj["icon"] = json!(node.icon);
            obj["color"] = json!(node.fill);
            obj["textColor"] = json!(node.text_color);
            obj["selected"] = json!(node.selected);
            obj["connectSource"] = json!(node.connect_source);
            obj
        })
        .collect();

    let connectors: Vec<Value> = scene
        .connectors
        .iter()
        .map(|conn| {
            let mut obj = line_json(conn.line);
            obj["id"] = json!(conn.id.as_str());
            obj["screen"] = line_json(conn.screen);
            obj
        })
        .collect();

    json!({
        "transform": {
            "x": scene.transform.x,
            "y": scene.transform.y,
            "scale": scene.transform.scale,
        },
        "css": scene.css_transform,
        "nodes": nodes,
        "connectors": connectors,
    })
}

fn rect_json(r: Rect) -> Value {
    json!({ "x": r.x0, "y": r.y0, "width": r.width(), "height": r.height() })
}

fn line_json(l: Line) -> Value {
    json!({ "from": [l.p0.x, l.p0.y], "to": [l.p1.x, l.p1.y] })
}
