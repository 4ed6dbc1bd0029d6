//! Mind-map node model.
//!
//! A `Node` owns its identity, world-space geometry and content. Geometry is
//! stored explicitly (`x, y, width, height`) so connector endpoints can be
//! computed without a rendering surface. Every content change that actually
//! changes something appends to a bounded `History` log; no-op edits do not.

use crate::id::NodeId;
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::VecDeque;

/// Title given to interactively created nodes.
pub const DEFAULT_TITLE: &str = "New idea";
/// Default node fill.
pub const DEFAULT_COLOR: &str = "#ffffff";
/// Maximum number of history entries kept per node.
pub const HISTORY_LIMIT: usize = 10;
/// Default rendered node size in world units.
pub const DEFAULT_NODE_SIZE: Size = Size::new(180.0, 72.0);

const LIGHT_TEXT: &str = "#ffffff";
const DARK_TEXT: &str = "#333333";

// ─── Colors ──────────────────────────────────────────────────────────────

/// 8-bit RGB color parsed from a hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Helper to parse a single hex digit.
fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RGB` or `#RRGGBB`. The `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        match bytes.len() {
            3 => {
                let r = hex_val(bytes[0])?;
                let g = hex_val(bytes[1])?;
                let b = hex_val(bytes[2])?;
                Some(Self::rgb(r * 17, g * 17, b * 17))
            }
            6 => {
                let r = hex_val(bytes[0])? << 4 | hex_val(bytes[1])?;
                let g = hex_val(bytes[2])? << 4 | hex_val(bytes[3])?;
                let b = hex_val(bytes[4])? << 4 | hex_val(bytes[5])?;
                Some(Self::rgb(r, g, b))
            }
            _ => None,
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Perceived brightness on a 0–255 scale.
    pub fn luminance(&self) -> f64 {
        0.2126 * f64::from(self.r) + 0.7152 * f64::from(self.g) + 0.0722 * f64::from(self.b)
    }
}

// ─── Icons ───────────────────────────────────────────────────────────────

/// A node icon: either a named glyph from the icon font or a literal emoji.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Icon {
    /// Icon-font glyph code such as `fa-lightbulb`.
    Glyph(String),
    /// Literal character(s), usually an emoji.
    Emoji(String),
}

impl Icon {
    /// Normalize raw icon input. Empty input means "no icon".
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            None
        } else if raw.starts_with("fa-") {
            Some(Icon::Glyph(raw.to_string()))
        } else {
            Some(Icon::Emoji(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Icon::Glyph(s) | Icon::Emoji(s) => s,
        }
    }
}

impl Serialize for Icon {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Icon {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Icon::parse(&s).ok_or_else(|| serde::de::Error::custom("icon must not be empty"))
    }
}

/// `null`, missing and `""` all read as "no icon".
fn deserialize_icon<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Icon>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.and_then(|s| Icon::parse(&s)))
}

// ─── History ─────────────────────────────────────────────────────────────

/// One snapshot of a node's content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "deserialize_icon")]
    pub icon: Option<Icon>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

/// Bounded append-only content log, most recent last.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History(VecDeque<HistoryEntry>);

impl History {
    /// Build from stored entries, keeping only the most recent `HISTORY_LIMIT`.
    pub fn from_entries(entries: Vec<HistoryEntry>) -> Self {
        let mut history = History(VecDeque::with_capacity(HISTORY_LIMIT + 1));
        for entry in entries {
            history.push(entry);
        }
        history
    }

    /// Append an entry, evicting the oldest past the limit.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.0.push_back(entry);
        while self.0.len() > HISTORY_LIMIT {
            self.0.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.0.back()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &HistoryEntry> {
        self.0.iter()
    }
}

// ─── Node ────────────────────────────────────────────────────────────────

/// Initial content for a new node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeContent {
    pub title: String,
    pub description: String,
    pub color: String,
    pub icon: Option<Icon>,
}

impl Default for NodeContent {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            description: String::new(),
            color: DEFAULT_COLOR.to_string(),
            icon: None,
        }
    }
}

/// A single idea on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    /// World-space top-left corner.
    pub x: f64,
    pub y: f64,
    /// World-space rendered size.
    pub width: f64,
    pub height: f64,
    pub title: String,
    pub description: String,
    /// Fill as a hex RGB string, kept verbatim.
    pub color: String,
    pub icon: Option<Icon>,
    history: History,
}

impl Node {
    /// Create a node whose history holds exactly one entry: its initial content.
    pub fn new(id: NodeId, position: Point, size: Size, content: NodeContent, now_ms: u64) -> Self {
        let mut node = Self {
            id,
            x: position.x,
            y: position.y,
            width: size.width,
            height: size.height,
            title: content.title,
            description: content.description,
            color: content.color,
            icon: content.icon,
            history: History::default(),
        };
        node.record_history(now_ms);
        node
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn set_position(&mut self, position: Point) {
        self.x = position.x;
        self.y = position.y;
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// World-space bounding box.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position(), self.size())
    }

    /// Visual center; connectors attach here, not at the top-left.
    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Write title and description if either changed. Returns whether it did.
    pub fn update_content(&mut self, title: &str, description: &str, now_ms: u64) -> bool {
        if self.title == title && self.description == description {
            return false;
        }
        self.title = title.to_string();
        self.description = description.to_string();
        self.record_history(now_ms);
        log::debug!("node {} content updated, history size {}", self.id, self.history.len());
        true
    }

    pub fn set_color(&mut self, color: &str, now_ms: u64) -> bool {
        if self.color == color {
            return false;
        }
        self.color = color.to_string();
        self.record_history(now_ms);
        true
    }

    /// Set or clear the icon. `None` and `Some("")` both clear it.
    pub fn set_icon(&mut self, icon: Option<&str>, now_ms: u64) -> bool {
        let icon = icon.and_then(Icon::parse);
        if self.icon == icon {
            return false;
        }
        self.icon = icon;
        self.record_history(now_ms);
        true
    }

    /// Text color with enough contrast against the fill.
    pub fn text_color(&self) -> &'static str {
        match Color::from_hex(&self.color) {
            Some(c) if c.luminance() < 140.0 => LIGHT_TEXT,
            _ => DARK_TEXT,
        }
    }

    fn record_history(&mut self, now_ms: u64) {
        self.history.push(HistoryEntry {
            title: self.title.clone(),
            description: self.description.clone(),
            icon: self.icon.clone(),
            timestamp: now_ms,
        });
    }

    pub fn to_record(&self) -> NodeRecord {
        NodeRecord {
            id: Some(self.id),
            x: self.x,
            y: self.y,
            title: self.title.clone(),
            description: self.description.clone(),
            color: self.color.clone(),
            icon: self.icon.clone(),
            history: Some(self.history.iter().cloned().collect()),
            width: Some(self.width),
            height: Some(self.height),
        }
    }

    /// Rebuild a node from its record.
    ///
    /// A missing id is generated; missing size falls back to `default_size`;
    /// an absent or empty history is synthesized from the current fields.
    pub fn from_record(record: NodeRecord, default_size: Size, now_ms: u64) -> Self {
        let id = record.id.unwrap_or_else(|| NodeId::generate(now_ms));
        let history = record.history.unwrap_or_default();
        let mut node = Self {
            id,
            x: record.x,
            y: record.y,
            width: record.width.unwrap_or(default_size.width),
            height: record.height.unwrap_or(default_size.height),
            title: record.title,
            description: record.description,
            color: record.color,
            icon: record.icon,
            history: History::from_entries(history),
        };
        if node.history.is_empty() {
            node.record_history(now_ms);
        }
        node
    }
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

/// Plain serialized form of a node, as stored and exported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NodeId>,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default, deserialize_with = "deserialize_icon")]
    pub icon: Option<Icon>,
    #[serde(default)]
    pub history: Option<Vec<HistoryEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}
