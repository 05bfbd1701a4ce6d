//! Raw board records - items and connectors as exported by the whiteboard

use crate::Result;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Kind of visual item on the board
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Shape,
    StickyNote,
    Text,
    /// Frames, images, cards and anything else the pipeline ignores
    #[serde(other)]
    Other,
}

/// Position of an item's center on the board canvas
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Position {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

/// One visual item on the board
#[derive(Debug, Clone, PartialEq)]
pub struct RawItem {
    pub id: String,
    pub kind: ItemKind,
    /// Shape sub-kind, e.g. `rhombus` or `round_rectangle`
    pub shape: Option<String>,
    /// Rich-text content
    pub content: Option<String>,
    pub position: Option<Position>,
}

impl RawItem {
    pub fn new(id: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: id.into(),
            kind,
            shape: None,
            content: None,
            position: None,
        }
    }

    /// Builder: set shape sub-kind
    pub fn with_shape(mut self, shape: impl Into<String>) -> Self {
        self.shape = Some(shape.into());
        self
    }

    /// Builder: set rich-text content
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Builder: set position
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Some(Position { x, y });
        self
    }
}

/// A directed link between two items
#[derive(Debug, Clone, PartialEq)]
pub struct RawConnector {
    pub source: String,
    pub target: String,
    /// Caption fragments in board order
    pub captions: Vec<String>,
}

impl RawConnector {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            captions: Vec::new(),
        }
    }

    /// Builder: append a caption fragment
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.captions.push(caption.into());
        self
    }
}

// ==========================================
// WIRE FORMAT
// ==========================================

/// Board identifiers arrive as strings, but some exports carry numbers
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireId {
    Text(String),
    Number(u64),
}

impl WireId {
    fn into_id(self) -> Option<String> {
        let id = match self {
            WireId::Text(s) => s,
            WireId::Number(n) => n.to_string(),
        };
        if id.trim().is_empty() {
            None
        } else {
            Some(id)
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireItem {
    #[serde(default)]
    id: Option<WireId>,
    #[serde(default, rename = "type")]
    kind: Option<ItemKind>,
    #[serde(default)]
    data: Option<WireItemData>,
    #[serde(default)]
    position: Option<Position>,
}

#[derive(Debug, Default, Deserialize)]
struct WireItemData {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    html: Option<String>,
    #[serde(default)]
    shape: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireEndpoint {
    #[serde(default)]
    id: Option<WireId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireConnector {
    #[serde(default)]
    start_item: Option<WireEndpoint>,
    #[serde(default)]
    end_item: Option<WireEndpoint>,
    #[serde(default)]
    captions: Option<Vec<WireCaption>>,
}

#[derive(Debug, Deserialize)]
struct WireCaption {
    #[serde(default)]
    content: Option<String>,
}

fn decode_item(value: &Value) -> Option<RawItem> {
    let wire: WireItem = match serde_json::from_value(value.clone()) {
        Ok(wire) => wire,
        Err(e) => {
            debug!("Undecodable item record: {}", e);
            return None;
        }
    };

    let id = wire.id.and_then(WireId::into_id)?;
    let data = wire.data.unwrap_or_default();

    Some(RawItem {
        id,
        kind: wire.kind.unwrap_or(ItemKind::Other),
        shape: data.shape,
        content: data.content.filter(|c| !c.is_empty()).or(data.html),
        position: wire.position,
    })
}

fn decode_connector(value: &Value) -> Option<RawConnector> {
    let wire: WireConnector = match serde_json::from_value(value.clone()) {
        Ok(wire) => wire,
        Err(e) => {
            debug!("Undecodable connector record: {}", e);
            return None;
        }
    };

    let source = wire.start_item?.id.and_then(WireId::into_id)?;
    let target = wire.end_item?.id.and_then(WireId::into_id)?;
    let captions = wire
        .captions
        .unwrap_or_default()
        .into_iter()
        .filter_map(|c| c.content)
        .collect();

    Some(RawConnector {
        source,
        target,
        captions,
    })
}

fn endpoint_id(connector: &Value, key: &str) -> Option<String> {
    match connector.get(key)?.get("id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ==========================================
// SNAPSHOT
// ==========================================

/// A complete, fully paginated board export.
///
/// Records stay untyped so a snapshot written to disk is exactly what the
/// board API returned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardSnapshot {
    #[serde(default)]
    pub items: Vec<Value>,

    #[serde(default)]
    pub connectors: Vec<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board_id: Option<String>,
}

/// Typed records decoded from a snapshot
#[derive(Debug, Clone, Default)]
pub struct DecodedBoard {
    pub items: Vec<RawItem>,
    pub connectors: Vec<RawConnector>,
    /// Item records skipped for a missing identifier or bad shape
    pub malformed_items: usize,
    /// Connector records skipped for a missing endpoint identifier or bad shape
    pub malformed_connectors: usize,
}

impl BoardSnapshot {
    /// Parse a snapshot from the JSON document written by `fetch`
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the snapshot as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode every record, skipping malformed ones.
    pub fn decode(&self) -> DecodedBoard {
        let mut decoded = DecodedBoard::default();

        for value in &self.items {
            match decode_item(value) {
                Some(item) => decoded.items.push(item),
                None => decoded.malformed_items += 1,
            }
        }

        for value in &self.connectors {
            match decode_connector(value) {
                Some(connector) => decoded.connectors.push(connector),
                None => decoded.malformed_connectors += 1,
            }
        }

        if decoded.malformed_items > 0 || decoded.malformed_connectors > 0 {
            warn!(
                "Skipped {} malformed items and {} malformed connectors",
                decoded.malformed_items, decoded.malformed_connectors
            );
        }

        decoded
    }
}

// ==========================================
// SUMMARY
// ==========================================

/// Short description of one connector for previews
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorPreview {
    pub source: String,
    pub target: String,
    pub label: String,
}

/// Overview of a snapshot's contents
#[derive(Debug, Clone, Default)]
pub struct BoardSummary {
    pub total_items: usize,
    pub total_connectors: usize,
    /// Item counts keyed by the raw `type` field, in first-seen order
    pub item_types: IndexMap<String, usize>,
    /// The first few connectors
    pub preview: Vec<ConnectorPreview>,
    /// Identifiers referenced by connectors with no matching item
    pub missing_items: IndexSet<String>,
}

impl BoardSummary {
    /// Number of connectors kept in the preview
    pub const PREVIEW_LEN: usize = 5;

    pub fn from_snapshot(snapshot: &BoardSnapshot) -> Self {
        let mut item_types: IndexMap<String, usize> = IndexMap::new();
        let mut item_ids = IndexSet::new();

        for item in &snapshot.items {
            let kind = item
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            *item_types.entry(kind.to_string()).or_insert(0) += 1;

            match item.get("id") {
                Some(Value::String(s)) => {
                    item_ids.insert(s.clone());
                }
                Some(Value::Number(n)) => {
                    item_ids.insert(n.to_string());
                }
                _ => {}
            }
        }

        let preview = snapshot
            .connectors
            .iter()
            .take(Self::PREVIEW_LEN)
            .map(|c| ConnectorPreview {
                source: endpoint_id(c, "startItem").unwrap_or_else(|| "unknown".into()),
                target: endpoint_id(c, "endItem").unwrap_or_else(|| "unknown".into()),
                label: decode_connector(c)
                    .map(|rc| crate::graph::caption_label(&rc.captions))
                    .unwrap_or_default(),
            })
            .collect();

        let mut missing_items = IndexSet::new();
        for connector in &snapshot.connectors {
            for key in ["startItem", "endItem"] {
                if let Some(id) = endpoint_id(connector, key) {
                    if !item_ids.contains(&id) {
                        missing_items.insert(id);
                    }
                }
            }
        }

        Self {
            total_items: snapshot.items.len(),
            total_connectors: snapshot.connectors.len(),
            item_types,
            preview,
            missing_items,
        }
    }
}
