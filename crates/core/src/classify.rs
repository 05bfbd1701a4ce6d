//! Item classification - deciding each item's role in the decision graph

use crate::board::{ItemKind, Position, RawItem};
use crate::ident::sanitize;
use crate::text::normalize_opt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Semantic role of a node
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    /// Entry point of the flow
    Start,
    /// Decision point, drawn as a rhombus
    Question,
    /// Terminal outcome, an empty shape
    Conclusion,
    /// Sticky note annotation
    Note,
    /// Free-standing text block
    Text,
    /// Shape carrying a step description
    Process,
}

impl std::fmt::Display for NodeRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeRole::Start => write!(f, "start"),
            NodeRole::Question => write!(f, "question"),
            NodeRole::Conclusion => write!(f, "conclusion"),
            NodeRole::Note => write!(f, "note"),
            NodeRole::Text => write!(f, "text"),
            NodeRole::Process => write!(f, "process"),
        }
    }
}

/// A classified board item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    /// Canonical (renderer-safe) identifier
    pub id: String,
    pub role: NodeRole,
    /// Normalized display label
    pub label: String,
    /// Identifier of the item this node came from
    pub external_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl GraphNode {
    pub fn new(external_id: impl Into<String>, role: NodeRole, label: impl Into<String>) -> Self {
        let external_id = external_id.into();
        Self {
            id: sanitize(&external_id),
            role,
            label: label.into(),
            external_id,
            position: None,
        }
    }

    /// Builder: set position
    pub fn with_position(mut self, position: Option<Position>) -> Self {
        self.position = position;
        self
    }
}

fn default_heading_prefixes() -> Vec<String> {
    vec!["decision tree".to_string()]
}

fn default_start_label() -> String {
    "Start".to_string()
}

fn default_conclusion_placeholder() -> String {
    "Conclusion".to_string()
}

fn default_note_placeholder() -> String {
    "Note".to_string()
}

/// Board-specific classification rules, supplied as configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassifierConfig {
    /// Shape that marks the entry point of the flow
    #[serde(default)]
    pub start_item_id: Option<String>,

    /// Labels for empty-content conclusion shapes, keyed by item identifier
    #[serde(default)]
    pub conclusion_labels: HashMap<String, String>,

    /// Text items starting with one of these (case-insensitive) are section titles
    #[serde(default = "default_heading_prefixes")]
    pub heading_prefixes: Vec<String>,

    #[serde(default = "default_start_label")]
    pub start_label: String,

    #[serde(default = "default_conclusion_placeholder")]
    pub conclusion_placeholder: String,

    #[serde(default = "default_note_placeholder")]
    pub note_placeholder: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            start_item_id: None,
            conclusion_labels: HashMap::new(),
            heading_prefixes: default_heading_prefixes(),
            start_label: default_start_label(),
            conclusion_placeholder: default_conclusion_placeholder(),
            note_placeholder: default_note_placeholder(),
        }
    }
}

impl ClassifierConfig {
    /// Builder: set the designated start item
    pub fn with_start_item(mut self, id: impl Into<String>) -> Self {
        self.start_item_id = Some(id.into());
        self
    }

    /// Builder: add a conclusion label override
    pub fn with_conclusion_label(mut self, id: impl Into<String>, label: impl Into<String>) -> Self {
        self.conclusion_labels.insert(id.into(), label.into());
        self
    }

    fn is_heading(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.heading_prefixes
            .iter()
            .any(|prefix| lower.starts_with(&prefix.to_lowercase()))
    }
}

/// Turns raw items into graph nodes
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    config: ClassifierConfig,
}

impl Classifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify one item; `None` means the item does not belong in the diagram.
    ///
    /// Rules apply in order and the first match wins.
    pub fn classify(&self, item: &RawItem) -> Option<GraphNode> {
        let content = normalize_opt(item.content.as_deref());

        let (role, label) = match item.kind {
            ItemKind::Text if self.config.is_heading(&content) => {
                debug!("Excluding heading text {}: {}", item.id, content);
                return None;
            }
            ItemKind::Text if !content.is_empty() => (NodeRole::Text, content),
            ItemKind::StickyNote => {
                let label = if content.is_empty() {
                    self.config.note_placeholder.clone()
                } else {
                    content
                };
                (NodeRole::Note, label)
            }
            ItemKind::Shape if item.shape.as_deref() == Some("rhombus") => {
                (NodeRole::Question, content)
            }
            ItemKind::Shape if self.config.start_item_id.as_deref() == Some(item.id.as_str()) => {
                (NodeRole::Start, self.config.start_label.clone())
            }
            ItemKind::Shape if !content.is_empty() => (NodeRole::Process, content),
            ItemKind::Shape => {
                let label = self
                    .config
                    .conclusion_labels
                    .get(&item.id)
                    .cloned()
                    .unwrap_or_else(|| self.config.conclusion_placeholder.clone());
                (NodeRole::Conclusion, label)
            }
            ItemKind::Text | ItemKind::Other => {
                debug!("Excluding item {} ({:?})", item.id, item.kind);
                return None;
            }
        };

        Some(GraphNode::new(item.id.clone(), role, label).with_position(item.position))
    }
}
