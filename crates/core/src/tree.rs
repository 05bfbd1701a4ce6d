//! Decision-tree export - nodes with their outgoing options, as YAML

use crate::classify::NodeRole;
use crate::graph::DecisionGraph;
use crate::Result;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One outgoing choice from a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeOption {
    pub label: String,
    /// External identifier of the next node
    pub next: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    #[serde(rename = "type")]
    pub role: NodeRole,
    pub text: String,
    #[serde(default)]
    pub options: Vec<TreeOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeMetadata {
    pub board_id: Option<String>,
    pub extracted_at: Option<DateTime<Utc>>,
}

/// A decision graph in navigable form, keyed by external identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub start: Option<String>,
    pub nodes: IndexMap<String, TreeNode>,
    pub metadata: TreeMetadata,
}

impl DecisionTree {
    pub fn from_graph(graph: &DecisionGraph, board_id: Option<String>) -> Self {
        let nodes = graph
            .nodes()
            .map(|node| {
                let options = graph
                    .outgoing(&node.external_id)
                    .map(|edge| TreeOption {
                        label: edge.label.clone(),
                        next: edge.target.clone(),
                    })
                    .collect();
                (
                    node.external_id.clone(),
                    TreeNode {
                        role: node.role,
                        text: node.label.clone(),
                        options,
                    },
                )
            })
            .collect();

        Self {
            start: graph.start().map(str::to_string),
            nodes,
            metadata: TreeMetadata {
                board_id,
                extracted_at: None,
            },
        }
    }

    /// Builder: stamp the extraction time
    pub fn extracted_at(mut self, at: DateTime<Utc>) -> Self {
        self.metadata.extracted_at = Some(at);
        self
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}
