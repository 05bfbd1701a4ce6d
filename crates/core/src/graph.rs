//! Decision graph assembly from classified items and connectors

use crate::board::{RawConnector, RawItem};
use crate::classify::{Classifier, GraphNode, NodeRole};
use crate::start::StartResolver;
use crate::text::normalize;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info};

/// Separator between caption fragments in an edge label
pub const CAPTION_SEPARATOR: &str = " / ";

/// A directed link between two nodes, keyed by external identifier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    /// Normalized caption text, empty when the connector had none
    pub label: String,
}

impl GraphEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            label: label.into(),
        }
    }
}

/// Join the non-empty normalized caption fragments of a connector
pub fn caption_label(captions: &[String]) -> String {
    captions
        .iter()
        .map(|c| normalize(c))
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join(CAPTION_SEPARATOR)
}

/// Nodes, edges and the designated entry point of one board.
///
/// Nodes are keyed by the external identifier of their item, so two items
/// whose canonical identifiers collide are still two nodes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DecisionGraph {
    nodes: IndexMap<String, GraphNode>,
    edges: Vec<GraphEdge>,
    start: Option<String>,
}

impl DecisionGraph {
    /// Classify every item and keep the connectors whose endpoints both survived.
    ///
    /// The start node is left unset; see [`DecisionGraph::resolve_start`].
    pub fn build(items: &[RawItem], connectors: &[RawConnector], classifier: &Classifier) -> Self {
        let mut nodes = IndexMap::new();
        for item in items {
            if let Some(node) = classifier.classify(item) {
                if nodes.contains_key(&node.external_id) {
                    debug!("Duplicate item {} ignored", node.external_id);
                    continue;
                }
                nodes.insert(node.external_id.clone(), node);
            }
        }

        let mut edges = Vec::new();
        let mut dropped = 0usize;
        for connector in connectors {
            if !nodes.contains_key(&connector.source) || !nodes.contains_key(&connector.target) {
                debug!(
                    "Dropping connector {} -> {}: endpoint not in graph",
                    connector.source, connector.target
                );
                dropped += 1;
                continue;
            }
            edges.push(GraphEdge::new(
                connector.source.clone(),
                connector.target.clone(),
                caption_label(&connector.captions),
            ));
        }

        info!(
            "Built graph: {} nodes from {} items, {} edges ({} connectors dropped)",
            nodes.len(),
            items.len(),
            edges.len(),
            dropped
        );

        Self {
            nodes,
            edges,
            start: None,
        }
    }

    /// Assemble a graph without the endpoint filtering done by `build`
    #[cfg(test)]
    pub(crate) fn from_parts(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>, start: Option<&str>) -> Self {
        Self {
            nodes: nodes.into_iter().map(|n| (n.external_id.clone(), n)).collect(),
            edges,
            start: start.map(str::to_string),
        }
    }

    /// Build the graph and designate its start node in one step
    pub fn from_records(
        items: &[RawItem],
        connectors: &[RawConnector],
        classifier: &Classifier,
        resolver: &dyn StartResolver,
    ) -> Self {
        let mut graph = Self::build(items, connectors, classifier);
        graph.resolve_start(resolver);
        graph
    }

    /// Designate the start node chosen by `resolver`.
    ///
    /// A choice that does not key an existing node is discarded.
    pub fn resolve_start(&mut self, resolver: &dyn StartResolver) -> Option<&GraphNode> {
        self.start = resolver
            .resolve(self)
            .filter(|id| self.nodes.contains_key(id));
        if let Some(ref id) = self.start {
            debug!("Start node: {}", id);
        }
        self.start_node()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    pub fn node(&self, external_id: &str) -> Option<&GraphNode> {
        self.nodes.get(external_id)
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    /// External identifier of the start node
    pub fn start(&self) -> Option<&str> {
        self.start.as_deref()
    }

    pub fn start_node(&self) -> Option<&GraphNode> {
        self.start.as_deref().and_then(|id| self.nodes.get(id))
    }

    /// Edges leaving a node, in board order
    pub fn outgoing<'a>(&'a self, external_id: &'a str) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.edges.iter().filter(move |e| e.source == external_id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Count of nodes per role
    pub fn role_counts(&self) -> IndexMap<NodeRole, usize> {
        let mut counts = IndexMap::new();
        for node in self.nodes.values() {
            *counts.entry(node.role).or_insert(0) += 1;
        }
        counts
    }
}
