//! Start-node resolution strategies

use crate::classify::{GraphNode, NodeRole};
use crate::graph::DecisionGraph;
use std::collections::HashSet;

/// Picks the canonical entry point of a graph.
///
/// Returns the external identifier of the chosen node, or `None` for an
/// empty graph. Any `Fn(&DecisionGraph) -> Option<String>` is a resolver.
pub trait StartResolver {
    fn resolve(&self, graph: &DecisionGraph) -> Option<String>;
}

impl<F> StartResolver for F
where
    F: Fn(&DecisionGraph) -> Option<String>,
{
    fn resolve(&self, graph: &DecisionGraph) -> Option<String> {
        self(graph)
    }
}

fn incoming(graph: &DecisionGraph) -> HashSet<&str> {
    graph.edges().iter().map(|e| e.target.as_str()).collect()
}

fn looks_like_start(node: &GraphNode) -> bool {
    node.role == NodeRole::Start || node.label.to_lowercase().contains("start")
}

/// Prefer a node without incoming edges that is marked or labelled as a start.
///
/// Falls back to the first node without incoming edges, then to the first
/// node overall. Ties always break by insertion order.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIncomingEdges;

impl StartResolver for NoIncomingEdges {
    fn resolve(&self, graph: &DecisionGraph) -> Option<String> {
        let incoming = incoming(graph);
        let candidates: Vec<&GraphNode> = graph
            .nodes()
            .filter(|n| !incoming.contains(n.external_id.as_str()))
            .collect();

        candidates
            .iter()
            .find(|n| looks_like_start(n))
            .or_else(|| candidates.first())
            .copied()
            .or_else(|| graph.nodes().next())
            .map(|n| n.external_id.clone())
    }
}

/// Prefer the first content-bearing node (start, process, question) without
/// incoming edges; otherwise the topmost of those by board position.
///
/// Graphs with no content-bearing nodes defer to [`NoIncomingEdges`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TopmostEntry;

impl StartResolver for TopmostEntry {
    fn resolve(&self, graph: &DecisionGraph) -> Option<String> {
        let incoming = incoming(graph);
        let content: Vec<&GraphNode> = graph
            .nodes()
            .filter(|n| {
                matches!(
                    n.role,
                    NodeRole::Start | NodeRole::Process | NodeRole::Question
                )
            })
            .collect();

        if let Some(node) = content
            .iter()
            .find(|n| !incoming.contains(n.external_id.as_str()))
        {
            return Some(node.external_id.clone());
        }

        // min_by keeps the first of equal elements, so ties stay in insertion order
        let topmost = content.iter().min_by(|a, b| {
            let ay = a.position.map(|p| p.y).unwrap_or(0.0);
            let by = b.position.map(|p| p.y).unwrap_or(0.0);
            ay.total_cmp(&by)
        });

        match topmost {
            Some(node) => Some(node.external_id.clone()),
            None => NoIncomingEdges.resolve(graph),
        }
    }
}

/// Named resolver strategies, for selection from configuration or the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartStrategy {
    #[default]
    NoIncoming,
    Topmost,
}

impl StartStrategy {
    pub fn resolver(self) -> &'static dyn StartResolver {
        match self {
            StartStrategy::NoIncoming => &NoIncomingEdges,
            StartStrategy::Topmost => &TopmostEntry,
        }
    }
}

impl std::str::FromStr for StartStrategy {
    type Err = crate::CoreError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "no-incoming" | "no_incoming" => Ok(StartStrategy::NoIncoming),
            "topmost" => Ok(StartStrategy::Topmost),
            other => Err(crate::CoreError::Validation(format!(
                "unknown start strategy: {other}"
            ))),
        }
    }
}
