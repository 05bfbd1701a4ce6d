//! Board-to-diagram conversion pipeline
//!
//! Turns a whiteboard export (shapes, sticky notes, text blocks and
//! connectors) into a decision graph and renders it as a Mermaid flowchart.
//! Every stage is a pure function of its input:
//! text normalization, identifier sanitizing, item classification, graph
//! assembly, start-node resolution and serialization.

pub mod board;
pub mod classify;
pub mod document;
pub mod error;
pub mod graph;
pub mod ident;
pub mod mermaid;
pub mod start;
pub mod text;
pub mod tree;

pub use board::{BoardSnapshot, BoardSummary, DecodedBoard, ItemKind, Position, RawConnector, RawItem};
pub use classify::{Classifier, ClassifierConfig, GraphNode, NodeRole};
pub use error::{CoreError, Result};
pub use graph::{DecisionGraph, GraphEdge};
pub use ident::{sanitize, IdentifierMap};
pub use mermaid::{render, MermaidDiagram, RenderOptions};
pub use start::{NoIncomingEdges, StartResolver, StartStrategy, TopmostEntry};
pub use text::normalize;
pub use tree::DecisionTree;

/// Result of converting one board
#[derive(Debug, Clone)]
pub struct Conversion {
    pub graph: DecisionGraph,
    pub diagram: MermaidDiagram,
    pub malformed_items: usize,
    pub malformed_connectors: usize,
}

/// Run the whole pipeline over a snapshot.
pub fn convert(
    snapshot: &BoardSnapshot,
    config: &ClassifierConfig,
    resolver: &dyn StartResolver,
    options: &RenderOptions,
) -> Conversion {
    let decoded = snapshot.decode();
    let classifier = Classifier::new(config.clone());
    let graph = DecisionGraph::from_records(&decoded.items, &decoded.connectors, &classifier, resolver);
    let diagram = render(&graph, options);

    Conversion {
        graph,
        diagram,
        malformed_items: decoded.malformed_items,
        malformed_connectors: decoded.malformed_connectors,
    }
}
