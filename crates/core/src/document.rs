//! Markdown document embedding a rendered diagram

use crate::graph::DecisionGraph;
use crate::mermaid::MermaidDiagram;

/// Default document heading
pub const DEFAULT_TITLE: &str = "Decision Tree Diagram";

/// Wrap a diagram in a Markdown document with a node legend.
///
/// The legend lists every node's canonical identifier next to its full,
/// untruncated label.
pub fn to_markdown(title: &str, diagram: &MermaidDiagram, graph: &DecisionGraph) -> String {
    let mut md = String::new();

    md.push_str(&format!("# {}\n\n", title));
    md.push_str("```mermaid\n");
    md.push_str(diagram.markup.trim_end());
    md.push_str("\n```\n");

    if graph.is_empty() {
        return md;
    }

    md.push_str("\n## Node Legend\n\n");
    for node in graph.nodes() {
        let id = diagram.ids.get(&node.external_id).unwrap_or(node.id.as_str());
        let label = if node.label.is_empty() {
            "(no label)"
        } else {
            node.label.as_str()
        };
        md.push_str(&format!("- {}: {}\n", id, label));
    }

    md
}
