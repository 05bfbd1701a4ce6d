//! Mermaid flowchart serialization

use crate::classify::{GraphNode, NodeRole};
use crate::graph::DecisionGraph;
use crate::ident::IdentifierMap;
use tracing::{debug, warn};

/// Header directive for a top-down flowchart
pub const HEADER: &str = "flowchart TD";

const INDENT: &str = "    ";

/// Label length limits and truncation marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Maximum node label length, in characters, including the ellipsis
    pub node_label_max: usize,
    /// Maximum edge label length, in characters, including the ellipsis
    pub edge_label_max: usize,
    pub ellipsis: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            node_label_max: 50,
            edge_label_max: 30,
            ellipsis: "...".to_string(),
        }
    }
}

/// Bracket pair for a node shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeShape {
    Diamond,
    Stadium,
    Rectangle,
}

impl NodeShape {
    pub fn for_role(role: NodeRole) -> Self {
        match role {
            NodeRole::Question => NodeShape::Diamond,
            NodeRole::Start | NodeRole::Conclusion => NodeShape::Stadium,
            NodeRole::Note | NodeRole::Text | NodeRole::Process => NodeShape::Rectangle,
        }
    }

    pub fn brackets(self) -> (&'static str, &'static str) {
        match self {
            NodeShape::Diamond => ("{", "}"),
            NodeShape::Stadium => ("([", "])"),
            NodeShape::Rectangle => ("[", "]"),
        }
    }
}

/// Make a label safe inside a quoted Mermaid label and bound its length.
///
/// The length is counted on the cleaned text before `<` and `>` are
/// escaped, so a cut never lands inside an entity.
pub fn render_label(text: &str, max: usize, ellipsis: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter_map(|c| match c {
            '"' => Some('\''),
            '\n' | '\r' => Some(' '),
            '{' | '}' | '(' | ')' | '[' | ']' => None,
            c => Some(c),
        })
        .collect();

    let cut = truncate(cleaned.trim(), max, ellipsis);
    let mut safe = String::with_capacity(cut.len());
    for c in cut.chars() {
        match c {
            '<' => safe.push_str("&lt;"),
            '>' => safe.push_str("&gt;"),
            c => safe.push(c),
        }
    }
    safe
}

fn truncate(text: &str, max: usize, ellipsis: &str) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let marker_len = ellipsis.chars().count();
    if max < marker_len {
        return ellipsis.chars().take(max).collect();
    }
    let mut out: String = text.chars().take(max - marker_len).collect();
    out.push_str(ellipsis);
    out
}

/// Rendered diagram plus the identifier mapping used to produce it
#[derive(Debug, Clone)]
pub struct MermaidDiagram {
    pub markup: String,
    pub ids: IdentifierMap,
}

/// Render a decision graph as a Mermaid flowchart.
///
/// The start node is declared first, then the remaining nodes in insertion
/// order, then the edges after a blank line.
pub fn render(graph: &DecisionGraph, options: &RenderOptions) -> MermaidDiagram {
    let ids: IdentifierMap = graph.nodes().map(|n| n.external_id.as_str()).collect();
    if !ids.collisions().is_empty() {
        warn!(
            "{} identifier collisions; colliding nodes share a diagram id",
            ids.collisions().len()
        );
    }

    let mut lines = vec![HEADER.to_string()];
    if graph.is_empty() {
        return MermaidDiagram {
            markup: lines.join("\n") + "\n",
            ids,
        };
    }

    let start = graph.start_node();
    let ordered = start
        .into_iter()
        .chain(graph.nodes().filter(|n| Some(n.external_id.as_str()) != graph.start()));

    for node in ordered {
        if let Some(id) = ids.get(&node.external_id) {
            lines.push(node_line(id, node, options));
        }
    }

    lines.push(String::new());

    for edge in graph.edges() {
        let (Some(from), Some(to)) = (ids.get(&edge.source), ids.get(&edge.target)) else {
            debug!("Skipping edge {} -> {}: unmapped endpoint", edge.source, edge.target);
            continue;
        };

        let label = render_label(&edge.label, options.edge_label_max, &options.ellipsis);
        if label.is_empty() {
            lines.push(format!("{INDENT}{from} --> {to}"));
        } else {
            lines.push(format!("{INDENT}{from} -->|\"{label}\"| {to}"));
        }
    }

    MermaidDiagram {
        markup: lines.join("\n") + "\n",
        ids,
    }
}

fn node_line(id: &str, node: &GraphNode, options: &RenderOptions) -> String {
    let (open, close) = NodeShape::for_role(node.role).brackets();
    let label = render_label(&node.label, options.node_label_max, &options.ellipsis);
    format!("{INDENT}{id}{open}\"{label}\"{close}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{ItemKind, RawConnector, RawItem};
    use crate::classify::Classifier;
    use crate::graph::GraphEdge;
    use crate::start::NoIncomingEdges;

    fn build(items: &[RawItem], connectors: &[RawConnector]) -> DecisionGraph {
        DecisionGraph::from_records(items, connectors, &Classifier::default(), &NoIncomingEdges)
    }

    #[test]
    fn test_empty_graph_is_header_only() {
        let diagram = render(&DecisionGraph::default(), &RenderOptions::default());
        assert_eq!(diagram.markup, "flowchart TD\n");
        assert!(diagram.ids.is_empty());
    }

    #[test]
    fn test_shapes_by_role() {
        assert_eq!(NodeShape::for_role(NodeRole::Question).brackets(), ("{", "}"));
        assert_eq!(NodeShape::for_role(NodeRole::Start).brackets(), ("([", "])"));
        assert_eq!(NodeShape::for_role(NodeRole::Conclusion).brackets(), ("([", "])"));
        assert_eq!(NodeShape::for_role(NodeRole::Note).brackets(), ("[", "]"));
        assert_eq!(NodeShape::for_role(NodeRole::Process).brackets(), ("[", "]"));
    }

    #[test]
    fn test_label_cleanup() {
        assert_eq!(render_label("Say \"hi\"", 50, "..."), "Say 'hi'");
        assert_eq!(render_label("a < b > c", 50, "..."), "a &lt; b &gt; c");
        assert_eq!(render_label("f(x) [y] {z}", 50, "..."), "fx y z");
        assert_eq!(render_label("two\nlines", 50, "..."), "two lines");
    }

    #[test]
    fn test_label_truncation() {
        let long = "x".repeat(80);
        let label = render_label(&long, 50, "...");
        assert_eq!(label.chars().count(), 50);
        assert!(label.ends_with("..."));

        let exact = "y".repeat(50);
        assert_eq!(render_label(&exact, 50, "..."), exact);
    }

    #[test]
    fn test_truncation_counts_characters() {
        let label = render_label(&"é".repeat(40), 30, "...");
        assert_eq!(label.chars().count(), 30);
    }

    #[test]
    fn test_truncation_never_splits_entities() {
        let fits = format!("{}<b", "a".repeat(46));
        let label = render_label(&fits, 50, "...");
        assert!(label.ends_with("&lt;b"));

        let cut = format!("{}<{}", "a".repeat(45), "b".repeat(10));
        let label = render_label(&cut, 50, "...");
        assert_eq!(label, format!("{}&lt;b...", "a".repeat(45)));
    }

    #[test]
    fn test_limit_below_ellipsis_length() {
        assert_eq!(render_label("long label", 2, "..."), "..");
        assert_eq!(render_label("long label", 0, "..."), "");
        assert_eq!(render_label("ok", 2, "..."), "ok");
    }

    #[test]
    fn test_unmapped_edge_endpoints_are_skipped() {
        let graph = DecisionGraph::from_parts(
            vec![GraphNode::new("1", NodeRole::Start, "Go")],
            vec![GraphEdge::new("1", "ghost", "yes"), GraphEdge::new("ghost", "1", "")],
            Some("1"),
        );
        let diagram = render(&graph, &RenderOptions::default());
        assert_eq!(diagram.markup, "flowchart TD\n    N1([\"Go\"])\n\n");
    }

    #[test]
    fn test_start_node_emitted_first() {
        let items = vec![
            RawItem::new("2", ItemKind::Shape),
            RawItem::new("1", ItemKind::Shape).with_content("Start here"),
        ];
        let connectors = vec![RawConnector::new("1", "2")];
        let diagram = render(&build(&items, &connectors), &RenderOptions::default());

        let expected = "flowchart TD\n    N1[\"Start here\"]\n    N2([\"Conclusion\"])\n\n    N1 --> N2\n";
        assert_eq!(diagram.markup, expected);
    }

    #[test]
    fn test_labeled_edge_syntax() {
        let items = vec![
            RawItem::new("1", ItemKind::Shape).with_shape("rhombus").with_content("Q"),
            RawItem::new("2", ItemKind::Shape),
        ];
        let connectors = vec![RawConnector::new("1", "2").with_caption("A very long caption that goes past thirty")];
        let diagram = render(&build(&items, &connectors), &RenderOptions::default());
        let edge = diagram.markup.lines().last().unwrap();
        assert_eq!(edge, "    N1 -->|\"A very long caption that go...\"| N2");
    }

    #[test]
    fn test_ids_map_external_to_canonical() {
        let items = vec![RawItem::new("abc-1", ItemKind::Shape).with_content("A")];
        let diagram = render(&build(&items, &[]), &RenderOptions::default());
        assert_eq!(diagram.ids.get("abc-1"), Some("abc_1"));
        assert!(diagram.markup.contains("abc_1[\"A\"]"));
    }

    #[test]
    fn test_custom_limits() {
        let options = RenderOptions {
            node_label_max: 10,
            edge_label_max: 5,
            ellipsis: "…".into(),
        };
        assert_eq!(render_label("abcdefghijklmnop", options.node_label_max, &options.ellipsis), "abcdefghi…");
    }
}
