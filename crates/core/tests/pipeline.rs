//! End-to-end tests for the board-to-diagram pipeline

mod common;

use boardflow_core::{
    convert, ClassifierConfig, DecisionTree, NoIncomingEdges, NodeRole, RenderOptions,
};
use common::{connector, empty_shape, shape, snapshot, text};

fn run(snapshot: &boardflow_core::BoardSnapshot) -> boardflow_core::Conversion {
    convert(
        snapshot,
        &ClassifierConfig::default(),
        &NoIncomingEdges,
        &RenderOptions::default(),
    )
}

/// A rhombus with Yes/No branches to two empty shapes
#[test]
fn test_yes_no_decision() {
    let board = snapshot(
        vec![
            empty_shape("20"),
            shape("10", "rhombus", "<p>Is X true?</p>"),
            empty_shape("30"),
        ],
        vec![
            connector("10", "20", &["<p>Yes</p>"]),
            connector("10", "30", &["No"]),
        ],
    );

    let result = run(&board);
    let graph = &result.graph;

    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.edge_count(), 2);
    assert_eq!(graph.start(), Some("10"));
    assert_eq!(graph.node("10").unwrap().role, NodeRole::Question);
    assert_eq!(graph.node("20").unwrap().role, NodeRole::Conclusion);
    assert_eq!(graph.node("30").unwrap().role, NodeRole::Conclusion);

    let expected = "\
flowchart TD
    N10{\"Is X true?\"}
    N20([\"Conclusion\"])
    N30([\"Conclusion\"])

    N10 -->|\"Yes\"| N20
    N10 -->|\"No\"| N30
";
    assert_eq!(result.diagram.markup, expected);
}

/// A connector pointing at an item that does not exist
#[test]
fn test_dangling_connector_dropped() {
    let board = snapshot(
        vec![shape("1", "rectangle", "Only step")],
        vec![connector("1", "404", &["Next"])],
    );

    let result = run(&board);

    assert_eq!(result.graph.node_count(), 1);
    assert_eq!(result.graph.edge_count(), 0);
    assert_eq!(
        result.diagram.markup,
        "flowchart TD\n    N1[\"Only step\"]\n\n"
    );
}

/// A section title never becomes a node
#[test]
fn test_heading_excluded() {
    let board = snapshot(
        vec![
            text("1", "Decision Tree Overview"),
            shape("2", "rectangle", "Step"),
        ],
        vec![connector("1", "2", &[])],
    );

    let result = run(&board);

    assert!(result.graph.node("1").is_none());
    assert_eq!(result.graph.node_count(), 1);
    assert_eq!(result.graph.edge_count(), 0);
}

/// No items, no connectors
#[test]
fn test_empty_board() {
    let result = run(&snapshot(vec![], vec![]));

    assert!(result.graph.is_empty());
    assert_eq!(result.graph.start(), None);
    assert_eq!(result.diagram.markup, "flowchart TD\n");
}

/// A label longer than the node limit
#[test]
fn test_long_label_truncated() {
    let long = "Does the project involve processing personal data of participants?";
    let board = snapshot(vec![shape("1", "rhombus", long)], vec![]);

    let result = run(&board);
    let line = result.diagram.markup.lines().nth(1).unwrap();
    let label = line
        .trim()
        .trim_start_matches("N1{\"")
        .trim_end_matches("\"}");

    assert!(label.ends_with("..."));
    assert_eq!(label.chars().count(), RenderOptions::default().node_label_max);
}

/// Malformed records are skipped without touching the rest
#[test]
fn test_malformed_records_skipped() {
    let mut board = snapshot(
        vec![shape("1", "rectangle", "Step"), empty_shape("2")],
        vec![connector("1", "2", &[])],
    );
    board.items.push(serde_json::json!({"type": "shape"}));
    board.connectors.push(serde_json::json!({"endItem": {"id": "2"}}));

    let result = run(&board);

    assert_eq!(result.malformed_items, 1);
    assert_eq!(result.malformed_connectors, 1);
    assert_eq!(result.graph.node_count(), 2);
    assert_eq!(result.graph.edge_count(), 1);
}

/// Every edge endpoint is a node, every node has one of the fixed roles
#[test]
fn test_edges_are_sound() {
    let board = snapshot(
        vec![
            shape("1", "rhombus", "Q1"),
            text("2", "Decision tree"),
            shape("3", "rhombus", "Q2"),
            empty_shape("4"),
            serde_json::json!({"id": "5", "type": "frame"}),
        ],
        vec![
            connector("1", "2", &["a"]),
            connector("1", "3", &["b"]),
            connector("3", "4", &[]),
            connector("5", "4", &[]),
            connector("3", "6", &[]),
        ],
    );

    let result = run(&board);
    let graph = &result.graph;

    for edge in graph.edges() {
        assert!(graph.node(&edge.source).is_some());
        assert!(graph.node(&edge.target).is_some());
    }
    assert_eq!(graph.edge_count(), 2);
    assert!(graph.nodes().all(|n| matches!(
        n.role,
        NodeRole::Start
            | NodeRole::Question
            | NodeRole::Conclusion
            | NodeRole::Note
            | NodeRole::Text
            | NodeRole::Process
    )));
}

/// Configured start item and conclusion labels flow through to the markup
#[test]
fn test_board_configuration() {
    let config = ClassifierConfig::default()
        .with_start_item("100")
        .with_conclusion_label("300", "Seek Advice");
    let board = snapshot(
        vec![
            shape("200", "rhombus", "Registered?"),
            empty_shape("300"),
            shape("100", "round_rectangle", ""),
        ],
        vec![
            connector("100", "200", &[]),
            connector("200", "300", &["No", "<p>Unsure</p>"]),
        ],
    );

    let result = convert(&board, &config, &NoIncomingEdges, &RenderOptions::default());

    assert_eq!(result.graph.start(), Some("100"));
    let lines: Vec<&str> = result.diagram.markup.lines().collect();
    assert_eq!(lines[1], "    N100([\"Start\"])");
    assert!(lines.contains(&"    N300([\"Seek Advice\"])"));
    assert!(lines.contains(&"    N200 -->|\"No / Unsure\"| N300"));
}

/// The tree export mirrors the graph
#[test]
fn test_tree_export() {
    let board = snapshot(
        vec![shape("1", "rhombus", "Q"), empty_shape("2")],
        vec![connector("1", "2", &["Yes"])],
    );
    let result = run(&board);

    let tree = DecisionTree::from_graph(&result.graph, board.board_id.clone());

    assert_eq!(tree.start.as_deref(), Some("1"));
    assert_eq!(tree.nodes["1"].options[0].next, "2");
    assert_eq!(tree.metadata.board_id.as_deref(), Some("uXjVtest="));
}

/// Converting the same board twice gives identical output
#[test]
fn test_pipeline_is_deterministic() {
    let board = snapshot(
        vec![
            shape("b", "rectangle", "B"),
            shape("a", "rectangle", "A"),
            empty_shape("c"),
        ],
        vec![connector("a", "c", &[]), connector("b", "c", &[])],
    );

    assert_eq!(run(&board).diagram.markup, run(&board).diagram.markup);
    assert_eq!(run(&board).graph.start(), Some("b"));
}
