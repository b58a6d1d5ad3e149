mod common;

use composure::graph::layout::{CARD_HEIGHT, CARD_WIDTH, MAX_PASSES};
use composure::graph::render::to_flow;
use composure::graph::{GraphEdge, LayoutConfig, LayoutWarning, layout, to_graph, validate_layout_config};
use composure::model::builder::BlueprintBuilder;

fn levels_of(blueprint: &composure::Blueprint) -> Vec<usize> {
    let (nodes, edges) = to_graph(blueprint);
    let laid = layout(&nodes, &edges, &LayoutConfig::default());
    laid.nodes.iter().map(|n| n.level).collect()
}

#[test]
fn test_to_graph_skips_sentinel() {
    let blueprint = common::branch_merge();
    let (nodes, edges) = to_graph(&blueprint);

    assert_eq!(nodes.len(), 4);
    assert!(nodes.iter().all(|n| n.level == 0 && n.position.x == 0.0 && n.position.y == 0.0));
    assert_eq!(nodes[3].payload.name, "task-4");
    assert_eq!(
        edges,
        vec![
            GraphEdge { source: 1, target: 2 },
            GraphEdge { source: 1, target: 3 },
            GraphEdge { source: 2, target: 4 },
            GraphEdge { source: 3, target: 4 },
        ]
    );
}

#[test]
fn test_linear_chain_levels_and_positions() {
    let blueprint = common::linear();
    let (nodes, edges) = to_graph(&blueprint);
    let laid = layout(&nodes, &edges, &LayoutConfig::default());

    assert_eq!(laid.nodes.iter().map(|n| n.level).collect::<Vec<_>>(), vec![0, 1, 2]);
    assert!(laid.warning.is_none());
    let xs: Vec<f64> = laid.nodes.iter().map(|n| n.position.x).collect();
    assert!(xs[0] < xs[1] && xs[1] < xs[2]);
    assert_eq!(xs, vec![50.0, 350.0, 650.0]);
    // Singleton columns sit on the axis.
    assert!(laid.nodes.iter().all(|n| n.position.y == 0.0));
}

#[test]
fn test_branch_and_merge() {
    let blueprint = common::branch_merge();
    let (nodes, edges) = to_graph(&blueprint);
    let laid = layout(&nodes, &edges, &LayoutConfig::default());

    assert_eq!(laid.nodes.iter().map(|n| n.level).collect::<Vec<_>>(), vec![0, 1, 1, 2]);
    let x = |id| laid.node(id).unwrap().position.x;
    assert!(x(4) > x(2) && x(4) > x(3));

    // Two nodes in level 1, centred around y = 0 in input order.
    let y2 = laid.node(2).unwrap().position.y;
    let y3 = laid.node(3).unwrap().position.y;
    assert_eq!(y2, -75.0);
    assert_eq!(y3, 75.0);
    assert_eq!(laid.depth(), 3);
}

#[test]
fn test_every_edge_increases_level_on_dag() {
    let blueprint = BlueprintBuilder::new("wide")
        .simple(6, &[5, 1])
        .simple(5, &[4])
        .simple(4, &[2, 3])
        .simple(3, &[1])
        .simple(2, &[1])
        .simple(1, &[])
        .build();
    let (nodes, edges) = to_graph(&blueprint);
    let laid = layout(&nodes, &edges, &LayoutConfig::default());

    assert!(!laid.is_degenerate());
    assert!(laid.passes < MAX_PASSES);
    for edge in &edges {
        let source = laid.node(edge.source).unwrap().level;
        let target = laid.node(edge.target).unwrap().level;
        assert!(target > source, "edge {:?} not increasing", edge);
    }
}

#[test]
fn test_cycle_terminates_with_single_warning() {
    let blueprint = common::two_cycle();
    let (nodes, edges) = to_graph(&blueprint);
    let laid = layout(&nodes, &edges, &LayoutConfig::default());

    assert_eq!(laid.passes, MAX_PASSES);
    assert_eq!(laid.warning, Some(LayoutWarning::Degenerate { passes: MAX_PASSES }));
    assert_eq!(laid.nodes.len(), 2);
}

#[test]
fn test_self_dependency_is_degenerate() {
    let blueprint = BlueprintBuilder::new("self")
        .simple(1, &[1])
        .build();
    let (nodes, edges) = to_graph(&blueprint);
    let laid = layout(&nodes, &edges, &LayoutConfig::default());
    assert!(laid.is_degenerate());
}

#[test]
fn test_layout_is_idempotent_and_pure() {
    let blueprint = common::branch_merge();
    let (nodes, edges) = to_graph(&blueprint);
    let config = LayoutConfig::default();

    let first = layout(&nodes, &edges, &config);
    let second = layout(&nodes, &edges, &config);
    assert_eq!(first.nodes, second.nodes);
    // Input nodes are untouched.
    assert!(nodes.iter().all(|n| n.level == 0));
}

#[test]
fn test_isolated_and_root_only() {
    assert_eq!(levels_of(&BlueprintBuilder::new("one").simple(1, &[]).build()), vec![0]);

    let blueprint = BlueprintBuilder::new("isolated")
        .simple(1, &[])
        .simple(2, &[1])
        .simple(3, &[])
        .build();
    let (nodes, edges) = to_graph(&blueprint);
    let laid = layout(&nodes, &edges, &LayoutConfig::default());
    let n3 = laid.node(3).unwrap();
    assert_eq!(n3.level, 0);
    // Level 0 holds tasks 1 and 3, in input order.
    assert_eq!(laid.node(1).unwrap().position.y, -75.0);
    assert_eq!(n3.position.y, 75.0);
}

#[test]
fn test_unknown_edge_endpoints_are_ignored() {
    let blueprint = common::linear();
    let (nodes, mut edges) = to_graph(&blueprint);
    edges.push(GraphEdge { source: 42, target: 1 });
    let laid = layout(&nodes, &edges, &LayoutConfig::default());
    assert_eq!(laid.nodes.iter().map(|n| n.level).collect::<Vec<_>>(), vec![0, 1, 2]);
    assert!(!laid.is_degenerate());
}

#[test]
fn test_custom_spacing() {
    let config = LayoutConfig {
        horizontal_spacing: 400.0,
        vertical_spacing: 200.0,
        padding: 10.0,
    };
    let blueprint = common::branch_merge();
    let (nodes, edges) = to_graph(&blueprint);
    let laid = layout(&nodes, &edges, &config);

    assert_eq!(laid.node(1).unwrap().position.x, 10.0);
    assert_eq!(laid.node(4).unwrap().position.x, 810.0);
    assert_eq!(laid.node(2).unwrap().position.y, -100.0);
    assert_eq!(laid.node(3).unwrap().position.y, 100.0);
}

#[test]
fn test_validate_layout_config() {
    assert!(validate_layout_config(&LayoutConfig::default()));

    let cramped = LayoutConfig {
        vertical_spacing: CARD_HEIGHT - 1.0,
        ..LayoutConfig::default()
    };
    assert!(!validate_layout_config(&cramped));

    let narrow = LayoutConfig {
        horizontal_spacing: CARD_WIDTH - 1.0,
        ..LayoutConfig::default()
    };
    assert!(!validate_layout_config(&narrow));

    let nonsense = LayoutConfig {
        padding: f64::NAN,
        ..LayoutConfig::default()
    };
    assert!(!validate_layout_config(&nonsense));

    // Unsound configs still lay out.
    let blueprint = common::linear();
    let (nodes, edges) = to_graph(&blueprint);
    assert_eq!(layout(&nodes, &edges, &cramped).nodes.len(), 3);
}

#[test]
fn test_render_boundary_shape() {
    let blueprint = BlueprintBuilder::new("render")
        .task(1, "Speech to Text", "whisper-base").root().text("transcript").build()
        .task(2, "Summary", "bart").depends_on(&[1]).text("summary").build()
        .build();
    let (nodes, edges) = to_graph(&blueprint);
    let laid = layout(&nodes, &edges, &LayoutConfig::default());
    let flow = serde_json::to_value(to_flow(&laid, &edges)).unwrap();

    assert_eq!(flow["nodes"][0]["id"], "1");
    assert_eq!(flow["nodes"][0]["position"]["x"], 50.0);
    assert_eq!(flow["nodes"][0]["data"]["label"], "Speech to Text");
    assert_eq!(flow["nodes"][0]["data"]["serviceName"], "whisper-base");
    assert_eq!(flow["nodes"][0]["data"]["ioKind"], "text");
    assert_eq!(flow["nodes"][1]["data"]["level"], 1);

    let edge = &flow["edges"][0];
    assert_eq!(edge["id"], "e1-2");
    assert_eq!(edge["source"], "1");
    assert_eq!(edge["target"], "2");
    assert_eq!(edge["sourceHandle"], "output");
    assert_eq!(edge["targetHandle"], "input");
}

#[test]
fn test_render_drops_edges_to_unknown_nodes() {
    let blueprint = common::linear();
    let (nodes, mut edges) = to_graph(&blueprint);
    edges.push(GraphEdge { source: 42, target: 1 });
    edges.push(GraphEdge { source: 3, target: 99 });
    let laid = layout(&nodes, &edges, &LayoutConfig::default());
    let flow = to_flow(&laid, &edges);

    let ids: Vec<&str> = flow.edges.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["e1-2", "e2-3"]);
}
