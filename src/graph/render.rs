//! Shapes handed to the presentation layer. Nothing outside this module is
//! part of the rendering contract.

use serde::Serialize;

use crate::graph::{GraphEdge, Layout, Position};
use crate::model::Channel;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowNodeData {
    pub task_id: i64,
    pub label: String,
    pub service_name: String,
    pub level: usize,
    pub channels: Vec<Channel>,
    pub io_kind: Option<Channel>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowNode {
    pub id: String,
    pub position: Position,
    pub data: FlowNodeData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub source_handle: String,
    pub target_handle: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowGraph {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
}

pub fn to_flow(layout: &Layout<'_>, edges: &[GraphEdge]) -> FlowGraph {
    let nodes = layout
        .nodes
        .iter()
        .map(|node| FlowNode {
            id: node.id.to_string(),
            position: node.position,
            data: FlowNodeData {
                task_id: node.id,
                label: node.payload.name.clone(),
                service_name: node.payload.service_name.clone(),
                level: node.level,
                channels: node.payload.arguments.populated(),
                io_kind: node.payload.arguments.io_kind(),
            },
        })
        .collect();

    // Edges touching a node the layout skipped would dangle.
    let edges = edges
        .iter()
        .filter(|edge| layout.node(edge.source).is_some() && layout.node(edge.target).is_some())
        .map(|edge| FlowEdge {
            id: format!("e{}-{}", edge.source, edge.target),
            source: edge.source.to_string(),
            target: edge.target.to_string(),
            source_handle: "output".to_string(),
            target_handle: "input".to_string(),
        })
        .collect();

    FlowGraph { nodes, edges }
}
