pub mod layout;
pub mod render;

use serde::Serialize;

use crate::model::{Blueprint, Task, TaskId};

pub use layout::{Layout, LayoutConfig, LayoutWarning, layout, validate_layout_config};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Graph view of one task. Borrows the task for display; never owns it.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode<'a> {
    pub id: TaskId,
    pub level: usize,
    pub position: Position,
    pub payload: &'a Task,
}

/// `source` feeds `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GraphEdge {
    pub source: TaskId,
    pub target: TaskId,
}

/// One node per task at level 0 and the origin, one edge per non-sentinel
/// dependency.
pub fn to_graph(blueprint: &Blueprint) -> (Vec<GraphNode<'_>>, Vec<GraphEdge>) {
    let nodes = blueprint
        .tasks
        .iter()
        .map(|task| GraphNode {
            id: task.id,
            level: 0,
            position: Position::default(),
            payload: task,
        })
        .collect();

    let edges = blueprint
        .tasks
        .iter()
        .flat_map(|task| {
            task.upstream().map(move |dep| GraphEdge {
                source: dep,
                target: task.id,
            })
        })
        .collect();

    (nodes, edges)
}
