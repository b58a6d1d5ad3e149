use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::graph::{GraphEdge, GraphNode, Position};
use crate::model::TaskId;

/// Relaxation passes allowed before the graph is declared degenerate.
pub const MAX_PASSES: usize = 100;

/// Size of a rendered task card, in pixels.
pub const CARD_WIDTH: f64 = 250.0;
pub const CARD_HEIGHT: f64 = 120.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    #[serde(alias = "horizontalSpacing")]
    pub horizontal_spacing: f64,
    #[serde(alias = "verticalSpacing")]
    pub vertical_spacing: f64,
    pub padding: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            horizontal_spacing: 300.0,
            vertical_spacing: 150.0,
            padding: 50.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutWarning {
    /// The pass ceiling was hit: the graph is cyclic or deeper than the
    /// ceiling. Levels are whatever the last pass produced.
    Degenerate { passes: usize },
}

/// Output of one layout call.
#[derive(Debug, Clone)]
pub struct Layout<'a> {
    pub nodes: Vec<GraphNode<'a>>,
    pub passes: usize,
    pub warning: Option<LayoutWarning>,
}

impl<'a> Layout<'a> {
    pub fn is_degenerate(&self) -> bool {
        self.warning.is_some()
    }

    pub fn node(&self, id: TaskId) -> Option<&GraphNode<'a>> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn depth(&self) -> usize {
        self.nodes.iter().map(|n| n.level + 1).max().unwrap_or(0)
    }
}

/// Reports whether rendered cards would overlap or be unusable with this
/// config. Problems are logged; layout still runs with an unsound config.
pub fn validate_layout_config(config: &LayoutConfig) -> bool {
    let mut sound = true;

    let values = [
        ("horizontal_spacing", config.horizontal_spacing),
        ("vertical_spacing", config.vertical_spacing),
        ("padding", config.padding),
    ];
    for (field, value) in values {
        if !value.is_finite() || value < 0.0 {
            warn!(field, value, "Layout option must be a finite, non-negative number");
            sound = false;
        }
    }

    if config.vertical_spacing < CARD_HEIGHT {
        warn!(
            vertical_spacing = config.vertical_spacing,
            card_height = CARD_HEIGHT,
            "Vertical spacing is below card height, nodes will overlap"
        );
        sound = false;
    }
    if config.horizontal_spacing < CARD_WIDTH {
        warn!(
            horizontal_spacing = config.horizontal_spacing,
            card_width = CARD_WIDTH,
            "Horizontal spacing is below card width, columns will overlap"
        );
        sound = false;
    }

    sound
}

/// Assigns levels by bounded relaxation and positions every node.
///
/// Termination is guaranteed by the pass ceiling, not by cycle detection, so
/// cyclic input still yields a (non-canonical) renderable layout plus a
/// [`LayoutWarning::Degenerate`]. The input is not modified.
pub fn layout<'a>(nodes: &[GraphNode<'a>], edges: &[GraphEdge], config: &LayoutConfig) -> Layout<'a> {
    // First occurrence wins for duplicate ids.
    let mut index: HashMap<TaskId, usize> = HashMap::with_capacity(nodes.len());
    for (i, node) in nodes.iter().enumerate() {
        index.entry(node.id).or_insert(i);
    }

    let resolved: Vec<(usize, usize)> = edges
        .iter()
        .filter_map(|edge| match (index.get(&edge.source), index.get(&edge.target)) {
            (Some(s), Some(t)) => Some((*s, *t)),
            _ => {
                debug!(source = edge.source, target = edge.target, "Skipping edge with unknown endpoint");
                None
            }
        })
        .collect();

    let (levels, passes, converged) = relax(nodes.len(), &resolved);

    let warning = if converged {
        None
    } else {
        warn!(
            passes,
            nodes = nodes.len(),
            edges = resolved.len(),
            "Layout reached the pass ceiling, dependency graph is cyclic or too deep"
        );
        Some(LayoutWarning::Degenerate { passes })
    };

    let positions = place(&levels, config);

    let nodes = nodes
        .iter()
        .zip(levels.iter().zip(positions))
        .map(|(node, (level, position))| GraphNode {
            level: *level,
            position,
            ..node.clone()
        })
        .collect();

    Layout { nodes, passes, warning }
}

/// Returns (levels, passes run, converged).
fn relax(node_count: usize, edges: &[(usize, usize)]) -> (Vec<usize>, usize, bool) {
    let mut levels = vec![0usize; node_count];
    let mut passes = 0;

    while passes < MAX_PASSES {
        passes += 1;
        let mut changed = false;
        for &(source, target) in edges {
            if levels[target] <= levels[source] {
                levels[target] = levels[source] + 1;
                changed = true;
            }
        }
        if !changed {
            return (levels, passes, true);
        }
    }

    (levels, passes, false)
}

/// Columns by level; each column is a vertical block centred on y = 0, nodes
/// kept in input order.
fn place(levels: &[usize], config: &LayoutConfig) -> Vec<Position> {
    let mut columns: HashMap<usize, Vec<usize>> = HashMap::new();
    for (i, level) in levels.iter().enumerate() {
        columns.entry(*level).or_default().push(i);
    }

    let mut positions = vec![Position::default(); levels.len()];
    let spacing = config.vertical_spacing;
    for (level, members) in &columns {
        let x = *level as f64 * config.horizontal_spacing + config.padding;
        let top = -(members.len() as f64 * spacing) / 2.0;
        for (row, node) in members.iter().enumerate() {
            positions[*node] = Position {
                x,
                y: top + row as f64 * spacing + spacing / 2.0,
            };
        }
    }
    positions
}
