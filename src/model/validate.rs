use std::collections::{HashMap, HashSet};

use crate::error::ValidationError;
use crate::model::{Blueprint, ROOT_SENTINEL, TaskId};

/// Every violation found in a blueprint. An empty report means the blueprint
/// is well-formed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub violations: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn has_cycle(&self) -> bool {
        self.violations
            .iter()
            .any(|v| matches!(v, ValidationError::Cycle(_)))
    }

    pub fn into_result(self) -> crate::error::Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(crate::error::Error::Validation(self.violations))
        }
    }
}

/// Checks blueprint invariants. Never fails: malformed input is reported,
/// the caller decides how to degrade.
pub fn validate(blueprint: &Blueprint) -> ValidationReport {
    let mut violations = Vec::new();

    if blueprint.tasks.is_empty() {
        violations.push(ValidationError::NoTasks);
        return ValidationReport { violations };
    }

    let mut ids = HashSet::new();
    for task in &blueprint.tasks {
        if task.id <= 0 {
            violations.push(ValidationError::NonPositiveId(task.id));
        }
        if !ids.insert(task.id) {
            violations.push(ValidationError::DuplicateId(task.id));
        }
        if task.name.trim().is_empty() {
            violations.push(ValidationError::EmptyField { task_id: task.id, field: "name" });
        }
        if task.service_name.trim().is_empty() {
            violations.push(ValidationError::EmptyField { task_id: task.id, field: "service_name" });
        }
    }

    for task in &blueprint.tasks {
        if task.dependencies.is_empty() {
            violations.push(ValidationError::EmptyDependencies(task.id));
            continue;
        }
        if task.is_root() {
            continue;
        }
        if task.dependencies.contains(&ROOT_SENTINEL) {
            violations.push(ValidationError::MisplacedSentinel(task.id));
        }
        for dep in task.upstream() {
            if dep == task.id {
                violations.push(ValidationError::SelfDependency(task.id));
            } else if !ids.contains(&dep) {
                violations.push(ValidationError::UnresolvedDependency {
                    task_id: task.id,
                    dependency: dep,
                });
            }
        }
    }

    violations.extend(find_cycles(blueprint, &ids).into_iter().map(ValidationError::Cycle));

    ValidationReport { violations }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    White,
    Grey,
    Black,
}

/// DFS colouring over resolvable, non-self dependencies. Each back edge found
/// yields the ids on that cycle, in dependency order.
fn find_cycles(blueprint: &Blueprint, ids: &HashSet<TaskId>) -> Vec<Vec<TaskId>> {
    // First declaration wins for duplicated ids.
    let mut deps: HashMap<TaskId, Vec<TaskId>> = HashMap::new();
    for task in &blueprint.tasks {
        deps.entry(task.id).or_insert_with(|| {
            task.upstream()
                .filter(|d| *d != task.id && ids.contains(d))
                .collect()
        });
    }

    let mut marks: HashMap<TaskId, Mark> = deps.keys().map(|id| (*id, Mark::White)).collect();
    let mut cycles = Vec::new();

    for task in &blueprint.tasks {
        if marks.get(&task.id) != Some(&Mark::White) {
            continue;
        }
        // Iterative DFS: (node, next child index)
        let mut path: Vec<TaskId> = Vec::new();
        let mut stack: Vec<(TaskId, usize)> = vec![(task.id, 0)];
        marks.insert(task.id, Mark::Grey);
        path.push(task.id);

        while let Some((node, child)) = stack.last().copied() {
            let children = &deps[&node];
            if child < children.len() {
                if let Some(top) = stack.last_mut() {
                    top.1 += 1;
                }
                let next = children[child];
                match marks.get(&next).copied().unwrap_or(Mark::Black) {
                    Mark::White => {
                        marks.insert(next, Mark::Grey);
                        path.push(next);
                        stack.push((next, 0));
                    }
                    Mark::Grey => {
                        if let Some(start) = path.iter().position(|id| *id == next) {
                            let mut cycle = path[start..].to_vec();
                            cycle.reverse();
                            cycles.push(cycle);
                        }
                    }
                    Mark::Black => {}
                }
            } else {
                marks.insert(node, Mark::Black);
                path.pop();
                stack.pop();
            }
        }
    }

    cycles
}
