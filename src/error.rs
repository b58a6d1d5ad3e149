use serde_json::Value;
use thiserror::Error;

use crate::lifecycle::{Event, Status};

/// A single broken invariant found while validating a blueprint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Blueprint contains no tasks")]
    NoTasks,

    #[error("Task id {0} is not a positive integer")]
    NonPositiveId(i64),

    #[error("Task id {0} is declared more than once")]
    DuplicateId(i64),

    #[error("Task {task_id} has an empty {field}")]
    EmptyField { task_id: i64, field: &'static str },

    #[error("Task {0} has an empty dependency list, use [-1] for a root task")]
    EmptyDependencies(i64),

    #[error("Task {0} mixes the -1 sentinel with other dependencies")]
    MisplacedSentinel(i64),

    #[error("Task {task_id} depends on {dependency}, which is not in the blueprint")]
    UnresolvedDependency { task_id: i64, dependency: i64 },

    #[error("Task {0} depends on itself")]
    SelfDependency(i64),

    #[error("Dependency cycle through tasks {0:?}")]
    Cycle(Vec<i64>),
}

/// Illegal lifecycle transitions and local precondition failures.
/// None of these mutate the lifecycle record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("Requirements are empty")]
    EmptyRequirements,

    #[error("Compose returned no composition id")]
    MissingCompositionId,

    #[error("No composition is active")]
    NoActiveComposition,

    #[error("Alternative {index} is out of range ({count} available)")]
    InvalidAlternative { index: usize, count: usize },

    #[error("Cannot apply {event:?} while {from}")]
    IllegalTransition { from: Status, event: Event },

    #[error("Composition {0} is not tracked")]
    UnknownComposition(String),
}

/// Transport failure, timeout or non-2xx response from a collaborator.
/// `status` is 0 when no HTTP response was received.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Network error (status {status}): {message}")]
pub struct NetworkError {
    pub status: u16,
    pub message: String,
    pub body: Option<Value>,
}

impl NetworkError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: 0,
            message: message.into(),
            body: None,
        }
    }

    pub fn response(status: u16, message: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            status,
            message: message.into(),
            body,
        }
    }

    pub fn is_transport(&self) -> bool {
        self.status == 0
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid blueprint: {0:?}")]
    Validation(Vec<ValidationError>),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
