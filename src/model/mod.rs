pub mod builder;
pub mod fallback;
pub mod validate;

use serde::{Deserialize, Deserializer, Serialize};

pub use validate::{ValidationReport, validate};

pub type TaskId = i64;

/// Dependency value marking a root task. Only valid as the whole list `[-1]`.
pub const ROOT_SENTINEL: TaskId = -1;

/// Artifact channels a task can consume or produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Image,
    Text,
    Document,
}

/// Task arguments: one optional artifact token per channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskArgs {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub document: Option<String>,
}

impl TaskArgs {
    pub fn get(&self, channel: Channel) -> Option<&str> {
        match channel {
            Channel::Image => self.image.as_deref(),
            Channel::Text => self.text.as_deref(),
            Channel::Document => self.document.as_deref(),
        }
    }

    /// Channels carrying an artifact, in image/text/document order.
    pub fn populated(&self) -> Vec<Channel> {
        [Channel::Image, Channel::Text, Channel::Document]
            .into_iter()
            .filter(|c| self.get(*c).is_some())
            .collect()
    }

    /// The task's input/output type, if exactly one channel is populated.
    pub fn io_kind(&self) -> Option<Channel> {
        match self.populated().as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }
}

/// One service invocation inside a blueprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Task {
    #[serde(rename = "task", alias = "name")]
    pub name: String,
    #[serde(alias = "serviceName")]
    pub service_name: String,
    pub id: TaskId,
    #[serde(rename = "dep", alias = "dependencies")]
    pub dependencies: Vec<TaskId>,
    #[serde(rename = "args", alias = "arguments", default)]
    pub arguments: TaskArgs,
}

impl Task {
    pub fn is_root(&self) -> bool {
        is_root(self)
    }

    /// Dependencies excluding the root sentinel.
    pub fn upstream(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.dependencies
            .iter()
            .copied()
            .filter(|d| *d != ROOT_SENTINEL)
    }
}

pub fn is_root(task: &Task) -> bool {
    task.dependencies.as_slice() == [ROOT_SENTINEL]
}

/// A candidate task graph satisfying a set of requirements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Blueprint {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    pub tasks: Vec<Task>,
}

/// The orchestrator may send `"description": null`.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Blueprint {
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn roots(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| t.is_root())
    }
}

/// The set of blueprints returned for one generation request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alternatives {
    pub alternatives: Vec<Blueprint>,
}

impl Alternatives {
    pub fn len(&self) -> usize {
        self.alternatives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Blueprint> {
        self.alternatives.get(index)
    }
}
