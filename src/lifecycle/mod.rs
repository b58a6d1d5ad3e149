pub mod session;
pub mod store;
pub mod trigger;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::StateError;
use crate::model::Blueprint;

pub use session::{Composition, Session};
pub use store::TrackingStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Generated,
    Confirmed,
    Deployed,
    Recomposed,
    Failed,
}

impl Status {
    /// Reads a status string reported by the orchestrator.
    pub fn from_remote(s: &str) -> Option<Status> {
        match s.trim().to_ascii_lowercase().as_str() {
            "generated" | "created" => Some(Status::Generated),
            "confirmed" => Some(Status::Confirmed),
            "deployed" => Some(Status::Deployed),
            "recomposed" => Some(Status::Recomposed),
            "failed" => Some(Status::Failed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Generated => "generated",
            Status::Confirmed => "confirmed",
            Status::Deployed => "deployed",
            Status::Recomposed => "recomposed",
            Status::Failed => "failed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    Select,
    Confirm,
    Deploy,
    Recompose,
    Fail,
}

/// The transition table. Every legality check in the crate goes through here.
///
/// `Recompose` is checked against the original record; the resulting status
/// belongs to the new sibling record, the original stays `Deployed`.
pub fn transition(from: Status, event: Event) -> Result<Status, StateError> {
    use Event::*;
    use Status::*;

    match (from, event) {
        (Generated, Select) => Ok(Generated),
        (Recomposed, Select) => Ok(Recomposed),
        (Generated | Recomposed, Confirm) => Ok(Confirmed),
        (Confirmed, Deploy) => Ok(Deployed),
        (Deployed, Recompose) => Ok(Recomposed),
        (_, Fail) => Ok(Failed),
        (from, event) => Err(StateError::IllegalTransition { from, event }),
    }
}

/// Last known lifecycle state of one composition id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleRecord {
    pub composition_id: String,
    pub status: Status,
    pub selected_alternative: usize,
    /// The selected blueprint; after confirmation, the confirmed snapshot.
    pub blueprint: Blueprint,
    pub deployment_context: Value,
    pub original_requirements: String,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub recomposed_at: Option<DateTime<Utc>>,
    pub recomposed_from: Option<String>,
    pub superseded_by: Option<String>,
}

impl LifecycleRecord {
    pub fn generated(composition_id: &str, requirements: &str, blueprint: Blueprint) -> Self {
        Self {
            composition_id: composition_id.to_string(),
            status: Status::Generated,
            selected_alternative: 0,
            blueprint,
            deployment_context: Value::Null,
            original_requirements: requirements.to_string(),
            created_at: Utc::now(),
            confirmed_at: None,
            recomposed_at: None,
            recomposed_from: None,
            superseded_by: None,
        }
    }
}
