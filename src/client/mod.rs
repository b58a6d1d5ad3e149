use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::Debug;

use crate::error::NetworkError;
use crate::lifecycle::trigger::RecompositionTrigger;
use crate::model::{Alternatives, Blueprint};

pub mod http;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComposeRequest {
    pub requirements: String,
    #[serde(default)]
    pub constraints: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComposeResponse {
    #[serde(default)]
    pub composition_id: Option<String>,
    pub status: String,
    pub blueprints: Alternatives,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfirmRequest {
    pub confirmed_blueprint: Blueprint,
    pub deployment_context: Value,
    pub original_requirements: String,
    pub selected_alternative: usize,
    pub confirmed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfirmResponse {
    pub composition_id: String,
    pub status: String,
}

/// Answer of the status endpoint. An unknown id is a normal outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteStatus {
    Found(StatusResponse),
    NotFound,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusResponse {
    pub status: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub confirmed_at: Option<String>,
    #[serde(default)]
    pub deployment_context: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecomposeResponse {
    #[serde(default)]
    pub original_composition_id: Option<String>,
    pub new_composition_id: String,
    pub status: String,
    #[serde(default)]
    pub blueprints: Option<Alternatives>,
    #[serde(default)]
    pub recomposition_reasoning: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// The external orchestrator. Implementations do not retry.
#[async_trait]
pub trait Orchestrator: Send + Sync + Debug {
    async fn compose(&self, request: &ComposeRequest) -> Result<ComposeResponse, NetworkError>;
    async fn confirm(&self, composition_id: &str, request: &ConfirmRequest) -> Result<ConfirmResponse, NetworkError>;
    async fn status(&self, composition_id: &str) -> Result<RemoteStatus, NetworkError>;
    async fn recompose(&self, trigger: &RecompositionTrigger) -> Result<RecomposeResponse, NetworkError>;
    async fn health(&self) -> Result<HealthResponse, NetworkError>;
}
