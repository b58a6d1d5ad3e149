#![allow(dead_code)]

use async_trait::async_trait;
use composure::client::{
    ComposeRequest, ComposeResponse, ConfirmRequest, ConfirmResponse, HealthResponse, Orchestrator,
    RecomposeResponse, RemoteStatus, StatusResponse,
};
use composure::error::NetworkError;
use composure::lifecycle::trigger::RecompositionTrigger;
use composure::model::builder::BlueprintBuilder;
use composure::model::{Alternatives, Blueprint};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

pub fn linear() -> Blueprint {
    BlueprintBuilder::new("linear")
        .simple(1, &[])
        .simple(2, &[1])
        .simple(3, &[2])
        .build()
}

pub fn branch_merge() -> Blueprint {
    BlueprintBuilder::new("branch and merge")
        .simple(1, &[])
        .simple(2, &[1])
        .simple(3, &[1])
        .simple(4, &[2, 3])
        .build()
}

pub fn two_cycle() -> Blueprint {
    BlueprintBuilder::new("cycle")
        .simple(1, &[2])
        .simple(2, &[1])
        .build()
}

/// Scripted orchestrator that records every call it receives.
#[derive(Debug)]
pub struct MockOrchestrator {
    pub composition_id: Option<String>,
    pub alternatives: Vec<Blueprint>,
    pub remote_status: Mutex<Option<String>>,
    pub recompose_id: Mutex<Option<String>>,
    pub fail_next: AtomicBool,
    pub calls: Mutex<Vec<String>>,
    pub confirmed: Mutex<Vec<ConfirmRequest>>,
}

impl MockOrchestrator {
    pub fn new(composition_id: Option<&str>, alternatives: Vec<Blueprint>) -> Self {
        Self {
            composition_id: composition_id.map(str::to_string),
            alternatives,
            remote_status: Mutex::new(None),
            recompose_id: Mutex::new(None),
            fail_next: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
            confirmed: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_next_call(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn set_remote_status(&self, status: Option<&str>) {
        *self.remote_status.lock().unwrap() = status.map(str::to_string);
    }

    /// Overrides the id handed out by `recompose` (default `{id}-r`).
    pub fn set_recompose_id(&self, id: &str) {
        *self.recompose_id.lock().unwrap() = Some(id.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn enter(&self, call: String) -> Result<(), NetworkError> {
        self.calls.lock().unwrap().push(call);
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(NetworkError::response(503, "Service Unavailable", None));
        }
        Ok(())
    }
}

#[async_trait]
impl Orchestrator for MockOrchestrator {
    async fn compose(&self, request: &ComposeRequest) -> Result<ComposeResponse, NetworkError> {
        self.enter(format!("compose:{}", request.requirements))?;
        Ok(ComposeResponse {
            composition_id: self.composition_id.clone(),
            status: "created".to_string(),
            blueprints: Alternatives {
                alternatives: self.alternatives.clone(),
            },
            created_at: None,
        })
    }

    async fn confirm(&self, composition_id: &str, request: &ConfirmRequest) -> Result<ConfirmResponse, NetworkError> {
        self.enter(format!("confirm:{}", composition_id))?;
        self.confirmed.lock().unwrap().push(request.clone());
        Ok(ConfirmResponse {
            composition_id: composition_id.to_string(),
            status: "deployed".to_string(),
        })
    }

    async fn status(&self, composition_id: &str) -> Result<RemoteStatus, NetworkError> {
        self.enter(format!("status:{}", composition_id))?;
        Ok(match self.remote_status.lock().unwrap().clone() {
            Some(status) => RemoteStatus::Found(StatusResponse {
                status,
                created_at: None,
                confirmed_at: None,
                deployment_context: None,
            }),
            None => RemoteStatus::NotFound,
        })
    }

    async fn recompose(&self, trigger: &RecompositionTrigger) -> Result<RecomposeResponse, NetworkError> {
        self.enter(format!("recompose:{}", trigger.composition_id))?;
        let new_composition_id = self
            .recompose_id
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| format!("{}-r", trigger.composition_id));
        Ok(RecomposeResponse {
            original_composition_id: Some(trigger.composition_id.clone()),
            new_composition_id,
            status: "recomposed".to_string(),
            blueprints: Some(Alternatives {
                alternatives: vec![linear()],
            }),
            recomposition_reasoning: Some("replace slow service".to_string()),
        })
    }

    async fn health(&self) -> Result<HealthResponse, NetworkError> {
        self.enter("health".to_string())?;
        Ok(HealthResponse {
            status: "healthy".to_string(),
            timestamp: None,
        })
    }
}
