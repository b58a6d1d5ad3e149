use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::client::{ComposeRequest, ConfirmRequest, Orchestrator, RemoteStatus};
use crate::error::{NetworkError, Result, StateError};
use crate::lifecycle::store::TrackingStore;
use crate::lifecycle::trigger::RecompositionTrigger;
use crate::lifecycle::{Event, LifecycleRecord, Status, transition};
use crate::model::fallback::default_alternatives;
use crate::model::{Alternatives, Blueprint};

/// The composition currently on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub composition_id: Option<String>,
    pub requirements: String,
    pub alternatives: Alternatives,
    pub selected: usize,
    pub status: Status,
}

impl Composition {
    pub fn selected_blueprint(&self) -> Option<&Blueprint> {
        self.alternatives.get(self.selected)
    }
}

/// One user's lifecycle driver: a single active composition, an orchestrator
/// and a shared tracking store. External calls never retry; a failed call
/// leaves the active composition and its record as they were.
pub struct Session {
    id: Uuid,
    orchestrator: Arc<dyn Orchestrator>,
    store: Arc<TrackingStore>,
    active: Option<Composition>,
}

impl Session {
    pub fn new(orchestrator: Arc<dyn Orchestrator>, store: Arc<TrackingStore>) -> Self {
        Self {
            id: Uuid::new_v4(),
            orchestrator,
            store,
            active: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn store(&self) -> &Arc<TrackingStore> {
        &self.store
    }

    pub fn active(&self) -> Option<&Composition> {
        self.active.as_ref()
    }

    /// The last good blueprint set, or the built-in default set.
    pub fn alternatives_or_fallback(&self) -> Alternatives {
        self.active
            .as_ref()
            .map(|c| c.alternatives.clone())
            .unwrap_or_else(default_alternatives)
    }

    pub async fn submit(&mut self, requirements: &str, constraints: Map<String, Value>) -> Result<&Composition> {
        let requirements = requirements.trim();
        if requirements.is_empty() {
            return Err(StateError::EmptyRequirements.into());
        }

        let request = ComposeRequest {
            requirements: requirements.to_string(),
            constraints,
        };
        let response = self.orchestrator.compose(&request).await.map_err(|e| {
            warn!(session = %self.id, error = %e, "Compose failed, keeping previous blueprints");
            e
        })?;

        if response.blueprints.is_empty() {
            return Err(NetworkError::response(200, "Compose returned no alternatives", None).into());
        }

        match &response.composition_id {
            Some(id) => {
                let first = response.blueprints.alternatives[0].clone();
                self.store.record(LifecycleRecord::generated(id, requirements, first));
                info!(
                    session = %self.id,
                    composition_id = %id,
                    alternatives = response.blueprints.len(),
                    "Composition generated"
                );
            }
            None => warn!(session = %self.id, "Compose returned no composition id"),
        }

        let composition = self.active.insert(Composition {
            composition_id: response.composition_id,
            requirements: requirements.to_string(),
            alternatives: response.blueprints,
            selected: 0,
            status: Status::Generated,
        });
        Ok(composition)
    }

    /// Local selection of alternative `index`. No network call.
    pub fn select(&mut self, index: usize) -> Result<&Composition> {
        let composition = self.active.as_mut().ok_or(StateError::NoActiveComposition)?;
        let next = transition(composition.status, Event::Select)?;
        let count = composition.alternatives.len();
        let blueprint = composition
            .alternatives
            .get(index)
            .cloned()
            .ok_or(StateError::InvalidAlternative { index, count })?;

        composition.selected = index;
        composition.status = next;

        if let Some(id) = &composition.composition_id {
            if let Err(e) = self.store.update(id, |record| {
                record.selected_alternative = index;
                record.blueprint = blueprint;
            }) {
                warn!(session = %self.id, error = %e, "Selection not reflected in tracking store");
            }
        }
        debug!(session = %self.id, index, "Alternative selected");
        Ok(composition)
    }

    /// Confirms the selected alternative and records it as deployed. The
    /// record keeps a snapshot of the blueprint as confirmed.
    pub async fn confirm(&mut self, deployment_context: Value) -> Result<LifecycleRecord> {
        let composition = self.active.as_ref().ok_or(StateError::NoActiveComposition)?;
        let confirmed = transition(composition.status, Event::Confirm)?;
        let composition_id = composition
            .composition_id
            .clone()
            .ok_or(StateError::MissingCompositionId)?;
        let blueprint = composition
            .selected_blueprint()
            .cloned()
            .ok_or(StateError::InvalidAlternative {
                index: composition.selected,
                count: composition.alternatives.len(),
            })?;
        let deployed = transition(confirmed, Event::Deploy)?;

        let request = ConfirmRequest {
            confirmed_blueprint: blueprint.clone(),
            deployment_context: deployment_context.clone(),
            original_requirements: composition.requirements.clone(),
            selected_alternative: composition.selected,
            confirmed_at: chrono::Utc::now(),
        };

        let response = self
            .orchestrator
            .confirm(&composition_id, &request)
            .await
            .map_err(|e| {
                warn!(session = %self.id, composition_id = %composition_id, error = %e, "Confirm failed");
                e
            })?;

        if response.composition_id != composition_id {
            warn!(
                expected = %composition_id,
                received = %response.composition_id,
                "Ignoring confirmation for another composition"
            );
            return Err(NetworkError::response(200, "Confirmation answered for another composition", None).into());
        }

        let previous = self.store.get(&composition_id);
        let record = LifecycleRecord {
            composition_id: composition_id.clone(),
            status: deployed,
            selected_alternative: composition.selected,
            blueprint,
            deployment_context,
            original_requirements: composition.requirements.clone(),
            created_at: previous.as_ref().map(|r| r.created_at).unwrap_or_else(chrono::Utc::now),
            confirmed_at: None,
            recomposed_at: previous.as_ref().and_then(|r| r.recomposed_at),
            recomposed_from: previous.and_then(|r| r.recomposed_from),
            superseded_by: None,
        };
        let record = self.store.track(&composition_id, record);

        if let Some(active) = self.active.as_mut() {
            active.status = deployed;
        }
        info!(session = %self.id, composition_id = %composition_id, remote_status = %response.status, "Composition deployed");
        Ok(record)
    }

    /// Asks the orchestrator for the active composition's status and applies it.
    pub async fn refresh_status(&mut self) -> Result<RemoteStatus> {
        let composition_id = self
            .active
            .as_ref()
            .ok_or(StateError::NoActiveComposition)?
            .composition_id
            .clone()
            .ok_or(StateError::MissingCompositionId)?;

        let remote = self.orchestrator.status(&composition_id).await?;
        match &remote {
            RemoteStatus::Found(response) => match Status::from_remote(&response.status) {
                Some(status) => {
                    self.apply_remote_status(&composition_id, status)?;
                }
                None => debug!(status = %response.status, "Unrecognised remote status"),
            },
            RemoteStatus::NotFound => {
                debug!(composition_id = %composition_id, "Composition unknown to orchestrator");
            }
        }
        Ok(remote)
    }

    /// Applies a status learned out of band. Responses for any id other than
    /// the active one are stale and ignored; returns whether it was applied.
    pub fn apply_remote_status(&mut self, composition_id: &str, status: Status) -> Result<bool> {
        let Some(composition) = self.active.as_mut() else {
            return Ok(false);
        };
        if composition.composition_id.as_deref() != Some(composition_id) {
            debug!(composition_id, "Dropping stale status response");
            return Ok(false);
        }

        let event = match (composition.status, status) {
            (_, Status::Failed) => Event::Fail,
            (Status::Confirmed, Status::Deployed) => Event::Deploy,
            _ => return Ok(false),
        };
        let next = transition(composition.status, event)?;
        composition.status = next;
        if let Err(e) = self.store.update(composition_id, |record| record.status = next) {
            warn!(composition_id, error = %e, "Remote status not reflected in tracking store");
        }
        info!(composition_id, status = %next, "Applied remote status");
        Ok(true)
    }

    /// Requests a replacement for a deployed composition. The replacement is
    /// recorded as a sibling; the original stays deployed and points to it.
    pub async fn recompose(&mut self, trigger: RecompositionTrigger) -> Result<LifecycleRecord> {
        let original = self
            .store
            .get(&trigger.composition_id)
            .ok_or_else(|| StateError::UnknownComposition(trigger.composition_id.clone()))?;
        let next = transition(original.status, Event::Recompose)?;

        let response = self.orchestrator.recompose(&trigger).await.map_err(|e| {
            warn!(composition_id = %trigger.composition_id, error = %e, "Recompose failed");
            e
        })?;

        let new_id = &response.new_composition_id;
        if *new_id == original.composition_id || self.store.get(new_id).is_some() {
            warn!(
                original = %original.composition_id,
                received = %new_id,
                "Recompose answered with an id that is already tracked"
            );
            return Err(NetworkError::response(200, "Recompose returned an existing composition id", None).into());
        }

        let alternatives = response
            .blueprints
            .filter(|set| !set.is_empty())
            .unwrap_or_else(|| Alternatives {
                alternatives: vec![original.blueprint.clone()],
            });

        let now = chrono::Utc::now();
        let sibling = LifecycleRecord {
            composition_id: response.new_composition_id.clone(),
            status: next,
            selected_alternative: 0,
            blueprint: alternatives.alternatives[0].clone(),
            deployment_context: original.deployment_context.clone(),
            original_requirements: original.original_requirements.clone(),
            created_at: now,
            confirmed_at: None,
            recomposed_at: Some(now),
            recomposed_from: Some(original.composition_id.clone()),
            superseded_by: None,
        };
        self.store.record(sibling.clone());
        self.store
            .supersede(&original.composition_id, &response.new_composition_id)?;

        let is_active = self
            .active
            .as_ref()
            .is_some_and(|c| c.composition_id.as_deref() == Some(original.composition_id.as_str()));
        if is_active {
            self.active = Some(Composition {
                composition_id: Some(response.new_composition_id.clone()),
                requirements: original.original_requirements.clone(),
                alternatives,
                selected: 0,
                status: next,
            });
        }

        info!(
            original = %original.composition_id,
            new_composition_id = %response.new_composition_id,
            reasoning = response.recomposition_reasoning.as_deref().unwrap_or(""),
            "Composition recomposed"
        );
        Ok(sibling)
    }
}
