use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    PerformanceDegradation,
    ServiceFailure,
    Manual,
}

/// Objective measurements from a degraded run compared with its baseline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DegradationEvidence {
    pub current_task_completion_time: f64,
    pub baseline_task_completion_time: f64,
    pub current_error_count: u32,
    pub baseline_error_count: u32,
    pub current_intervention_count: u32,
    pub baseline_intervention_count: u32,
    pub completion_time_z_score: f64,
    pub error_count_z_score: f64,
    pub intervention_z_score: f64,
    pub overall_severity: f64,
}

impl DegradationEvidence {
    pub fn to_value(&self) -> Value {
        json!({
            "current_task_completion_time": self.current_task_completion_time,
            "baseline_task_completion_time": self.baseline_task_completion_time,
            "current_error_count": self.current_error_count,
            "baseline_error_count": self.baseline_error_count,
            "current_intervention_count": self.current_intervention_count,
            "baseline_intervention_count": self.baseline_intervention_count,
            "severity_scores": {
                "completion_time_z_score": self.completion_time_z_score,
                "error_count_z_score": self.error_count_z_score,
                "intervention_z_score": self.intervention_z_score,
                "overall_severity": self.overall_severity,
            }
        })
    }
}

/// Payload of the recompose call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecompositionTrigger {
    pub composition_id: String,
    pub trigger_type: TriggerType,
    pub failure_evidence: Value,
    pub failure_analysis: String,
    pub timestamp: DateTime<Utc>,
}

impl RecompositionTrigger {
    pub fn new(composition_id: &str, trigger_type: TriggerType, failure_evidence: Value, failure_analysis: &str) -> Self {
        Self {
            composition_id: composition_id.to_string(),
            trigger_type,
            failure_evidence,
            failure_analysis: failure_analysis.to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn degradation(composition_id: &str, evidence: &DegradationEvidence, failure_analysis: &str) -> Self {
        Self::new(
            composition_id,
            TriggerType::PerformanceDegradation,
            evidence.to_value(),
            failure_analysis,
        )
    }
}
