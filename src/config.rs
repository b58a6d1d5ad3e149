use anyhow::{Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::graph::LayoutConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorSettings {
    pub base_url: String,
    /// Applies to every collaborator call; sized for worst-case generation.
    pub timeout_secs: u64,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 200,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub orchestrator: OrchestratorSettings,
    pub layout: LayoutConfig,
}

pub fn load_settings(file_path: &Path) -> Result<Settings> {
    let yaml_content = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read settings file from {}", file_path.display()))?;

    let settings: Settings = serde_yaml::from_str(&yaml_content)
        .with_context(|| format!("Failed to deserialize settings from {}", file_path.display()))?;

    Ok(settings)
}
