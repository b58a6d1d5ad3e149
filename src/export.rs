use anyhow::{Context as AnyhowContext, Result};
use std::fs;
use std::path::Path;

use crate::model::{Alternatives, Blueprint};

/// Pretty JSON for download or clipboard. Lossless: `from_json(to_json(b)) == b`.
pub fn to_json(blueprint: &Blueprint) -> serde_json::Result<String> {
    serde_json::to_string_pretty(blueprint)
}

pub fn from_json(json: &str) -> serde_json::Result<Blueprint> {
    serde_json::from_str(json)
}

pub fn save_blueprint(blueprint: &Blueprint, file_path: &Path) -> Result<()> {
    let json = to_json(blueprint)?;
    fs::write(file_path, json)
        .with_context(|| format!("Failed to write blueprint to {}", file_path.display()))
}

/// Reads either a single blueprint or an `{"alternatives": [...]}` set.
pub fn load_alternatives(file_path: &Path) -> Result<Alternatives> {
    let content = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read blueprint file from {}", file_path.display()))?;

    if let Ok(set) = serde_json::from_str::<Alternatives>(&content) {
        return Ok(set);
    }
    let blueprint = from_json(&content)
        .with_context(|| format!("Failed to deserialize blueprint from {}", file_path.display()))?;
    Ok(Alternatives {
        alternatives: vec![blueprint],
    })
}
