use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

use invoice_fee_core::FeePolicy;

/// Read a JSON file and deserialise into a typed struct.
pub fn read_json<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    let value: T = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?;
    Ok(value)
}

/// Load a fee policy from a YAML or JSON file; no file means the house policy.
pub fn read_policy(path: Option<&str>) -> Result<FeePolicy, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(FeePolicy::default());
    };
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    // YAML is a superset of JSON, so one parser covers both formats.
    let policy: FeePolicy = serde_yaml::from_str(&contents)
        .map_err(|e| format!("Failed to parse policy '{}': {}", canonical.display(), e))?;
    policy.validate()?;
    Ok(policy)
}

fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()).into());
    }

    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }

    Ok(canonical)
}
