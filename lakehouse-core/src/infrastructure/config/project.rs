// lakehouse-core/src/infrastructure/config/project.rs

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::domain::project::LakehouseConfig;
use crate::infrastructure::error::InfrastructureError;

const CONFIG_CANDIDATES: [&str; 2] = ["lakehouse.yaml", "lakehouse.yml"];

#[instrument(skip(project_dir))]
pub fn load_lakehouse_config(project_dir: &Path) -> Result<LakehouseConfig, InfrastructureError> {
    let config_path = find_main_config(project_dir)?;
    info!(path = ?config_path, "Loading lakehouse configuration");

    let content = fs::read_to_string(&config_path)?;
    let mut config: LakehouseConfig = serde_yaml::from_str(&content)?;

    // Env wins over the file: LAKEHOUSE_DATA_DIR=/tmp/lake lakehouse run
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    config
        .validate()
        .map_err(|e| InfrastructureError::ConfigError(e.to_string()))?;

    Ok(config)
}

fn find_main_config(root: &Path) -> Result<PathBuf, InfrastructureError> {
    for filename in CONFIG_CANDIDATES {
        let p = root.join(filename);
        if p.exists() {
            return Ok(p);
        }
    }
    Err(InfrastructureError::ConfigNotFound(format!(
        "No configuration file found in {:?}. Checked: {:?}",
        root, CONFIG_CANDIDATES
    )))
}

/// Layers environment variables over the file configuration.
///
/// `lookup` is injected so tests do not have to mutate the process environment.
pub fn apply_env_overrides(config: &mut LakehouseConfig, lookup: impl Fn(&str) -> Option<String>) {
    let text = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(val) = text("LAKEHOUSE_DATA_DIR") {
        info!(old = ?config.data_dir, new = ?val, "Overriding data dir via ENV");
        config.data_dir = val;
    }
    if let Some(val) = text("BRONZE_DIR") {
        config.bronze_dir = Some(val);
    }
    if let Some(val) = text("SILVER_DIR") {
        config.silver_dir = Some(val);
    }
    if let Some(val) = text("GOLD_DIR") {
        config.gold_dir = Some(val);
    }
    if let Some(val) = text("LAKEHOUSE_STRICT") {
        match parse_flag(&val) {
            Some(flag) => config.strict_inputs = flag,
            None => warn!(value = %val, "Ignoring LAKEHOUSE_STRICT, expected a boolean"),
        }
    }
    if let Some(val) = text("WAREHOUSE_PATH") {
        info!(old = ?config.warehouse.path, new = ?val, "Overriding warehouse path via ENV");
        config.warehouse.path = val;
    }
    if let Some(val) = text("TYPESENSE_URL") {
        config.search.url = val;
    }
    if let Some(val) = text("TYPESENSE_API_KEY") {
        config.search.api_key = Some(val);
    }
    if let Some(val) = text("TYPESENSE_COLLECTION") {
        config.search.collection = val;
    }
    if let Some(val) = text("EMBEDDINGS_URL") {
        config.embeddings.url = Some(val);
    }
    if let Some(val) = text("EMBEDDINGS_API_KEY") {
        config.embeddings.api_key = Some(val);
    }
    if let Some(val) = text("BASIC_AUTH_USER") {
        config.api.username = Some(val);
    }
    if let Some(val) = lookup("BASIC_AUTH_PASS").filter(|v| !v.is_empty()) {
        config.api.password = Some(val);
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
