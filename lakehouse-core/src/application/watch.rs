// lakehouse-core/src/application/watch.rs
//
// Polling trigger: compares Bronze modification times with the last successful run and
// starts a selective pipeline for the entities whose files changed.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

use crate::application::pipeline::run_pipeline;
use crate::application::services::LakehouseServices;
use crate::domain::entity::SourceEntity;
use crate::domain::run::{RunContext, RunReport};
use crate::error::LakehouseError;
use crate::infrastructure::fs::{load_json, save_json};

/// File name -> modification time in milliseconds since the epoch.
pub type MtimeState = BTreeMap<String, i64>;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChangeSet {
    /// New, modified or deleted Bronze files.
    pub files: Vec<String>,
    pub entities: BTreeSet<SourceEntity>,
    /// State to commit once the triggered run succeeded.
    pub snapshot: MtimeState,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

pub struct ChangeDetector {
    bronze_dir: PathBuf,
    state_path: PathBuf,
}

impl ChangeDetector {
    pub fn new(bronze_dir: impl Into<PathBuf>, state_dir: &Path) -> Self {
        Self {
            bronze_dir: bronze_dir.into(),
            state_path: state_dir.join("bronze_mtimes.json"),
        }
    }

    /// Forgets the recorded modification times so the next poll treats every Bronze file
    /// as new. Returns whether a state file was removed.
    pub fn reset(&self) -> Result<bool, LakehouseError> {
        if !self.state_path.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.state_path)?;
        Ok(true)
    }

    pub fn scan(&self) -> Result<MtimeState, LakehouseError> {
        let mut state = MtimeState::new();
        if !self.bronze_dir.exists() {
            return Ok(state);
        }
        for entry in fs::read_dir(&self.bronze_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !entry.file_type()?.is_file() || !name.to_ascii_lowercase().ends_with(".csv") {
                continue;
            }
            let modified: DateTime<Utc> = entry.metadata()?.modified()?.into();
            state.insert(name, modified.timestamp_millis());
        }
        Ok(state)
    }

    pub fn last_state(&self) -> Result<MtimeState, LakehouseError> {
        Ok(load_json(&self.state_path)?.unwrap_or_default())
    }

    /// With `force`, every entity is reported whatever the recorded state says.
    pub fn detect(&self, force: bool) -> Result<ChangeSet, LakehouseError> {
        let current = self.scan()?;
        let previous = self.last_state()?;

        let mut files: Vec<String> = current
            .iter()
            .filter(|(name, mtime)| previous.get(*name) != Some(*mtime))
            .map(|(name, _)| name.clone())
            .collect();
        // Deleted files change their entity too
        files.extend(previous.keys().filter(|name| !current.contains_key(*name)).cloned());
        files.sort();

        let entities = if force {
            SourceEntity::ALL.into_iter().collect()
        } else {
            entities_for(&files)
        };

        Ok(ChangeSet {
            files,
            entities,
            snapshot: current,
        })
    }

    pub fn commit(&self, snapshot: &MtimeState) -> Result<(), LakehouseError> {
        save_json(&self.state_path, snapshot)?;
        Ok(())
    }
}

/// Maps Bronze file names to entities. Unknown names are ignored with a warning.
pub fn entities_for(files: &[String]) -> BTreeSet<SourceEntity> {
    files
        .iter()
        .filter_map(|name| {
            let entity = SourceEntity::from_bronze_file(name);
            if entity.is_none() {
                warn!(file = %name, "Unknown Bronze file ignored");
            }
            entity
        })
        .collect()
}

/// One detection cycle. The new state is committed only after a successful run.
#[instrument(skip(services))]
pub async fn poll_once(
    services: &LakehouseServices,
    force: bool,
    index: bool,
) -> Result<Option<RunReport>, LakehouseError> {
    let detector = ChangeDetector::new(&services.layout.bronze, &services.layout.state);
    let changes = detector.detect(force)?;

    if changes.is_empty() {
        debug!(files = changes.files.len(), "No entity changed");
        // Unknown files must not be reported again on every poll
        if !changes.files.is_empty() {
            detector.commit(&changes.snapshot)?;
        }
        return Ok(None);
    }

    info!(files = ?changes.files, entities = changes.entities.len(), "Bronze changes detected");
    let ctx = if force {
        RunContext::full(services.config.strict_inputs)
    } else {
        RunContext::selective(changes.entities.iter().copied(), services.config.strict_inputs)
    };
    let report = run_pipeline(services, ctx, index).await?;
    detector.commit(&changes.snapshot)?;
    Ok(Some(report))
}

/// Polls until `once` is satisfied or forever. Failed runs are retried on the next tick
/// since their state was never committed.
pub async fn watch(
    services: &LakehouseServices,
    interval: Duration,
    force: bool,
    once: bool,
    index: bool,
) -> Result<Option<RunReport>, LakehouseError> {
    let mut force = force;
    loop {
        match poll_once(services, force, index).await {
            Ok(report) if once => return Ok(report),
            Err(e) if once => return Err(e),
            Ok(Some(report)) => {
                println!("🔄 Run {} finished (success: {})", report.run_id, report.success);
            }
            Ok(None) => {}
            Err(e) => error!(error = %e, "Triggered run failed, will retry"),
        }
        force = false;
        tokio::time::sleep(interval).await;
    }
}
