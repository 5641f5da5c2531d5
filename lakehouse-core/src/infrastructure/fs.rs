// lakehouse-core/src/infrastructure/fs.rs

use serde::{Serialize, de::DeserializeOwned};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::project::LakehouseConfig;
use crate::infrastructure::error::InfrastructureError;

/// Write content to a file atomically using a temporary file in the same directory.
///
/// Readers see either the previous content or the new one, never a partial file.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let parent = path.parent().unwrap_or_else(|| Path::new("."));

    let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
    temp_file.write_all(content.as_ref())?;
    temp_file.as_file().sync_all()?;

    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;

    Ok(())
}

pub fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<(), InfrastructureError> {
    let content = serde_json::to_string_pretty(data)?;
    atomic_write(path, content)
}

/// `Ok(None)` when the file does not exist yet.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, InfrastructureError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&content)?))
}

/// Resolved zone directories of one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LakeLayout {
    pub project_dir: PathBuf,
    pub data: PathBuf,
    pub bronze: PathBuf,
    pub silver: PathBuf,
    pub gold: PathBuf,
    pub runs: PathBuf,
    pub state: PathBuf,
}

impl LakeLayout {
    pub fn resolve(project_dir: &Path, config: &LakehouseConfig) -> Self {
        let data = absolutize(project_dir, &config.data_dir);
        let zone = |custom: &Option<String>, default: &str| {
            custom
                .as_deref()
                .map(|dir| absolutize(project_dir, dir))
                .unwrap_or_else(|| data.join(default))
        };
        Self {
            project_dir: project_dir.to_path_buf(),
            bronze: zone(&config.bronze_dir, "bronze"),
            silver: zone(&config.silver_dir, "silver"),
            gold: zone(&config.gold_dir, "gold"),
            runs: data.join("runs"),
            state: data.join("state"),
            data,
        }
    }

    /// Creates every zone directory. Safe to call repeatedly.
    pub fn ensure_dirs(&self) -> Result<(), InfrastructureError> {
        for dir in [
            &self.bronze,
            &self.silver,
            &self.gold,
            &self.runs,
            &self.state,
        ] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    pub fn last_run_path(&self) -> PathBuf {
        self.runs.join("last_run.json")
    }

    pub fn run_report_path(&self, run_id: &str) -> PathBuf {
        self.runs.join(format!("{}.json", run_id))
    }
}

pub fn absolutize(base: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write_replaces_content() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("report.json");

        atomic_write(&file_path, "first")?;
        atomic_write(&file_path, "second")?;

        assert_eq!(fs::read_to_string(&file_path)?, "second");
        let leftovers = fs::read_dir(dir.path())?.count();
        assert_eq!(leftovers, 1, "temporary files must not survive");
        Ok(())
    }

    #[test]
    fn test_layout_defaults_and_overrides() -> Result<()> {
        let mut config: LakehouseConfig = serde_yaml::from_str("name: cordis\n")?;
        let root = Path::new("/srv/cordis");

        let layout = LakeLayout::resolve(root, &config);
        assert_eq!(layout.bronze, root.join("lake/bronze"));
        assert_eq!(layout.runs, root.join("lake/runs"));

        config.gold_dir = Some("/mnt/gold".into());
        let layout = LakeLayout::resolve(root, &config);
        assert_eq!(layout.gold, PathBuf::from("/mnt/gold"));
        assert_eq!(layout.silver, root.join("lake/silver"));
        Ok(())
    }

    #[test]
    fn test_ensure_dirs_is_idempotent() -> Result<()> {
        let dir = tempdir()?;
        let config: LakehouseConfig = serde_yaml::from_str("name: cordis\n")?;
        let layout = LakeLayout::resolve(dir.path(), &config);

        layout.ensure_dirs()?;
        layout.ensure_dirs()?;

        assert!(layout.state.is_dir());
        assert!(layout.gold.is_dir());
        Ok(())
    }

    #[test]
    fn test_load_json_missing_file_is_none() -> Result<()> {
        let dir = tempdir()?;
        let loaded: Option<Vec<u32>> = load_json(&dir.path().join("absent.json"))?;
        assert!(loaded.is_none());

        save_json(&dir.path().join("present.json"), &vec![1u32, 2])?;
        let loaded: Option<Vec<u32>> = load_json(&dir.path().join("present.json"))?;
        assert_eq!(loaded, Some(vec![1, 2]));
        Ok(())
    }
}
