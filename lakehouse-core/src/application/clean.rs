// lakehouse-core/src/application/clean.rs

use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::info;

use crate::application::watch::ChangeDetector;
use crate::domain::project::LakehouseConfig;
use crate::error::LakehouseError;
use crate::infrastructure::config::load_lakehouse_config;
use crate::infrastructure::fs::LakeLayout;

fn remove_path(path: &Path) -> Result<bool, LakehouseError> {
    if !path.exists() {
        return Ok(false);
    }
    if path.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    println!("   🗑️  Removed: {}", path.display());
    Ok(true)
}

/// Extra targets stay inside the project directory.
fn extra_target(project_dir: &Path, target: &str) -> Result<PathBuf, LakehouseError> {
    let relative = Path::new(target);
    if relative.is_absolute()
        || relative
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
    {
        return Err(LakehouseError::UnsafePath(target.to_string()));
    }
    Ok(project_dir.join(relative))
}

/// Removes the Silver, Gold and runs zones as resolved for `config` (zone overrides
/// included), then the extra `clean-targets`. Bronze, the warehouse file and the embedding
/// cache are kept. The watcher state is reset so the next poll rebuilds everything.
pub fn clean_layout(
    project_dir: &Path,
    config: &LakehouseConfig,
) -> Result<Vec<PathBuf>, LakehouseError> {
    let layout = LakeLayout::resolve(project_dir, config);
    let mut targets = vec![layout.silver.clone(), layout.gold.clone(), layout.runs.clone()];
    for target in &config.clean_targets {
        targets.push(extra_target(project_dir, target)?);
    }

    // Bronze is never removed, even through an overlapping override
    if let Some(target) = targets.iter().find(|t| layout.bronze.starts_with(t)) {
        return Err(LakehouseError::UnsafePath(target.display().to_string()));
    }

    let mut removed = Vec::new();
    for target in targets {
        if remove_path(&target)? {
            removed.push(target);
        }
    }

    if ChangeDetector::new(&layout.bronze, &layout.state).reset()? {
        info!("Watcher state reset");
    }
    Ok(removed)
}

pub fn clean_project(project_dir: &Path) -> Result<Vec<PathBuf>, LakehouseError> {
    info!("🧹 Cleaning derived lakehouse zones...");
    let config = load_lakehouse_config(project_dir)?;
    clean_layout(project_dir, &config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn test_removes_derived_zones_only() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("lakehouse.yaml"), "name: demo\n")?;
        for zone in ["bronze", "silver", "gold", "runs", "state"] {
            fs::create_dir_all(dir.path().join("lake").join(zone))?;
        }
        fs::write(dir.path().join("lake/state/embedding_cache.json"), "{}")?;

        let removed = clean_project(dir.path())?;

        let lake = dir.path().join("lake");
        assert_eq!(removed, vec![lake.join("silver"), lake.join("gold"), lake.join("runs")]);
        assert!(lake.join("bronze").exists());
        assert!(lake.join("state/embedding_cache.json").exists());
        Ok(())
    }

    #[test]
    fn test_zone_overrides_are_followed_and_watcher_state_reset() -> Result<()> {
        let dir = tempdir()?;
        let config: LakehouseConfig = serde_yaml::from_str(
            "name: demo\ndata-dir: data\ngold-dir: published/gold\nclean-targets: [\"tmp\"]\n",
        )?;
        let layout = LakeLayout::resolve(dir.path(), &config);
        layout.ensure_dirs()?;
        fs::create_dir_all(dir.path().join("tmp"))?;
        fs::create_dir_all(dir.path().join("lake/gold"))?;
        fs::write(layout.bronze.join("project.csv"), "id\n1\n")?;

        let detector = ChangeDetector::new(&layout.bronze, &layout.state);
        let seen = detector.detect(false)?;
        detector.commit(&seen.snapshot)?;
        assert!(detector.detect(false)?.is_empty());

        let removed = clean_layout(dir.path(), &config)?;

        assert!(removed.contains(&dir.path().join("published/gold")));
        assert!(removed.contains(&dir.path().join("data/silver")));
        assert!(!dir.path().join("tmp").exists());
        // Paths of the default layout are not this project's zones
        assert!(dir.path().join("lake/gold").exists());
        assert!(layout.bronze.join("project.csv").exists());
        // The next poll sees the Bronze files again
        assert_eq!(detector.detect(false)?.files, vec!["project.csv"]);
        Ok(())
    }

    #[test]
    fn test_rejects_escaping_targets() -> Result<()> {
        let dir = tempdir()?;
        fs::write(
            dir.path().join("lakehouse.yaml"),
            "name: demo\nclean-targets: [\"../outside\"]\n",
        )?;

        let err = clean_project(dir.path()).unwrap_err();
        assert!(matches!(err, LakehouseError::UnsafePath(_)));

        // A target enclosing Bronze is refused before anything is deleted
        fs::write(
            dir.path().join("lakehouse.yaml"),
            "name: demo\nclean-targets: [\"lake\"]\n",
        )?;
        fs::create_dir_all(dir.path().join("lake/silver"))?;
        let err = clean_project(dir.path()).unwrap_err();
        assert!(matches!(err, LakehouseError::UnsafePath(_)));
        assert!(dir.path().join("lake/silver").exists());
        Ok(())
    }
}
