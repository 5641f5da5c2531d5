// lakehouse-core/src/application/bronze.rs
//
// Raw file management for the Bronze zone, shared by the API and the CLI.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{info, instrument};

use crate::domain::error::DomainError;
use crate::error::LakehouseError;
use crate::infrastructure::fs::atomic_write;

static RAW_FILE_NAME: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z0-9][a-z0-9._-]*\.csv$"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawFileInfo {
    pub path: String,
    pub bytes: u64,
    pub modified_utc: String,
}

pub struct BronzeStore {
    dir: PathBuf,
    max_bytes: usize,
}

/// Plain `*.csv` basename: no separators, no leading dot.
pub fn validate_file_name(name: &str) -> Result<(), DomainError> {
    check_name(RAW_FILE_NAME.as_ref(), name)
}

fn check_name(pattern: Result<&Regex, &regex::Error>, name: &str) -> Result<(), DomainError> {
    let pattern = pattern.map_err(|e| DomainError::InvalidPattern(e.to_string()))?;
    if pattern.is_match(name) {
        Ok(())
    } else {
        Err(DomainError::InvalidFileName(name.to_string()))
    }
}

impl BronzeStore {
    pub fn new(dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            max_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    fn path_of(&self, name: &str) -> Result<PathBuf, LakehouseError> {
        validate_file_name(name)?;
        Ok(self.dir.join(name))
    }

    pub fn list(&self) -> Result<Vec<RawFileInfo>, LakehouseError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !entry.file_type()?.is_file() || validate_file_name(&name).is_err() {
                continue;
            }
            let meta = entry.metadata()?;
            let modified: DateTime<Utc> = meta.modified()?.into();
            files.push(RawFileInfo {
                path: name,
                bytes: meta.len(),
                modified_utc: modified.to_rfc3339(),
            });
        }
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }

    pub fn read(&self, name: &str) -> Result<Vec<u8>, LakehouseError> {
        let path = self.path_of(name)?;
        if !path.is_file() {
            return Err(LakehouseError::NotFound(name.to_string()));
        }
        Ok(fs::read(path)?)
    }

    /// Creates or replaces `name`. Readers never observe a half-written file.
    #[instrument(skip(self, content), fields(bytes = content.len()))]
    pub fn write(&self, name: &str, content: &[u8]) -> Result<RawFileInfo, LakehouseError> {
        let path = self.path_of(name)?;
        if content.len() > self.max_bytes {
            return Err(LakehouseError::PayloadTooLarge {
                size: content.len(),
                limit: self.max_bytes,
            });
        }
        fs::create_dir_all(&self.dir)?;
        atomic_write(&path, content)?;
        info!(file = name, "Raw file stored");
        Ok(RawFileInfo {
            path: name.to_string(),
            bytes: content.len() as u64,
            modified_utc: Utc::now().to_rfc3339(),
        })
    }

    pub fn delete(&self, name: &str) -> Result<(), LakehouseError> {
        let path = self.path_of(name)?;
        if !path.is_file() {
            return Err(LakehouseError::NotFound(name.to_string()));
        }
        fs::remove_file(&path)?;
        info!(file = name, "Raw file deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn test_file_name_rules() {
        assert!(validate_file_name("project.csv").is_ok());
        assert!(validate_file_name("legalBasis.CSV").is_ok());
        assert!(validate_file_name("web_link-2024.csv").is_ok());

        assert!(validate_file_name("../project.csv").is_err());
        assert!(validate_file_name(".hidden.csv").is_err());
        assert!(validate_file_name("dir/project.csv").is_err());
        assert!(validate_file_name("project.parquet").is_err());
        assert!(validate_file_name("").is_err());
    }

    #[test]
    fn test_broken_name_pattern_is_an_error() {
        let broken = Regex::new("([a-z");
        let err = check_name(broken.as_ref(), "project.csv").unwrap_err();
        assert!(matches!(err, DomainError::InvalidPattern(_)));
    }

    #[test]
    fn test_write_list_read_delete() -> Result<()> {
        let dir = tempdir()?;
        let store = BronzeStore::new(dir.path(), 1024);

        store.write("topics.csv", b"projectID;topic\n1;T\n")?;
        std::fs::write(dir.path().join("notes.txt"), "ignored")?;

        let files = store.list()?;
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "topics.csv");
        assert_eq!(files[0].bytes, 20);
        assert_eq!(store.read("topics.csv")?, b"projectID;topic\n1;T\n");

        store.delete("topics.csv")?;
        assert!(store.list()?.is_empty());
        assert!(matches!(
            store.read("topics.csv"),
            Err(LakehouseError::NotFound(_))
        ));
        Ok(())
    }

    #[test]
    fn test_oversized_payload_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        let store = BronzeStore::new(dir.path(), 4);

        let err = store.write("project.csv", b"too long").unwrap_err();

        assert!(matches!(
            err,
            LakehouseError::PayloadTooLarge { size: 8, limit: 4 }
        ));
        assert!(!dir.path().join("project.csv").exists());
        Ok(())
    }

    #[test]
    fn test_traversal_name_never_touches_disk() -> Result<()> {
        let dir = tempdir()?;
        let store = BronzeStore::new(dir.path().join("bronze"), 1024);

        assert!(matches!(
            store.write("../escape.csv", b"x"),
            Err(LakehouseError::Domain(DomainError::InvalidFileName(_)))
        ));
        assert!(!dir.path().join("escape.csv").exists());
        Ok(())
    }
}
