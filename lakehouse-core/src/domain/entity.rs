// lakehouse-core/src/domain/entity.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// One Bronze source file and its Silver counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceEntity {
    Project,
    Organization,
    Topic,
    PolicyPriority,
    LegalBasis,
    Vocabulary,
    WebItem,
    WebLink,
}

impl SourceEntity {
    pub const ALL: [SourceEntity; 8] = [
        SourceEntity::Project,
        SourceEntity::Organization,
        SourceEntity::Topic,
        SourceEntity::PolicyPriority,
        SourceEntity::LegalBasis,
        SourceEntity::Vocabulary,
        SourceEntity::WebItem,
        SourceEntity::WebLink,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SourceEntity::Project => "project",
            SourceEntity::Organization => "organization",
            SourceEntity::Topic => "topic",
            SourceEntity::PolicyPriority => "policy_priority",
            SourceEntity::LegalBasis => "legal_basis",
            SourceEntity::Vocabulary => "vocabulary",
            SourceEntity::WebItem => "web_item",
            SourceEntity::WebLink => "web_link",
        }
    }

    /// File name inside the Bronze zone.
    pub fn bronze_file(&self) -> &'static str {
        match self {
            SourceEntity::Project => "project.csv",
            SourceEntity::Organization => "organization.csv",
            SourceEntity::Topic => "topics.csv",
            SourceEntity::PolicyPriority => "policyPriorities.csv",
            SourceEntity::LegalBasis => "legalBasis.csv",
            SourceEntity::Vocabulary => "euroSciVoc.csv",
            SourceEntity::WebItem => "webItem.csv",
            SourceEntity::WebLink => "webLink.csv",
        }
    }

    /// File name inside the Silver zone.
    pub fn silver_file(&self) -> &'static str {
        match self {
            SourceEntity::Project => "project.parquet",
            SourceEntity::Organization => "organization.parquet",
            SourceEntity::Topic => "topics.parquet",
            SourceEntity::PolicyPriority => "policyPriorities.parquet",
            SourceEntity::LegalBasis => "legalBasis.parquet",
            SourceEntity::Vocabulary => "euroSciVoc.parquet",
            SourceEntity::WebItem => "webItem.parquet",
            SourceEntity::WebLink => "webLink.parquet",
        }
    }

    /// Resolves a Bronze file name (case-insensitive, directories ignored).
    pub fn from_bronze_file(name: &str) -> Option<SourceEntity> {
        let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
        SourceEntity::ALL
            .into_iter()
            .find(|e| e.bronze_file().eq_ignore_ascii_case(base))
    }

    /// Resolves either an entity name (`web_item`) or a Bronze file name (`webItem.csv`).
    pub fn parse(value: &str) -> Option<SourceEntity> {
        let value = value.trim();
        SourceEntity::ALL
            .into_iter()
            .find(|e| e.name().eq_ignore_ascii_case(value))
            .or_else(|| SourceEntity::from_bronze_file(value))
    }
}

impl fmt::Display for SourceEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
