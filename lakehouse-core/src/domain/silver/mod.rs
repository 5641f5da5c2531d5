// lakehouse-core/src/domain/silver/mod.rs

pub mod clean;
pub mod parse;
pub mod raw;
pub mod records;

pub use clean::Cleaned;
pub use raw::RawTable;
pub use records::*;

use crate::domain::entity::SourceEntity;
use crate::domain::table::{Record, TableData};

/// Cleaned rows of one entity, erased to cells for the zone writer.
#[derive(Debug, Clone)]
pub struct CleanedTable {
    pub entity: SourceEntity,
    pub table: TableData,
    pub read: usize,
    pub skipped: usize,
    pub duplicates: usize,
}

impl CleanedTable {
    fn from_cleaned<R: Record>(entity: SourceEntity, read: usize, cleaned: Cleaned<R>) -> Self {
        Self {
            entity,
            table: TableData::from_records(&cleaned.records),
            read,
            skipped: cleaned.skipped,
            duplicates: cleaned.duplicates,
        }
    }
}

/// Applies the cleaning rules of `entity` to its raw table.
pub fn clean_entity(entity: SourceEntity, raw: &RawTable) -> CleanedTable {
    let read = raw.rows.len() + raw.malformed;
    match entity {
        SourceEntity::Project => CleanedTable::from_cleaned(entity, read, clean::clean_projects(raw)),
        SourceEntity::Organization => {
            CleanedTable::from_cleaned(entity, read, clean::clean_organizations(raw))
        }
        SourceEntity::Topic => CleanedTable::from_cleaned(entity, read, clean::clean_topics(raw)),
        SourceEntity::PolicyPriority => {
            CleanedTable::from_cleaned(entity, read, clean::clean_policy_priorities(raw))
        }
        SourceEntity::LegalBasis => {
            CleanedTable::from_cleaned(entity, read, clean::clean_legal_bases(raw))
        }
        SourceEntity::Vocabulary => {
            CleanedTable::from_cleaned(entity, read, clean::clean_vocabulary(raw))
        }
        SourceEntity::WebItem => CleanedTable::from_cleaned(entity, read, clean::clean_web_items(raw)),
        SourceEntity::WebLink => CleanedTable::from_cleaned(entity, read, clean::clean_web_links(raw)),
    }
}

/// All Silver entities of one run, typed.
#[derive(Debug, Clone, Default)]
pub struct SilverSnapshot {
    pub projects: Vec<SilverProject>,
    pub organizations: Vec<SilverOrganization>,
    pub topics: Vec<SilverTopic>,
    pub priorities: Vec<SilverPolicyPriority>,
    pub legal_bases: Vec<SilverLegalBasis>,
    pub vocabulary: Vec<SilverVocabularyTerm>,
    pub web_items: Vec<SilverWebItem>,
    pub web_links: Vec<SilverWebLink>,
}
