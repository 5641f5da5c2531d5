// lakehouse-core/src/domain/gold/mod.rs

pub mod dimension;
pub mod model;
pub mod star;

pub use dimension::Dimension;
pub use model::*;
pub use star::DimensionSet;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::entity::SourceEntity;
use crate::domain::table::{ColumnDef, Record};

/// Tables of the Gold zone, in build order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoldTable {
    DimProject,
    DimOrganization,
    DimTopic,
    DimPolicyPriority,
    DimLegalBasis,
    FactProjectFunding,
}

impl GoldTable {
    pub const ALL: [GoldTable; 6] = [
        GoldTable::DimProject,
        GoldTable::DimOrganization,
        GoldTable::DimTopic,
        GoldTable::DimPolicyPriority,
        GoldTable::DimLegalBasis,
        GoldTable::FactProjectFunding,
    ];

    pub fn table_name(&self) -> &'static str {
        match self {
            GoldTable::DimProject => ProjectDim::TABLE,
            GoldTable::DimOrganization => OrganizationDim::TABLE,
            GoldTable::DimTopic => TopicDim::TABLE,
            GoldTable::DimPolicyPriority => PolicyPriorityDim::TABLE,
            GoldTable::DimLegalBasis => LegalBasisDim::TABLE,
            GoldTable::FactProjectFunding => FundingFact::TABLE,
        }
    }

    pub fn columns(&self) -> &'static [ColumnDef] {
        match self {
            GoldTable::DimProject => ProjectDim::COLUMNS,
            GoldTable::DimOrganization => OrganizationDim::COLUMNS,
            GoldTable::DimTopic => TopicDim::COLUMNS,
            GoldTable::DimPolicyPriority => PolicyPriorityDim::COLUMNS,
            GoldTable::DimLegalBasis => LegalBasisDim::COLUMNS,
            GoldTable::FactProjectFunding => FundingFact::COLUMNS,
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.parquet", self.table_name())
    }

    /// Silver entities read directly by this table's build.
    pub fn source_inputs(&self) -> &'static [SourceEntity] {
        match self {
            GoldTable::DimProject => &[
                SourceEntity::Project,
                SourceEntity::Organization,
                SourceEntity::Vocabulary,
            ],
            GoldTable::DimOrganization => &[SourceEntity::Organization],
            GoldTable::DimTopic => &[SourceEntity::Topic],
            GoldTable::DimPolicyPriority => &[SourceEntity::PolicyPriority],
            GoldTable::DimLegalBasis => &[SourceEntity::LegalBasis],
            GoldTable::FactProjectFunding => &SourceEntity::ALL,
        }
    }

    /// Gold tables whose keys this table references.
    pub fn table_inputs(&self) -> &'static [GoldTable] {
        match self {
            GoldTable::FactProjectFunding => &[
                GoldTable::DimProject,
                GoldTable::DimOrganization,
                GoldTable::DimTopic,
                GoldTable::DimPolicyPriority,
                GoldTable::DimLegalBasis,
            ],
            _ => &[],
        }
    }
}

impl fmt::Display for GoldTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}
