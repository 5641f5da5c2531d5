// lakehouse-core/src/ports/warehouse.rs

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::gold::GoldTable;
use crate::domain::table::TableData;
use crate::error::LakehouseError;

pub const DEFAULT_QUERY_LIMIT: usize = 50;
pub const MAX_QUERY_LIMIT: usize = 1000;

/// Filters of the project listing. `country` matches any participating organization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectFilter {
    pub country: Option<String>,
    pub year: Option<i64>,
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectRow {
    pub project_id: String,
    pub acronym: Option<String>,
    pub title: Option<String>,
    pub country: Option<String>,
    pub year: Option<i64>,
    pub framework_programme: Option<String>,
    pub total_funding: Option<f64>,
    pub organizations: i64,
    /// Distinct participant countries, comma separated and sorted.
    pub participant_countries: Option<String>,
}

/// Fact row joined back to its natural keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactRow {
    pub project_id: String,
    pub year: Option<i64>,
    pub organisation_id: Option<String>,
    pub organization_country: Option<String>,
    pub topic_code: Option<String>,
    pub priority_code: Option<String>,
    pub legal_basis_code: Option<String>,
    pub funding_amount: Option<f64>,
    pub duration_days: Option<i64>,
}

#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Creates every listed table that does not exist yet.
    async fn ensure_tables(&self, tables: &[GoldTable]) -> Result<(), LakehouseError>;

    /// Replaces the content of all given tables at once; on failure nothing changes.
    async fn replace_tables(&self, tables: &[TableData]) -> Result<(), LakehouseError>;

    async fn query_projects(&self, filter: &ProjectFilter)
    -> Result<Vec<ProjectRow>, LakehouseError>;

    async fn query_facts(&self, filter: &ProjectFilter) -> Result<Vec<FactRow>, LakehouseError>;

    async fn count_rows(&self, table: &str) -> Result<u64, LakehouseError>;

    fn engine_name(&self) -> &str;
}
