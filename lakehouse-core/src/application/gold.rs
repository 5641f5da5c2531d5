// lakehouse-core/src/application/gold.rs
//
// Silver Parquet -> Gold star schema for the tables selected by the dependency graph.

use std::path::Path;
use tracing::{debug, info, instrument, warn};

use crate::domain::gold::star::{
    build_facts, build_legal_basis_dimension, build_organization_dimension,
    build_policy_priority_dimension, build_project_dimension, build_topic_dimension,
};
use crate::domain::gold::{Dimension, DimensionSet, GoldTable};
use crate::domain::graph::dependencies::{DependencyGraph, GoldPlan};
use crate::domain::run::RunContext;
use crate::domain::silver::SilverSnapshot;
use crate::domain::table::{Record, TableData};
use crate::domain::SourceEntity;
use crate::error::LakehouseError;
use crate::infrastructure::adapters::parquet::{read_records, write_table};
use crate::infrastructure::fs::LakeLayout;

/// Reads one Silver entity, treating a missing file as an empty table.
fn silver_records<R: Record>(silver_dir: &Path, entity: SourceEntity) -> Result<Vec<R>, LakehouseError> {
    let path = silver_dir.join(entity.silver_file());
    if !path.exists() {
        warn!(entity = entity.name(), "Silver file missing, treated as empty");
        return Ok(Vec::new());
    }
    read_records(&path)
}

pub fn load_silver(silver_dir: &Path) -> Result<SilverSnapshot, LakehouseError> {
    Ok(SilverSnapshot {
        projects: silver_records(silver_dir, SourceEntity::Project)?,
        organizations: silver_records(silver_dir, SourceEntity::Organization)?,
        topics: silver_records(silver_dir, SourceEntity::Topic)?,
        priorities: silver_records(silver_dir, SourceEntity::PolicyPriority)?,
        legal_bases: silver_records(silver_dir, SourceEntity::LegalBasis)?,
        vocabulary: silver_records(silver_dir, SourceEntity::Vocabulary)?,
        web_items: silver_records(silver_dir, SourceEntity::WebItem)?,
        web_links: silver_records(silver_dir, SourceEntity::WebLink)?,
    })
}

/// One Gold table handed to the warehouse. `rebuilt` is false for a dimension read back
/// from the Gold zone.
#[derive(Debug, Clone)]
pub struct GoldOutput {
    pub table: GoldTable,
    pub data: TableData,
    pub rebuilt: bool,
}

/// Rebuilt from Silver when planned (or when its Gold file is gone), otherwise read back
/// so the fact table keeps pointing at the keys already published.
fn dimension<D: Record>(
    gold_dir: &Path,
    table: GoldTable,
    plan: &GoldPlan,
    outputs: &mut Vec<GoldOutput>,
    build: impl FnOnce() -> Dimension<D>,
    natural_key: impl Fn(&D) -> &str,
    surrogate_key: impl Fn(&D) -> i64,
) -> Result<Dimension<D>, LakehouseError> {
    let path = gold_dir.join(table.file_name());
    if !plan.contains(table) && path.exists() {
        debug!(table = %table, "Reusing published dimension");
        let rows: Vec<D> = read_records(&path)?;
        outputs.push(GoldOutput {
            table,
            data: TableData::from_records(&rows),
            rebuilt: false,
        });
        return Ok(Dimension::from_rows(rows, natural_key, surrogate_key));
    }
    if !plan.contains(table) {
        warn!(table = %table, "Dimension file missing, rebuilding from Silver");
    }
    let dim = build();
    let data = TableData::from_records(dim.rows());
    write_table(&path, &data)?;
    outputs.push(GoldOutput {
        table,
        data,
        rebuilt: true,
    });
    Ok(dim)
}

/// Builds the Gold tables of `plan` and returns the tables to load, in build order.
///
/// Whenever the fact table is written, every dimension it references is returned with it,
/// rebuilt or not, so the warehouse never pairs new fact keys with stale dimension rows
/// left behind by an earlier failed load.
pub fn build_gold(layout: &LakeLayout, plan: &GoldPlan) -> Result<Vec<GoldOutput>, LakehouseError> {
    let silver = load_silver(&layout.silver)?;
    let gold = layout.gold.as_path();
    let mut outputs: Vec<GoldOutput> = Vec::new();

    let dims = DimensionSet {
        projects: dimension(
            gold,
            GoldTable::DimProject,
            plan,
            &mut outputs,
            || build_project_dimension(&silver),
            |d| d.project_id.as_str(),
            |d| d.project_sk,
        )?,
        organizations: dimension(
            gold,
            GoldTable::DimOrganization,
            plan,
            &mut outputs,
            || build_organization_dimension(&silver),
            |d| d.organisation_id.as_str(),
            |d| d.organization_sk,
        )?,
        topics: dimension(
            gold,
            GoldTable::DimTopic,
            plan,
            &mut outputs,
            || build_topic_dimension(&silver),
            |d| d.code.as_str(),
            |d| d.sk,
        )?,
        priorities: dimension(
            gold,
            GoldTable::DimPolicyPriority,
            plan,
            &mut outputs,
            || build_policy_priority_dimension(&silver),
            |d| d.code.as_str(),
            |d| d.sk,
        )?,
        legal_bases: dimension(
            gold,
            GoldTable::DimLegalBasis,
            plan,
            &mut outputs,
            || build_legal_basis_dimension(&silver),
            |d| d.code.as_str(),
            |d| d.sk,
        )?,
    };

    if plan.contains(GoldTable::FactProjectFunding) || outputs.iter().any(|o| o.rebuilt) {
        let facts = TableData::from_records(&build_facts(&silver, &dims));
        write_table(&gold.join(GoldTable::FactProjectFunding.file_name()), &facts)?;
        outputs.push(GoldOutput {
            table: GoldTable::FactProjectFunding,
            data: facts,
            rebuilt: true,
        });
    } else {
        outputs.retain(|o| o.rebuilt);
    }
    Ok(outputs)
}

/// Plans the rebuild from the dirty entities, builds it on a blocking task and records
/// the row counts of the rebuilt tables. Returns the tables to reload into the warehouse.
#[instrument(skip_all, fields(run_id = %ctx.run_id))]
pub async fn run_gold(layout: &LakeLayout, ctx: &mut RunContext) -> Result<Vec<TableData>, LakehouseError> {
    let plan = DependencyGraph::star_schema().plan_for(ctx.dirty())?;
    if plan.is_empty() {
        info!("No Gold table affected");
        return Ok(Vec::new());
    }
    info!(layers = plan.layers.len(), tables = plan.tables().count(), "Gold plan ready");

    let layout = layout.clone();
    let built = tokio::task::spawn_blocking(move || build_gold(&layout, &plan))
        .await
        .map_err(|e| LakehouseError::InternalError(format!("gold task: {}", e)))??;

    let mut tables = Vec::with_capacity(built.len());
    for output in built {
        if output.rebuilt {
            info!(table = %output.table, rows = output.data.len(), "Gold table written");
            ctx.record_table(output.table, output.data.len());
        } else {
            debug!(table = %output.table, "Published dimension reloaded with the facts");
        }
        tables.push(output.data);
    }
    Ok(tables)
}
