// lakehouse-core/src/application/pipeline.rs
//
// Silver -> Gold -> Warehouse -> (optional) SearchIndex, fail-fast.

use std::time::Instant;
use tracing::{error, info, instrument};

use crate::application::gold::run_gold;
use crate::application::indexing::{IndexSettings, index_projects};
use crate::application::services::LakehouseServices;
use crate::application::silver::run_silver;
use crate::application::warehouse::load_warehouse;
use crate::domain::gold::GoldTable;
use crate::domain::run::{RunContext, RunReport, Stage, StageReport, StageStatus};
use crate::error::LakehouseError;
use crate::infrastructure::fs::{LakeLayout, load_json, save_json};

fn stage_report(
    stage: Stage,
    status: StageStatus,
    started: Instant,
    detail: impl Into<String>,
) -> StageReport {
    StageReport {
        stage,
        status,
        duration_ms: started.elapsed().as_millis(),
        detail: detail.into(),
    }
}

fn persist_report(layout: &LakeLayout, report: &RunReport) -> Result<(), LakehouseError> {
    save_json(&layout.run_report_path(&report.run_id), report)?;
    save_json(&layout.last_run_path(), report)?;
    Ok(())
}

/// Records the outcome of one stage. A failure is persisted before it is returned so
/// the last report always names the failed stage.
fn settle<T>(
    layout: &LakeLayout,
    ctx: &mut RunContext,
    stage: Stage,
    started: Instant,
    result: Result<(T, StageStatus, String), LakehouseError>,
) -> Result<T, LakehouseError> {
    match result {
        Ok((value, status, detail)) => {
            println!("   ✅ {} ({})", stage, detail);
            ctx.record_stage(stage_report(stage, status, started, detail));
            Ok(value)
        }
        Err(e) => {
            error!(stage = %stage, error = %e, "Stage failed");
            println!("   ❌ {} failed: {}", stage, e);
            ctx.record_stage(stage_report(stage, StageStatus::Failed, started, e.to_string()));
            let report = ctx.report();
            if let Err(persist) = persist_report(layout, &report) {
                error!(error = %persist, "Could not persist the failed run report");
            }
            Err(LakehouseError::StageFailed {
                stage,
                run_id: report.run_id,
                source: Box::new(e),
            })
        }
    }
}

fn skip(ctx: &mut RunContext, stage: Stage, detail: &str) {
    println!("   ⏭️  {} skipped: {}", stage, detail);
    ctx.record_stage(StageReport {
        stage,
        status: StageStatus::Skipped,
        duration_ms: 0,
        detail: detail.to_string(),
    });
}

/// Runs one pipeline to completion. Runs of the same services never overlap.
#[instrument(skip_all, fields(run_id = %ctx.run_id, index))]
pub async fn run_pipeline(
    services: &LakehouseServices,
    mut ctx: RunContext,
    index: bool,
) -> Result<RunReport, LakehouseError> {
    let _guard = services.run_lock.lock().await;
    let layout = &services.layout;

    if ctx.dirty().is_empty() {
        info!("Empty change set, nothing to run");
        for stage in [Stage::Silver, Stage::Gold, Stage::Warehouse, Stage::SearchIndex] {
            skip(&mut ctx, stage, "no changed entity");
        }
        return Ok(ctx.report());
    }

    println!("🚀 Starting lakehouse run {} ({} entities)", ctx.run_id, ctx.dirty().len());
    let run_start = Instant::now();
    layout.ensure_dirs()?;

    // 1. SILVER
    let started = Instant::now();
    let result = run_silver(layout, &mut ctx).await.map(|n| {
        let detail = format!("{} entities, {} rows skipped", n, ctx.total_skipped());
        ((), StageStatus::Completed, detail)
    });
    settle(layout, &mut ctx, Stage::Silver, started, result)?;

    // 2. GOLD
    let started = Instant::now();
    let result = run_gold(layout, &mut ctx)
        .await
        .map(|tables| {
            let detail = format!(
                "{} tables rebuilt, {} to load",
                ctx.rebuilt_tables().count(),
                tables.len()
            );
            (tables, StageStatus::Completed, detail)
        });
    let tables = settle(layout, &mut ctx, Stage::Gold, started, result)?;

    // 3. WAREHOUSE
    let started = Instant::now();
    let result = load_warehouse(services.warehouse.as_ref(), &tables)
        .await
        .map(|rows| {
            let detail = format!("{} rows loaded into {}", rows, services.warehouse.engine_name());
            ((), StageStatus::Completed, detail)
        });
    settle(layout, &mut ctx, Stage::Warehouse, started, result)?;

    // 4. SEARCH INDEX
    let projects_rebuilt = ctx.rebuilt_tables().any(|t| t == GoldTable::DimProject);
    match (&services.search, index) {
        (_, false) => skip(&mut ctx, Stage::SearchIndex, "not requested"),
        (None, true) => skip(&mut ctx, Stage::SearchIndex, "search is disabled"),
        (Some(_), true) if !projects_rebuilt => {
            skip(&mut ctx, Stage::SearchIndex, "dim_project unchanged")
        }
        (Some(engine), true) => {
            let started = Instant::now();
            let settings = IndexSettings {
                gold_dir: &layout.gold,
                state_dir: &layout.state,
                collection: &services.config.search.collection,
                batch_size: services.config.search.batch_size,
            };
            let result = index_projects(engine.as_ref(), services.embeddings.as_deref(), &settings)
                .await
                .map(|outcome| match outcome.degraded {
                    Some(reason) => (
                        outcome.documents,
                        StageStatus::Degraded,
                        format!("{} documents without vectors: {}", outcome.documents, reason),
                    ),
                    None => (
                        outcome.documents,
                        StageStatus::Completed,
                        format!("{} documents, {} embedded", outcome.documents, outcome.embedded),
                    ),
                });
            let documents = settle(layout, &mut ctx, Stage::SearchIndex, started, result)?;
            ctx.record_indexed(documents);
        }
    }

    let report = ctx.report();
    persist_report(layout, &report)?;
    println!("✨ Done in {:.2}s.", run_start.elapsed().as_secs_f64());
    Ok(report)
}

pub fn last_run(layout: &LakeLayout) -> Result<Option<RunReport>, LakehouseError> {
    Ok(load_json(&layout.last_run_path())?)
}
