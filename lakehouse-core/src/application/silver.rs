// lakehouse-core/src/application/silver.rs
//
// Bronze CSV -> Silver Parquet, one blocking task per dirty entity.

use futures::future::try_join_all;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

use crate::domain::entity::SourceEntity;
use crate::domain::run::{EntityCounters, RunContext};
use crate::domain::silver::{RawTable, clean_entity};
use crate::error::LakehouseError;
use crate::infrastructure::adapters::csv::read_bronze;
use crate::infrastructure::adapters::parquet::write_table;
use crate::infrastructure::fs::LakeLayout;

fn transform_entity(
    entity: SourceEntity,
    bronze: PathBuf,
    silver: PathBuf,
    strict: bool,
) -> Result<EntityCounters, LakehouseError> {
    let source = bronze.join(entity.bronze_file());
    let source_missing = !source.is_file();

    let raw = if source_missing {
        if strict {
            return Err(LakehouseError::MissingSource {
                entity: entity.name().to_string(),
                path: source.display().to_string(),
            });
        }
        warn!(entity = entity.name(), path = %source.display(), "Bronze file missing, writing an empty table");
        RawTable::default()
    } else {
        read_bronze(&source)?
    };

    let cleaned = clean_entity(entity, &raw);
    write_table(&silver.join(entity.silver_file()), &cleaned.table)?;

    Ok(EntityCounters {
        read: cleaned.read,
        written: cleaned.table.len(),
        skipped: cleaned.skipped,
        duplicates: cleaned.duplicates,
        source_missing,
    })
}

/// Rewrites the Silver file of every dirty entity. Outputs are disjoint files.
#[instrument(skip_all, fields(run_id = %ctx.run_id, entities = ctx.dirty().len()))]
pub async fn run_silver(layout: &LakeLayout, ctx: &mut RunContext) -> Result<usize, LakehouseError> {
    let strict = ctx.strict_inputs;
    let tasks = ctx.dirty().iter().copied().map(|entity| {
        let bronze = layout.bronze.clone();
        let silver = layout.silver.clone();
        async move {
            let counters = tokio::task::spawn_blocking(move || {
                transform_entity(entity, bronze, silver, strict)
            })
            .await
            .map_err(|e| LakehouseError::InternalError(format!("silver task for {}: {}", entity, e)))??;
            Ok::<_, LakehouseError>((entity, counters))
        }
    });

    let results = try_join_all(tasks).await?;
    for (entity, counters) in &results {
        info!(
            entity = entity.name(),
            read = counters.read,
            written = counters.written,
            skipped = counters.skipped,
            duplicates = counters.duplicates,
            "Silver table written"
        );
        ctx.record_entity(*entity, *counters);
    }
    Ok(results.len())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::domain::silver::SilverTopic;
    use crate::infrastructure::adapters::parquet::read_records;
    use anyhow::Result;
    use tempfile::{TempDir, tempdir};

    fn layout(dir: &TempDir) -> Result<LakeLayout> {
        let layout = LakeLayout {
            project_dir: dir.path().to_path_buf(),
            data: dir.path().to_path_buf(),
            bronze: dir.path().join("bronze"),
            silver: dir.path().join("silver"),
            gold: dir.path().join("gold"),
            runs: dir.path().join("runs"),
            state: dir.path().join("state"),
        };
        layout.ensure_dirs()?;
        Ok(layout)
    }

    #[tokio::test]
    async fn test_topics_are_cleaned_and_counted() -> Result<()> {
        let dir = tempdir()?;
        let layout = layout(&dir)?;
        std::fs::write(
            layout.bronze.join("topics.csv"),
            "projectID;topic;title\n101;HORIZON-CL5;Clean energy\n101;HORIZON-CL5;Clean energy\n;HORIZON-CL6;Orphan\n",
        )?;

        let mut ctx = RunContext::selective([SourceEntity::Topic], false);
        run_silver(&layout, &mut ctx).await?;

        let counters = ctx.counters(SourceEntity::Topic).unwrap();
        assert_eq!(counters.read, 3);
        assert_eq!(counters.written, 1);
        assert_eq!(counters.skipped, 1);
        assert_eq!(counters.duplicates, 1);

        let topics: Vec<SilverTopic> = read_records(&layout.silver.join("topics.parquet"))?;
        assert_eq!(topics[0].topic_code, "HORIZON-CL5");
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_source_writes_empty_table() -> Result<()> {
        let dir = tempdir()?;
        let layout = layout(&dir)?;

        let mut ctx = RunContext::full(false);
        assert_eq!(run_silver(&layout, &mut ctx).await?, SourceEntity::ALL.len());

        for entity in SourceEntity::ALL {
            assert!(layout.silver.join(entity.silver_file()).exists());
            assert!(ctx.counters(entity).unwrap().source_missing);
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_source_is_fatal_when_strict() -> Result<()> {
        let dir = tempdir()?;
        let layout = layout(&dir)?;

        let mut ctx = RunContext::selective([SourceEntity::Project], true);
        let err = run_silver(&layout, &mut ctx).await.unwrap_err();

        assert!(matches!(err, LakehouseError::MissingSource { ref entity, .. } if entity == "project"));
        Ok(())
    }

    #[tokio::test]
    async fn test_same_bronze_gives_byte_identical_silver() -> Result<()> {
        let sample = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../demos/cordis_sample/lake/bronze");
        let dir = tempdir()?;
        let mut layout = layout(&dir)?;
        layout.bronze = sample;

        run_silver(&layout, &mut RunContext::full(false)).await?;
        let first: Vec<Vec<u8>> = SourceEntity::ALL
            .iter()
            .map(|e| std::fs::read(layout.silver.join(e.silver_file())))
            .collect::<std::io::Result<_>>()?;

        run_silver(&layout, &mut RunContext::full(false)).await?;
        for (entity, before) in SourceEntity::ALL.iter().zip(&first) {
            let after = std::fs::read(layout.silver.join(entity.silver_file()))?;
            assert!(!after.is_empty());
            assert_eq!(&after, before, "{} output changed between runs", entity);
        }
        Ok(())
    }
}
