// lakehouse-core/src/application/explore.rs
//
// Ad-hoc SQL over the Silver and Gold zones, for the `inspect` and `query` commands.

use datafusion::arrow::record_batch::RecordBatch;
use std::time::Instant;
use tracing::{debug, error, instrument};

use crate::error::LakehouseError;
use crate::infrastructure::adapters::datafusion::{ZoneColumn, ZoneExplorer};
use crate::infrastructure::fs::LakeLayout;

/// Silver tables first, Gold tables registered over them.
pub async fn open_zones(layout: &LakeLayout) -> Result<ZoneExplorer, LakehouseError> {
    let mut explorer = ZoneExplorer::new();
    let silver = explorer.register_zone(&layout.silver).await?;
    let gold = explorer.register_zone(&layout.gold).await?;
    debug!(silver, gold, "Zones registered");
    Ok(explorer)
}

#[derive(Debug)]
pub struct TableInspection {
    pub table: String,
    pub columns: Vec<ZoneColumn>,
    pub rows: usize,
    pub sample: Vec<RecordBatch>,
}

pub async fn inspect_table(
    layout: &LakeLayout,
    table: &str,
    limit: usize,
) -> Result<TableInspection, LakehouseError> {
    let explorer = open_zones(layout).await?;
    let table = table.to_ascii_lowercase();
    if !explorer.tables().contains(&table) {
        return Err(LakehouseError::NotFound(table));
    }
    Ok(TableInspection {
        columns: explorer.describe(&table).await?,
        rows: explorer.count(&table).await?,
        sample: explorer.sample(&table, limit).await?,
        table,
    })
}

#[instrument(skip(layout), fields(query.len = query.len()))]
pub async fn execute_query(layout: &LakeLayout, query: &str) -> Result<Vec<RecordBatch>, LakehouseError> {
    let start = Instant::now();
    let explorer = open_zones(layout).await?;
    debug!("⚡ Executing query: {}", query);

    match explorer.sql(query).await {
        Ok(batches) => {
            debug!("✅ Query finished in {:.2?}", start.elapsed());
            Ok(batches)
        }
        Err(e) => {
            error!("❌ Query failed after {:.2?}: {}", start.elapsed(), e);
            Err(e)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::domain::gold::TopicDim;
    use crate::domain::table::TableData;
    use crate::infrastructure::adapters::parquet::write_table;
    use anyhow::Result;
    use tempfile::tempdir;

    fn layout(root: &std::path::Path) -> Result<LakeLayout> {
        let layout = LakeLayout {
            project_dir: root.to_path_buf(),
            data: root.to_path_buf(),
            bronze: root.join("bronze"),
            silver: root.join("silver"),
            gold: root.join("gold"),
            runs: root.join("runs"),
            state: root.join("state"),
        };
        layout.ensure_dirs()?;
        Ok(layout)
    }

    #[tokio::test]
    async fn test_inspect_gold_table() -> Result<()> {
        let dir = tempdir()?;
        let layout = layout(dir.path())?;
        let topics: Vec<TopicDim> = (1..=3)
            .map(|sk| TopicDim {
                sk,
                code: format!("T{}", sk),
                title: None,
            })
            .collect();
        write_table(&layout.gold.join("dim_topic.parquet"), &TableData::from_records(&topics))?;

        let inspection = inspect_table(&layout, "DIM_TOPIC", 2).await?;

        assert_eq!(inspection.rows, 3);
        assert_eq!(inspection.columns.len(), 3);
        assert_eq!(inspection.sample.iter().map(|b| b.num_rows()).sum::<usize>(), 2);

        let batches = execute_query(&layout, "SELECT max(topic_sk) AS top FROM dim_topic").await?;
        assert_eq!(batches[0].num_rows(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_table_is_not_found() -> Result<()> {
        let dir = tempdir()?;
        let layout = layout(dir.path())?;
        assert!(matches!(
            inspect_table(&layout, "nope", 5).await,
            Err(LakehouseError::NotFound(_))
        ));
        Ok(())
    }
}
