// lakehouse-core/src/infrastructure/adapters/datafusion.rs
//
// Ad-hoc SQL over the Silver and Gold Parquet files, without going through the warehouse.

use datafusion::arrow::record_batch::RecordBatch;
use datafusion::arrow::util::pretty::pretty_format_batches;
use datafusion::prelude::*;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::LakehouseError;
use crate::infrastructure::error::{DatabaseError, InfrastructureError};

fn df_err(e: datafusion::error::DataFusionError) -> LakehouseError {
    LakehouseError::Infrastructure(InfrastructureError::Database(DatabaseError::DataFusion(e)))
}

/// Column description of a registered zone table.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneColumn {
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
}

pub struct ZoneExplorer {
    ctx: SessionContext,
    tables: Vec<String>,
}

impl ZoneExplorer {
    pub fn new() -> Self {
        Self {
            ctx: SessionContext::new(),
            tables: Vec::new(),
        }
    }

    /// Registers every `*.parquet` file directly under `dir`, named after its lower-cased file stem.
    pub async fn register_zone(&mut self, dir: &Path) -> Result<usize, LakehouseError> {
        if !dir.exists() {
            return Ok(0);
        }
        let mut registered = 0;
        for entry in WalkDir::new(dir)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("parquet") {
                continue;
            }
            // Unquoted SQL identifiers are lower-cased by the planner
            let Some(stem) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_ascii_lowercase)
            else {
                continue;
            };
            let stem = stem.as_str();
            let location = path.to_str().ok_or_else(|| {
                LakehouseError::InternalError(format!("Invalid path for table {}: {:?}", stem, path))
            })?;
            // A later zone shadows an earlier table of the same name
            if self.tables.iter().any(|t| t == stem) {
                self.ctx.deregister_table(stem).map_err(df_err)?;
            } else {
                self.tables.push(stem.to_string());
            }
            self.ctx
                .register_parquet(stem, location, ParquetReadOptions::default())
                .await
                .map_err(df_err)?;
            debug!(table = stem, "Zone table registered");
            registered += 1;
        }
        Ok(registered)
    }

    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    pub async fn describe(&self, table: &str) -> Result<Vec<ZoneColumn>, LakehouseError> {
        let df = self.ctx.table(table).await.map_err(df_err)?;
        Ok(df
            .schema()
            .fields()
            .iter()
            .map(|field| ZoneColumn {
                name: field.name().clone(),
                data_type: field.data_type().to_string(),
                is_nullable: field.is_nullable(),
            })
            .collect())
    }

    pub async fn sql(&self, query: &str) -> Result<Vec<RecordBatch>, LakehouseError> {
        let df = self.ctx.sql(query).await.map_err(df_err)?;
        df.collect().await.map_err(df_err)
    }

    pub async fn sample(&self, table: &str, limit: usize) -> Result<Vec<RecordBatch>, LakehouseError> {
        let df = self
            .ctx
            .table(table)
            .await
            .map_err(df_err)?
            .limit(0, Some(limit))
            .map_err(df_err)?;
        df.collect().await.map_err(df_err)
    }

    pub async fn count(&self, table: &str) -> Result<usize, LakehouseError> {
        let df = self.ctx.table(table).await.map_err(df_err)?;
        df.count().await.map_err(df_err)
    }
}

impl Default for ZoneExplorer {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render_batches(batches: &[RecordBatch]) -> Result<String, LakehouseError> {
    pretty_format_batches(batches)
        .map(|table| table.to_string())
        .map_err(|e| InfrastructureError::Arrow(e).into())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::silver::SilverTopic;
    use crate::domain::table::TableData;
    use crate::infrastructure::adapters::parquet::write_table;
    use anyhow::Result;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_query_over_registered_zone() -> Result<()> {
        let dir = tempdir()?;
        let topics = vec![
            SilverTopic {
                project_id: "P1".into(),
                topic_code: "HORIZON-CL5".into(),
                topic_title: Some("Clean energy".into()),
            },
            SilverTopic {
                project_id: "P2".into(),
                topic_code: "HORIZON-CL5".into(),
                topic_title: None,
            },
        ];
        write_table(&dir.path().join("topics.parquet"), &TableData::from_records(&topics))?;
        std::fs::write(dir.path().join("notes.txt"), "ignored")?;

        let mut explorer = ZoneExplorer::new();
        assert_eq!(explorer.register_zone(dir.path()).await?, 1);
        assert_eq!(explorer.count("topics").await?, 2);

        let batches = explorer
            .sql("SELECT topic_code, count(*) AS n FROM topics GROUP BY topic_code")
            .await?;
        let rendered = render_batches(&batches)?;
        assert!(rendered.contains("HORIZON-CL5"));
        assert!(rendered.contains("| 2 "));

        let columns = explorer.describe("topics").await?;
        assert_eq!(columns[0].name, "project_id");
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_zone_registers_nothing() -> Result<()> {
        let mut explorer = ZoneExplorer::new();
        assert_eq!(explorer.register_zone(Path::new("/nonexistent/zone")).await?, 0);
        assert!(explorer.tables().is_empty());
        Ok(())
    }
}
