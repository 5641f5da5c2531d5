// lakehouse-core/src/application/warehouse.rs

use std::time::Instant;
use tracing::{info, instrument};

use crate::domain::gold::GoldTable;
use crate::domain::table::TableData;
use crate::error::LakehouseError;
use crate::ports::warehouse::Warehouse;

/// Reloads the tables handed over by the Gold stage. All of them commit together or not at all.
#[instrument(skip_all, fields(engine = warehouse.engine_name(), tables = tables.len()))]
pub async fn load_warehouse(
    warehouse: &dyn Warehouse,
    tables: &[TableData],
) -> Result<usize, LakehouseError> {
    let start = Instant::now();
    // Every table exists after the first load, even when a selective run skipped it
    warehouse.ensure_tables(&GoldTable::ALL).await?;
    if tables.is_empty() {
        return Ok(0);
    }
    warehouse.replace_tables(tables).await?;
    let rows: usize = tables.iter().map(TableData::len).sum();
    info!(rows, duration_ms = start.elapsed().as_millis() as u64, "Warehouse reloaded");
    Ok(rows)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::domain::gold::TopicDim;
    use crate::ports::warehouse::{FactRow, ProjectFilter, ProjectRow};
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    struct MockWarehouse {
        calls: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Warehouse for MockWarehouse {
        async fn ensure_tables(&self, tables: &[GoldTable]) -> Result<(), LakehouseError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("ensure:{}", tables.len()));
            Ok(())
        }

        async fn replace_tables(&self, tables: &[TableData]) -> Result<(), LakehouseError> {
            for table in tables {
                self.calls
                    .lock()
                    .unwrap()
                    .push(format!("replace:{}:{}", table.name, table.len()));
            }
            Ok(())
        }

        async fn query_projects(&self, _: &ProjectFilter) -> Result<Vec<ProjectRow>, LakehouseError> {
            Ok(vec![])
        }

        async fn query_facts(&self, _: &ProjectFilter) -> Result<Vec<FactRow>, LakehouseError> {
            Ok(vec![])
        }

        async fn count_rows(&self, _: &str) -> Result<u64, LakehouseError> {
            Ok(0)
        }

        fn engine_name(&self) -> &str {
            "mock"
        }
    }

    #[tokio::test]
    async fn test_only_given_tables_are_replaced() -> Result<()> {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let warehouse = MockWarehouse {
            calls: calls.clone(),
        };
        let topics = TableData::from_records(&[TopicDim {
            sk: 1,
            code: "T1".into(),
            title: None,
        }]);

        let rows = load_warehouse(&warehouse, &[topics]).await?;

        assert_eq!(rows, 1);
        assert_eq!(
            *calls.lock().unwrap(),
            vec!["ensure:6".to_string(), "replace:dim_topic:1".to_string()]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_nothing_to_reload_still_creates_tables() -> Result<()> {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let warehouse = MockWarehouse {
            calls: calls.clone(),
        };

        assert_eq!(load_warehouse(&warehouse, &[]).await?, 0);
        assert_eq!(*calls.lock().unwrap(), vec!["ensure:6".to_string()]);
        Ok(())
    }
}
