// lakehouse/src/commands/query.rs
//
// USE CASE: Execute an ad-hoc SQL query over the zone files.

use std::path::PathBuf;

use lakehouse_core::application::execute_query;
use lakehouse_core::infrastructure::adapters::datafusion::render_batches;

use crate::commands::{fail, open_services};

pub async fn execute(project_dir: PathBuf, query: String) -> anyhow::Result<()> {
    let services = open_services(&project_dir)?;
    match execute_query(&services.layout, &query).await {
        Ok(batches) => {
            println!("{}", render_batches(&batches)?);
            Ok(())
        }
        Err(e) => fail("Query failed", e),
    }
}
