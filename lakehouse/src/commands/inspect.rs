// lakehouse/src/commands/inspect.rs
//
// USE CASE: Inspect a zone table (schema + sample rows).

use comfy_table::Table;
use comfy_table::presets::UTF8_FULL;
use std::path::PathBuf;

use lakehouse_core::application::inspect_table;
use lakehouse_core::infrastructure::adapters::datafusion::render_batches;

use crate::commands::{fail, open_services};

pub async fn execute(project_dir: PathBuf, table: String, limit: usize) -> anyhow::Result<()> {
    let services = open_services(&project_dir)?;

    println!("\n🔍 Inspecting Table: '{}'", table);
    let inspection = match inspect_table(&services.layout, &table, limit).await {
        Ok(inspection) => inspection,
        Err(e) => fail("Inspection failed", e),
    };

    let mut columns = Table::new();
    columns
        .load_preset(UTF8_FULL)
        .set_header(vec!["Column", "Type", "Nullable"]);
    for column in &inspection.columns {
        columns.add_row(vec![
            column.name.clone(),
            column.data_type.clone(),
            column.is_nullable.to_string(),
        ]);
    }
    println!("{columns}");
    println!("   --- {} rows, showing {} ---", inspection.rows, limit.min(inspection.rows));
    println!("{}", render_batches(&inspection.sample)?);
    Ok(())
}
