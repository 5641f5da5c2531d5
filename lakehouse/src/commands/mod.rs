// lakehouse/src/commands/mod.rs

pub mod clean;
pub mod index;
pub mod inspect;
pub mod query;
pub mod run;
pub mod serve;
pub mod watch;

use anyhow::Context;
use comfy_table::Table;
use comfy_table::presets::UTF8_FULL;
use std::path::Path;

use lakehouse_core::LakehouseError;
use lakehouse_core::application::LakehouseServices;
use lakehouse_core::domain::RunReport;

pub fn open_services(project_dir: &Path) -> anyhow::Result<LakehouseServices> {
    println!("⚙️  Loading configuration...");
    let services = LakehouseServices::open(project_dir).with_context(|| {
        format!(
            "Failed to load lakehouse configuration from {:?}",
            project_dir
        )
    })?;
    println!("   Project: {}", services.config.name);
    Ok(services)
}

/// Prints the error with its diagnostic code and help, then exits with status 1.
pub fn fail(context: &str, err: LakehouseError) -> ! {
    eprintln!("\n💥 {}", context);
    eprintln!("{:?}", miette::Report::new(err));
    std::process::exit(1);
}

pub fn print_report(report: &RunReport) {
    let mut stages = Table::new();
    stages
        .load_preset(UTF8_FULL)
        .set_header(vec!["Stage", "Status", "Duration (ms)", "Detail"]);
    for stage in &report.stages {
        stages.add_row(vec![
            stage.stage.to_string(),
            format!("{:?}", stage.status),
            stage.duration_ms.to_string(),
            stage.detail.clone(),
        ]);
    }
    println!("{stages}");

    if !report.entities.is_empty() {
        let mut entities = Table::new();
        entities.load_preset(UTF8_FULL).set_header(vec![
            "Entity",
            "Read",
            "Written",
            "Skipped",
            "Duplicates",
            "Source",
        ]);
        for (name, counters) in &report.entities {
            entities.add_row(vec![
                name.clone(),
                counters.read.to_string(),
                counters.written.to_string(),
                counters.skipped.to_string(),
                counters.duplicates.to_string(),
                if counters.source_missing { "missing" } else { "ok" }.to_string(),
            ]);
        }
        println!("{entities}");
    }

    for (table, rows) in &report.gold_tables {
        println!("   🥇 {} ({} rows)", table, rows);
    }
}
