// lakehouse/src/commands/run.rs
//
// USE CASE: Run the pipeline once, fully or for a set of changed entities.

use std::path::PathBuf;
use tracing::warn;

use lakehouse_core::application::run_pipeline;
use lakehouse_core::domain::{RunContext, SourceEntity};

use crate::commands::{fail, open_services, print_report};

pub async fn execute(
    project_dir: PathBuf,
    changed: Vec<String>,
    index: bool,
    strict: bool,
) -> anyhow::Result<()> {
    let start = std::time::Instant::now();
    let services = open_services(&project_dir)?;
    let strict = strict || services.config.strict_inputs;

    let ctx = if changed.is_empty() {
        RunContext::full(strict)
    } else {
        let entities = changed.iter().filter_map(|name| {
            let entity = SourceEntity::parse(name);
            if entity.is_none() {
                warn!(name = %name, "Unknown entity ignored");
            }
            entity
        });
        RunContext::selective(entities, strict)
    };

    match run_pipeline(&services, ctx, index).await {
        Ok(report) => {
            print_report(&report);
            println!("\n✨ SUCCESS! Pipeline finished in {:.2?}", start.elapsed());
            Ok(())
        }
        Err(e) => fail("CRITICAL PIPELINE ERROR", e),
    }
}
