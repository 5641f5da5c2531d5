// lakehouse/src/commands/watch.rs
//
// USE CASE: Scheduler trigger. Polls Bronze modification times.

use std::path::PathBuf;
use std::time::Duration;

use lakehouse_core::application::watch;

use crate::commands::{fail, open_services, print_report};

pub async fn execute(
    project_dir: PathBuf,
    interval: u64,
    force: bool,
    once: bool,
    index: bool,
) -> anyhow::Result<()> {
    let services = open_services(&project_dir)?;
    println!(
        "👀 Watching {} every {}s{}",
        services.layout.bronze.display(),
        interval,
        if force { " (forced first run)" } else { "" }
    );

    match watch(&services, Duration::from_secs(interval.max(1)), force, once, index).await {
        Ok(Some(report)) => {
            print_report(&report);
            Ok(())
        }
        Ok(None) => {
            println!("✅ No Bronze change detected.");
            Ok(())
        }
        Err(e) => fail("Triggered run failed", e),
    }
}
