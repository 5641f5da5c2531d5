// lakehouse/src/commands/clean.rs
//
// USE CASE: Remove derived zones.

use std::path::PathBuf;

use lakehouse_core::application::clean_project;

use crate::commands::fail;

pub fn execute(project_dir: PathBuf) -> anyhow::Result<()> {
    match clean_project(&project_dir) {
        Ok(removed) if removed.is_empty() => println!("✅ Nothing to clean."),
        Ok(removed) => println!("✨ Removed {} target(s).", removed.len()),
        Err(e) => fail("Clean failed", e),
    }
    Ok(())
}
