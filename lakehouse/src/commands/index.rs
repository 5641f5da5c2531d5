// lakehouse/src/commands/index.rs
//
// USE CASE: Rebuild the search collection from the Gold zone.

use std::path::PathBuf;

use lakehouse_core::application::{IndexSettings, index_projects};

use crate::commands::{fail, open_services};

pub async fn execute(project_dir: PathBuf) -> anyhow::Result<()> {
    let services = open_services(&project_dir)?;
    let Some(engine) = services.search.clone() else {
        anyhow::bail!("❌ Search is disabled in lakehouse.yaml");
    };

    println!("🔎 Indexing into '{}' ({})", services.config.search.collection, engine.engine_name());
    let settings = IndexSettings {
        gold_dir: &services.layout.gold,
        state_dir: &services.layout.state,
        collection: &services.config.search.collection,
        batch_size: services.config.search.batch_size,
    };

    match index_projects(engine.as_ref(), services.embeddings.as_deref(), &settings).await {
        Ok(outcome) => {
            println!(
                "✨ {} documents indexed ({} embedded, {} reused)",
                outcome.documents, outcome.embedded, outcome.reused
            );
            if let Some(reason) = outcome.degraded {
                println!("   ⚠️  Degraded: indexed without vectors ({})", reason);
            }
            Ok(())
        }
        Err(e) => fail("Indexing failed", e),
    }
}
