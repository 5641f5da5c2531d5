// lakehouse/src/commands/serve.rs
//
// USE CASE: Expose the lakehouse over HTTP.

use std::path::PathBuf;
use std::sync::Arc;

use lakehouse_core::api::{AppState, serve};

use crate::commands::{fail, open_services};

pub async fn execute(project_dir: PathBuf, bind: Option<String>) -> anyhow::Result<()> {
    let services = open_services(&project_dir)?;
    let bind = bind.unwrap_or_else(|| services.config.api.bind.clone());
    if services.config.api.username.is_none() || services.config.api.password.is_none() {
        eprintln!("⚠️  No API credentials configured: protected routes will answer 500");
    }

    println!("🌐 Serving on http://{}", bind);
    let state = AppState::new(Arc::new(services));
    if let Err(e) = serve(state, &bind).await {
        fail("Server stopped", e);
    }
    Ok(())
}
