// lakehouse/src/main.rs

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG=debug lakehouse run ... for the details
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            project_dir,
            changed,
            no_index,
            strict,
        } => commands::run::execute(project_dir, changed, !no_index, strict).await,
        Commands::Serve { project_dir, bind } => commands::serve::execute(project_dir, bind).await,
        Commands::Watch {
            project_dir,
            interval,
            force,
            once,
            no_index,
        } => commands::watch::execute(project_dir, interval, force, once, !no_index).await,
        Commands::Index { project_dir } => commands::index::execute(project_dir).await,
        Commands::Inspect {
            project_dir,
            table,
            limit,
        } => commands::inspect::execute(project_dir, table, limit).await,
        Commands::Query { query, project_dir } => commands::query::execute(project_dir, query).await,
        Commands::Clean { project_dir } => commands::clean::execute(project_dir),
    }
}
