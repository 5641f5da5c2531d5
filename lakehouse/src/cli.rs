// lakehouse/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lakehouse")]
#[command(about = "Bronze/Silver/Gold lakehouse for CORDIS research projects", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 🚀 Runs the pipeline (Silver -> Gold -> Warehouse -> Search index)
    Run {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Changed entity or Bronze file (repeatable). Omit for a full run.
        #[arg(long, short)]
        changed: Vec<String>,

        /// Skip the search index stage
        #[arg(long)]
        no_index: bool,

        /// Abort when a Bronze file is missing
        #[arg(long)]
        strict: bool,
    },

    /// 🌐 Serves the HTTP API
    Serve {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Listen address (defaults to `api.bind`)
        #[arg(long, env = "LAKEHOUSE_BIND")]
        bind: Option<String>,
    },

    /// 👀 Polls the Bronze zone and runs the pipeline for changed files
    Watch {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Poll interval in seconds
        #[arg(long, default_value = "60")]
        interval: u64,

        /// Rebuild everything on the first tick, whatever the recorded state says
        #[arg(long)]
        force: bool,

        /// Run a single detection cycle and exit
        #[arg(long)]
        once: bool,

        #[arg(long)]
        no_index: bool,
    },

    /// 🔎 (Re)indexes the Gold projects into the search engine
    Index {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },

    /// 🔍 Inspects a Silver or Gold table (schema + sample rows)
    Inspect {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Table name (file stem, e.g. `dim_project` or `topics`)
        #[arg(long, short)]
        table: String,

        /// Number of sample rows to display
        #[arg(long, default_value = "5")]
        limit: usize,
    },

    /// ⚡ Executes a SQL query over the Silver and Gold zones
    Query {
        query: String,

        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },

    /// 🧹 Removes derived zones (Silver, Gold, run reports)
    Clean {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};
    use clap::Parser;

    #[test]
    fn test_cli_parse_run_defaults() -> Result<()> {
        let args = Cli::parse_from(["lakehouse", "run"]);
        match args.command {
            Commands::Run {
                project_dir,
                changed,
                no_index,
                strict,
            } => {
                assert_eq!(project_dir.to_string_lossy(), ".");
                assert!(changed.is_empty());
                assert!(!no_index);
                assert!(!strict);
                Ok(())
            }
            _ => bail!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_parse_selective_run() -> Result<()> {
        let args = Cli::parse_from([
            "lakehouse",
            "run",
            "-c",
            "topics.csv",
            "--changed",
            "web_link",
            "--project-dir",
            "/tmp",
        ]);
        match args.command {
            Commands::Run {
                project_dir,
                changed,
                ..
            } => {
                assert_eq!(project_dir.to_string_lossy(), "/tmp");
                assert_eq!(changed, vec!["topics.csv", "web_link"]);
                Ok(())
            }
            _ => bail!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_parse_watch() -> Result<()> {
        let args = Cli::parse_from(["lakehouse", "watch", "--once", "--force", "--interval", "5"]);
        match args.command {
            Commands::Watch {
                interval,
                force,
                once,
                no_index,
                ..
            } => {
                assert_eq!(interval, 5);
                assert!(force && once && !no_index);
                Ok(())
            }
            _ => bail!("Expected Watch command"),
        }
    }

    #[test]
    fn test_cli_parse_inspect() -> Result<()> {
        let args = Cli::parse_from(["lakehouse", "inspect", "--table", "dim_project", "--limit", "10"]);
        match args.command {
            Commands::Inspect { table, limit, .. } => {
                assert_eq!(table, "dim_project");
                assert_eq!(limit, 10);
                Ok(())
            }
            _ => bail!("Expected Inspect command"),
        }
    }
}
