// lakehouse-core/src/application/mod.rs

pub mod bronze;
pub mod clean;
pub mod explore;
pub mod gold;
pub mod indexing;
pub mod pipeline;
pub mod queries;
pub mod search;
pub mod services;
pub mod silver;
pub mod warehouse;
pub mod watch;

// --- RE-EXPORTS (FACADE) ---
// The CLI and the API use `lakehouse_core::application::{run_pipeline, ...}`
// without knowing the file layout.

pub use bronze::{BronzeStore, RawFileInfo};
pub use clean::clean_project;
pub use explore::{execute_query, inspect_table};
pub use indexing::{IndexOutcome, IndexSettings, ensure_collection, index_projects};
pub use pipeline::{last_run, run_pipeline};
pub use queries::{gold_facts, gold_projects, project_filter};
pub use search::search_projects;
pub use services::LakehouseServices;
pub use watch::{ChangeDetector, poll_once, watch};
