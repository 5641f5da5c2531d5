pub mod project;

pub use crate::domain::project::LakehouseConfig;
pub use project::{apply_env_overrides, load_lakehouse_config};
