// lakehouse-core/src/domain/mod.rs

pub mod entity;
pub mod error;
pub mod gold;
pub mod graph;
pub mod project;
pub mod run;
pub mod search;
pub mod silver;
pub mod table;

pub use entity::SourceEntity;
pub use gold::GoldTable;
pub use run::{RunContext, RunMode, RunReport, Stage};
pub use table::{Cell, ColumnDef, ColumnType, Record, RowReader};
