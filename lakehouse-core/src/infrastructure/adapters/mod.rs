// lakehouse-core/src/infrastructure/adapters/mod.rs

pub mod csv;
pub mod datafusion;
pub mod duckdb;
pub mod embeddings;
pub mod memory_search;
pub mod parquet;
pub mod typesense;

pub use self::duckdb::DuckDbWarehouse;
pub use self::memory_search::MemorySearchEngine;
pub use self::typesense::TypesenseEngine;
