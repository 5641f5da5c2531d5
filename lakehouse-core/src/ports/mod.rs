// lakehouse-core/src/ports/mod.rs

pub mod embeddings;
pub mod search;
pub mod warehouse;

pub use embeddings::EmbeddingProvider;
pub use search::SearchEngine;
pub use warehouse::{FactRow, ProjectFilter, ProjectRow, Warehouse};
