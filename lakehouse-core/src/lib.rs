// lakehouse-core/src/lib.rs

#![allow(missing_docs)]
// Memory safety
#![deny(unsafe_code)]
// Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports (Interfaces / Traits)
// Warehouse, search engine and embedding contracts.
pub mod ports;

// 2. Domain
// Source entities, Silver/Gold records, dependency graph, run context.
// Depends on nothing else in the crate.
pub mod domain;

// 3. Infrastructure (Adapters)
// CSV, Parquet, DuckDB, DataFusion, Typesense, config files.
pub mod infrastructure;

// 4. Application (Use Cases)
// Bronze store, pipeline stages, watcher, warehouse queries.
pub mod application;

// 5. HTTP surface over the application layer
pub mod api;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
pub use error::LakehouseError;
