// lakehouse-core/src/api/routes/mod.rs

pub mod gold;
pub mod pipeline;
pub mod raw;
pub mod search;
