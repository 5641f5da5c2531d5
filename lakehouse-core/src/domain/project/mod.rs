pub mod configuration;

pub use configuration::{
    ApiConfig, EmbeddingConfig, LakehouseConfig, SearchBackend, SearchConfig, WarehouseConfig,
};
