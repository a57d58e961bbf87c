pub mod config;
pub mod report;

pub use config::{Config, GenerationConfig, VectorIndexConfig};
pub use report::*;
