pub mod clustering;
pub mod config;
pub mod error;
pub mod packing;
pub mod pipeline;
pub mod settings;
pub mod types;

pub use config::{AtlasConfig, PipelineConfig};
pub use pipeline::Pipeline;
