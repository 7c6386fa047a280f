pub mod config;
pub mod error;
pub mod types;

pub use config::{CacheSettings, Config, ModelProvider, SearchSettings};
pub use error::{ClipScoutError, Result};
pub use types::*;
