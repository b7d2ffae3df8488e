//! Typed configuration with JSON persistence.

pub mod storage;
pub mod types;

pub use storage::{config_dir, ConfigStorage, StorageError};
pub use types::{ConfigFile, CONFIG_VERSION};
