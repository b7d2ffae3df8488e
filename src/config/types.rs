//! Persisted configuration document.

use serde::{Deserialize, Serialize};

use crate::library::LocalLibrary;
use crate::site::RemoteSite;

pub const CONFIG_VERSION: u32 = 1;

fn default_version() -> u32 {
    CONFIG_VERSION
}

/// Everything saved to `~/.mediamover/config.json`.
///
/// The library's album cache is derived state and never part of the
/// document; it is rebuilt after load.
#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub library: LocalLibrary,
    #[serde(default)]
    pub sites: Vec<RemoteSite>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            library: LocalLibrary::default(),
            sites: Vec::new(),
        }
    }
}
