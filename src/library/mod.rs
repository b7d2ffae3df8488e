//! Local music library: root directories, the active save directory,
//! and the derived album cache.

pub mod scanner;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Local root directories plus a cache of every album found under them.
///
/// The cache is derived state: it is rebuilt whenever the directory
/// list changes and on config load, and is never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalLibrary {
    #[serde(default)]
    directories: Vec<String>,
    #[serde(default)]
    active_save_dir: usize,
    #[serde(skip)]
    album_cache: Vec<String>,
}

impl LocalLibrary {
    pub fn directories(&self) -> &[String] {
        &self.directories
    }

    pub fn add_dir(&mut self, dir: String) {
        self.directories.push(dir);
        self.refresh_album_cache();
    }

    /// Remove the root at `index`; out-of-range indexes are ignored.
    pub fn del_dir(&mut self, index: usize) {
        if index < self.directories.len() {
            self.directories.remove(index);
            self.refresh_album_cache();
        }
    }

    /// Mark the root at `index` as the save destination; out-of-range
    /// indexes are ignored.
    pub fn set_save_dir(&mut self, index: usize) {
        if index < self.directories.len() {
            self.active_save_dir = index;
        }
    }

    /// Index of the active save directory, reading a stale value as 0.
    pub fn save_dir_index(&self) -> usize {
        if self.active_save_dir < self.directories.len() {
            self.active_save_dir
        } else {
            0
        }
    }

    /// The active save directory, or `None` when the library has no
    /// roots at all.
    pub fn save_dir(&self) -> Option<&str> {
        self.directories
            .get(self.save_dir_index())
            .map(String::as_str)
    }

    pub fn album_cache(&self) -> &[String] {
        &self.album_cache
    }

    pub fn clear_album_cache(&mut self) {
        self.album_cache.clear();
    }

    /// Rebuild the album cache from the current directory list.
    pub fn refresh_album_cache(&mut self) {
        self.album_cache = scanner::scan(&self.directories);
        debug!(
            "Album cache refreshed: {} albums under {} roots",
            self.album_cache.len(),
            self.directories.len()
        );
    }
}
