//! Remote site model.

use serde::{Deserialize, Serialize};

use crate::ssh::Endpoint;

fn new_site_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// A remote host with its own root directories and block list.
///
/// The `id` is the stable key for the per-process session registry;
/// configs written before ids existed get one generated on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteSite {
    #[serde(default = "new_site_id")]
    pub id: String,
    pub name: String,
    pub username: String,
    pub hostname: String,
    pub port: u16,
    #[serde(default)]
    directories: Vec<String>,
    #[serde(default)]
    blocked_albums: Vec<String>,
}

impl RemoteSite {
    pub fn new(name: String, username: String, hostname: String, port: u16) -> Self {
        Self {
            id: new_site_id(),
            name,
            username,
            hostname,
            port,
            directories: Vec::new(),
            blocked_albums: Vec::new(),
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint {
            hostname: self.hostname.clone(),
            port: self.port,
            username: self.username.clone(),
        }
    }

    pub fn directories(&self) -> &[String] {
        &self.directories
    }

    pub fn add_dir(&mut self, dir: String) {
        self.directories.push(dir);
    }

    /// Remove the directory at `index`; out-of-range indexes are ignored.
    pub fn del_dir(&mut self, index: usize) {
        if index < self.directories.len() {
            self.directories.remove(index);
        }
    }

    pub fn blocked_albums(&self) -> &[String] {
        &self.blocked_albums
    }

    /// Block an album name. The list keeps insertion order but behaves
    /// as a set: blocking an already-blocked name is a no-op.
    pub fn block_album(&mut self, album: String) {
        if !self.blocked_albums.contains(&album) {
            self.blocked_albums.push(album);
        }
    }

    /// Remove the block at `index`; out-of-range indexes are ignored.
    pub fn unblock_at(&mut self, index: usize) {
        if index < self.blocked_albums.len() {
            self.blocked_albums.remove(index);
        }
    }

    pub fn is_blocked(&self, album: &str) -> bool {
        self.blocked_albums.iter().any(|b| b == album)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> RemoteSite {
        RemoteSite::new(
            "attic".to_string(),
            "dan".to_string(),
            "music.example.com".to_string(),
            22,
        )
    }

    #[test]
    fn block_list_rejects_duplicates() {
        let mut site = site();
        site.block_album("Album".to_string());
        site.block_album("Album".to_string());
        assert_eq!(site.blocked_albums(), ["Album"]);
        assert!(site.is_blocked("Album"));
    }

    #[test]
    fn sites_get_distinct_ids() {
        assert_ne!(site().id, site().id);
    }

    #[test]
    fn legacy_config_without_id_gets_one() {
        let json = r#"{
            "name": "attic",
            "username": "dan",
            "hostname": "music.example.com",
            "port": 22
        }"#;
        let site: RemoteSite = serde_json::from_str(json).unwrap();
        assert!(!site.id.is_empty());
        assert!(site.directories().is_empty());
    }

    #[test]
    fn unblock_by_index() {
        let mut site = site();
        site.block_album("a".to_string());
        site.block_album("b".to_string());
        site.unblock_at(0);
        assert_eq!(site.blocked_albums(), ["b"]);
        site.unblock_at(7);
        assert_eq!(site.blocked_albums(), ["b"]);
    }
}
