//! Host key verification against `~/.ssh/known_hosts`.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use parking_lot::RwLock;
use russh::keys::{PublicKey, PublicKeyBase64};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use super::error::SshError;

/// Outcome of checking a server key against the store.
#[derive(Debug, Clone, PartialEq)]
pub enum HostKeyCheck {
    /// Key matches a stored entry.
    Verified,
    /// Host has no stored key of this type (first connection).
    Unknown { fingerprint: String },
    /// Stored key differs - potential MITM, never accepted.
    Changed {
        expected_fingerprint: String,
        actual_fingerprint: String,
    },
}

/// One stored key: (key type, base64 key data).
#[derive(Clone, Debug)]
struct StoredKey {
    key_type: String,
    key_data: String,
}

/// In-memory view of the known_hosts file.
pub struct KnownHostsStore {
    hosts: RwLock<HashMap<String, Vec<StoredKey>>>,
    path: PathBuf,
}

impl KnownHostsStore {
    /// Load from the default `~/.ssh/known_hosts` location.
    pub fn new() -> Self {
        let path = dirs::home_dir()
            .map(|h| h.join(".ssh").join("known_hosts"))
            .unwrap_or_else(|| PathBuf::from("~/.ssh/known_hosts"));
        Self::with_path(path)
    }

    /// Load from a custom path (used by tests).
    pub fn with_path(path: PathBuf) -> Self {
        let store = Self {
            hosts: RwLock::new(HashMap::new()),
            path,
        };
        if let Err(e) = store.load() {
            warn!("Failed to load known_hosts: {}", e);
        }
        store
    }

    fn load(&self) -> Result<(), SshError> {
        if !self.path.exists() {
            return Ok(());
        }

        let content = fs::read_to_string(&self.path).map_err(SshError::IoError)?;
        let mut hosts = self.hosts.write();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            // hostname[,alias...] keytype base64key [comment]
            let mut parts = line.split_whitespace();
            let (Some(names), Some(key_type), Some(key_data)) =
                (parts.next(), parts.next(), parts.next())
            else {
                continue;
            };

            let entry = StoredKey {
                key_type: key_type.to_string(),
                key_data: key_data.to_string(),
            };

            for name in names.split(',') {
                // Hashed hostnames (|1|...) are not supported.
                if name.starts_with('|') {
                    continue;
                }
                hosts
                    .entry(name.to_lowercase())
                    .or_default()
                    .push(entry.clone());
            }
        }

        debug!("Loaded {} known hosts from {:?}", hosts.len(), self.path);
        Ok(())
    }

    /// known_hosts lookup key: bare hostname for port 22, `[host]:port`
    /// otherwise.
    fn lookup_key(host: &str, port: u16) -> String {
        let host = host.to_lowercase();
        if port == 22 {
            host
        } else {
            format!("[{}]:{}", host, port)
        }
    }

    /// SHA256 fingerprint in the OpenSSH display format.
    pub fn fingerprint(key: &PublicKey) -> String {
        Self::fingerprint_bytes(&key.public_key_bytes())
    }

    fn fingerprint_bytes(key_bytes: &[u8]) -> String {
        let hash = Sha256::digest(key_bytes);
        format!("SHA256:{}", BASE64.encode(hash).trim_end_matches('='))
    }

    /// Check a server key for `host:port`.
    pub fn verify(&self, host: &str, port: u16, key: &PublicKey) -> HostKeyCheck {
        let lookup = Self::lookup_key(host, port);
        let actual_data = BASE64.encode(key.public_key_bytes());
        let actual_type = key.algorithm().to_string();
        let fingerprint = Self::fingerprint(key);

        let hosts = self.hosts.read();
        // Exact [host]:port entry first, then the bare hostname.
        let entries = hosts.get(&lookup).or_else(|| hosts.get(&host.to_lowercase()));

        let Some(entries) = entries else {
            debug!("Unknown host: {}", lookup);
            return HostKeyCheck::Unknown { fingerprint };
        };

        for entry in entries {
            if entry.key_type != actual_type {
                continue;
            }
            if entry.key_data == actual_data {
                debug!("Host key verified for {}", lookup);
                return HostKeyCheck::Verified;
            }
            let expected_fingerprint = BASE64
                .decode(&entry.key_data)
                .map(|bytes| Self::fingerprint_bytes(&bytes))
                .unwrap_or_else(|_| "unknown".to_string());
            warn!(
                "Host key changed for {}: expected {}, got {}",
                lookup, expected_fingerprint, fingerprint
            );
            return HostKeyCheck::Changed {
                expected_fingerprint,
                actual_fingerprint: fingerprint,
            };
        }

        // Host known, but not for this key type.
        HostKeyCheck::Unknown { fingerprint }
    }

    /// Append a key for `host:port` to the store and the file.
    pub fn add_host(&self, host: &str, port: u16, key: &PublicKey) -> Result<(), SshError> {
        let lookup = Self::lookup_key(host, port);
        let key_type = key.algorithm().to_string();
        let key_data = BASE64.encode(key.public_key_bytes());

        self.hosts
            .write()
            .entry(lookup.clone())
            .or_default()
            .push(StoredKey {
                key_type: key_type.clone(),
                key_data: key_data.clone(),
            });

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(SshError::IoError)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(SshError::IoError)?;
        writeln!(file, "{} {} {}", lookup, key_type, key_data).map_err(SshError::IoError)?;

        info!("Added {} key for {} to known_hosts", key_type, lookup);
        Ok(())
    }
}

impl Default for KnownHostsStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide store, loaded once.
static KNOWN_HOSTS: std::sync::OnceLock<KnownHostsStore> = std::sync::OnceLock::new();

pub fn get_known_hosts() -> &'static KnownHostsStore {
    KNOWN_HOSTS.get_or_init(KnownHostsStore::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_key_formats() {
        assert_eq!(KnownHostsStore::lookup_key("Music.example.com", 22), "music.example.com");
        assert_eq!(
            KnownHostsStore::lookup_key("music.example.com", 2222),
            "[music.example.com]:2222"
        );
    }

    #[test]
    fn missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = KnownHostsStore::with_path(dir.path().join("known_hosts"));
        assert!(store.hosts.read().is_empty());
    }

    #[test]
    fn parses_aliases_and_skips_hashed_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("known_hosts");
        std::fs::write(
            &path,
            "# comment\n\
             host-a.example.com,10.0.0.12 ssh-ed25519 QUJDREVG\n\
             |1|hashedhash= ssh-rsa QUJDREVG\n",
        )
        .unwrap();

        let store = KnownHostsStore::with_path(path);
        let hosts = store.hosts.read();
        assert!(hosts.contains_key("host-a.example.com"));
        assert!(hosts.contains_key("10.0.0.12"));
        assert_eq!(hosts.len(), 2);
    }
}
