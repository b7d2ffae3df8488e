//! Configuration storage under `~/.mediamover`.

use std::path::PathBuf;

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::warn;

use super::types::{ConfigFile, CONFIG_VERSION};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to determine home directory")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config version {found} is newer than supported {supported}")]
    VersionTooNew { found: u32, supported: u32 },
}

/// `~/.mediamover`
pub fn config_dir() -> Result<PathBuf, StorageError> {
    dirs::home_dir()
        .map(|home| home.join(".mediamover"))
        .ok_or(StorageError::NoConfigDir)
}

fn config_file() -> Result<PathBuf, StorageError> {
    Ok(config_dir()?.join("config.json"))
}

/// Reads and writes the config document.
pub struct ConfigStorage {
    path: PathBuf,
}

impl ConfigStorage {
    pub fn new() -> Result<Self, StorageError> {
        Ok(Self {
            path: config_file()?,
        })
    }

    /// Use a custom path (the `config_file=` CLI override, and tests).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    async fn ensure_dir(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Load the config. A missing file yields defaults; a corrupt file
    /// is backed up and yields defaults with a warning. Only a config
    /// written by a newer version is an error.
    pub async fn load(&self) -> Result<ConfigFile, StorageError> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(ConfigFile::default())
            }
            Err(e) => return Err(StorageError::Io(e)),
        };

        match serde_json::from_str::<ConfigFile>(&contents) {
            Ok(config) => {
                if config.version > CONFIG_VERSION {
                    return Err(StorageError::VersionTooNew {
                        found: config.version,
                        supported: CONFIG_VERSION,
                    });
                }
                Ok(config)
            }
            Err(e) => {
                warn!("Config file corrupted: {}", e);
                match self.backup().await {
                    Ok(backup_path) => {
                        warn!("Corrupted config backed up to {:?}, using defaults", backup_path)
                    }
                    Err(backup_err) => {
                        warn!("Failed to back up corrupted config: {}", backup_err)
                    }
                }
                Ok(ConfigFile::default())
            }
        }
    }

    /// Save the config. The album cache is cleared first: it is derived
    /// state that must never survive in the document.
    pub async fn save(&self, config: &mut ConfigFile) -> Result<(), StorageError> {
        config.library.clear_album_cache();
        self.ensure_dir().await?;

        // Temp file + rename so a crash mid-write never truncates the
        // previous config.
        let temp_path = self.path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(config)?;

        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(json.as_bytes()).await?;
        file.sync_all().await?;
        fs::rename(&temp_path, &self.path).await?;

        Ok(())
    }

    async fn backup(&self) -> Result<PathBuf, StorageError> {
        let backup_path = self.path.with_extension(format!(
            "json.backup.{}",
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        ));
        if fs::metadata(&self.path).await.is_ok() {
            fs::copy(&self.path, &backup_path).await?;
        }
        Ok(backup_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::RemoteSite;

    #[tokio::test]
    async fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ConfigStorage::with_path(dir.path().join("config.json"));

        let config = storage.load().await.unwrap();
        assert_eq!(config.version, CONFIG_VERSION);
        assert!(config.sites.is_empty());
        assert!(config.library.directories().is_empty());
    }

    #[tokio::test]
    async fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ConfigStorage::with_path(dir.path().join("sub/config.json"));

        let mut config = ConfigFile::default();
        config.library.add_dir("/music".to_string());
        config.sites.push(RemoteSite::new(
            "attic".to_string(),
            "dan".to_string(),
            "music.example.com".to_string(),
            2222,
        ));

        storage.save(&mut config).await.unwrap();

        let loaded = storage.load().await.unwrap();
        assert_eq!(loaded.library.directories(), ["/music"]);
        assert_eq!(loaded.sites.len(), 1);
        assert_eq!(loaded.sites[0].hostname, "music.example.com");
        assert_eq!(loaded.sites[0].port, 2222);
        assert_eq!(loaded.sites[0].id, config.sites[0].id);
    }

    #[tokio::test]
    async fn corrupt_file_is_backed_up_and_defaults_used() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let storage = ConfigStorage::with_path(path);
        let config = storage.load().await.unwrap();
        assert!(config.sites.is_empty());

        let backups: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains("backup"))
            .collect();
        assert_eq!(backups.len(), 1);
    }

    #[tokio::test]
    async fn newer_version_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        tokio::fs::write(&path, r#"{"version": 99}"#).await.unwrap();

        let storage = ConfigStorage::with_path(path);
        assert!(matches!(
            storage.load().await,
            Err(StorageError::VersionTooNew { found: 99, .. })
        ));
    }
}
