// JSON file persistence for guild settings
// Writes go to a .tmp sibling first and are renamed into place.

use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::features::settings_store::SettingsStore;
use crate::models::settings::StoredSettings;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error on {}: {}", path.display(), source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub struct SettingsFile {
    path: PathBuf,
    // Serializes saves so an older snapshot never overwrites a newer one
    write_lock: Mutex<()>,
}

impl SettingsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(path: &Path, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Read the file. A missing file is an empty store.
    pub async fn load(&self) -> Result<StoredSettings, StorageError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings file at {}", self.path.display());
                return Ok(StoredSettings::new());
            }
            Err(e) => return Err(Self::io_error(&self.path, e)),
        };

        let stored: StoredSettings = serde_json::from_str(&content)?;
        info!("Loaded settings for {} guilds", stored.len());
        Ok(stored)
    }

    /// Startup wrapper around `load`: unreadable files are logged and ignored
    pub async fn load_store(&self) -> SettingsStore {
        match self.load().await {
            Ok(stored) => SettingsStore::from_stored(stored),
            Err(e) => {
                warn!("Starting with empty settings: {}", e);
                SettingsStore::new()
            }
        }
    }

    /// Snapshot the store and write it out
    pub async fn save(&self, store: &SettingsStore) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        // Snapshot under the lock so saves land in mutation order
        let json = serde_json::to_string_pretty(&store.to_stored())?;

        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                tokio::fs::create_dir_all(dir)
                    .await
                    .map_err(|e| Self::io_error(dir, e))?;
            }
        }

        let temp = self.path.with_extension("tmp");
        if let Err(e) = tokio::fs::write(&temp, json).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(Self::io_error(&temp, e));
        }
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| Self::io_error(&self.path, e))?;

        debug!("Saved settings to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::catalog::tests::sample_catalog;
    use crate::features::resolution;

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let file = SettingsFile::new(dir.path().join("guild_settings.json"));
        assert!(file.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let file = SettingsFile::new(dir.path().join("nested").join("guild_settings.json"));

        let catalog = sample_catalog();
        let store = SettingsStore::new();
        let _ = store.update(11, |c| resolution::set_guild_default_system(&catalog, c, "CoC"));
        let _ = store.update(11, |c| resolution::set_channel_message_roll(c, 22, true));

        file.save(&store).await.unwrap();
        assert!(!file.path().with_extension("tmp").exists());

        let reloaded = file.load_store().await;
        assert_eq!(reloaded.get(11), store.get(11));
    }

    #[tokio::test]
    async fn test_written_format() {
        let dir = tempfile::tempdir().unwrap();
        let file = SettingsFile::new(dir.path().join("guild_settings.json"));
        let store = SettingsStore::new();
        store.guild_joined(3);
        file.save(&store).await.unwrap();

        let raw = std::fs::read_to_string(file.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "3": { "guild": { "default": null, "message_roll": false }, "channel": {} } })
        );
    }

    #[tokio::test]
    async fn test_corrupt_file_falls_back_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guild_settings.json");
        std::fs::write(&path, "{ not json").unwrap();

        let file = SettingsFile::new(&path);
        assert!(matches!(file.load().await, Err(StorageError::Json(_))));
        assert!(file.load_store().await.is_empty());
    }
}
