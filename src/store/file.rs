//! File-backed setting store.
//!
//! # Responsibilities
//! - Load the settings file once at open
//! - Rewrite the file on every upsert
//! - Reject operations after close
//!
//! # Design Decisions
//! - One small JSON document; a full rewrite per upsert is fine because
//!   settings are written at most a handful of times per deployment
//! - Reads are served from memory, so lookups never touch disk

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::store::{SettingStore, StoreError, WorkspaceSetting, WorkspaceSettingKey};

#[derive(Debug, Default)]
struct Inner {
    settings: HashMap<WorkspaceSettingKey, String>,
    closed: bool,
}

/// Setting store persisted as a JSON file under the data directory.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    inner: Mutex<Inner>,
}

impl FileStore {
    /// Open the store, loading any existing settings file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let settings = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(StoreError::Io(e)),
        };

        tracing::debug!(path = %path.display(), settings = settings.len(), "settings store opened");
        Ok(Self {
            path,
            inner: Mutex::new(Inner {
                settings,
                closed: false,
            }),
        })
    }

    async fn persist(&self, settings: &HashMap<WorkspaceSettingKey, String>) -> Result<(), StoreError> {
        let payload = serde_json::to_vec_pretty(settings)?;
        tokio::fs::write(&self.path, payload).await?;
        Ok(())
    }
}

#[async_trait]
impl SettingStore for FileStore {
    async fn get_workspace_setting(
        &self,
        key: WorkspaceSettingKey,
    ) -> Result<Option<WorkspaceSetting>, StoreError> {
        let inner = self.inner.lock().await;
        if inner.closed {
            return Err(StoreError::Closed);
        }
        Ok(inner
            .settings
            .get(&key)
            .map(|value| WorkspaceSetting {
                key,
                value: value.clone(),
            }))
    }

    async fn upsert_workspace_setting(
        &self,
        setting: WorkspaceSetting,
    ) -> Result<WorkspaceSetting, StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.closed {
            return Err(StoreError::Closed);
        }
        inner.settings.insert(setting.key, setting.value.clone());
        self.persist(&inner.settings).await?;
        Ok(setting)
    }

    async fn close(&self) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.closed = true;
        tracing::debug!(path = %self.path.display(), "settings store closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path() -> PathBuf {
        std::env::temp_dir().join(format!("pinstack-settings-{}.json", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn settings_survive_reopen() {
        let path = scratch_path();

        let store = FileStore::open(&path).unwrap();
        store
            .upsert_workspace_setting(WorkspaceSetting {
                key: WorkspaceSettingKey::SecretSession,
                value: "abc".into(),
            })
            .await
            .unwrap();
        store.close().await.unwrap();

        let reopened = FileStore::open(&path).unwrap();
        let setting = reopened
            .get_workspace_setting(WorkspaceSettingKey::SecretSession)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(setting.value, "abc");

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn missing_file_opens_empty() {
        let path = scratch_path();
        let store = FileStore::open(&path).unwrap();
        let setting = store
            .get_workspace_setting(WorkspaceSettingKey::LicenseKey)
            .await
            .unwrap();
        assert!(setting.is_none());
    }
}
