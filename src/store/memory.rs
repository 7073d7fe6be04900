//! In-memory setting store.
//!
//! Backs tests and throwaway dev runs; nothing survives the process.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::store::{SettingStore, StoreError, WorkspaceSetting, WorkspaceSettingKey};

/// DashMap-backed store with an observable close state.
#[derive(Debug, Default)]
pub struct MemoryStore {
    settings: DashMap<WorkspaceSettingKey, String>,
    closed: AtomicBool,
    close_count: AtomicU32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored settings.
    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// How many times `close` has been called.
    pub fn close_count(&self) -> u32 {
        self.close_count.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.is_closed() {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl SettingStore for MemoryStore {
    async fn get_workspace_setting(
        &self,
        key: WorkspaceSettingKey,
    ) -> Result<Option<WorkspaceSetting>, StoreError> {
        self.ensure_open()?;
        Ok(self.settings.get(&key).map(|entry| WorkspaceSetting {
            key,
            value: entry.value().clone(),
        }))
    }

    async fn upsert_workspace_setting(
        &self,
        setting: WorkspaceSetting,
    ) -> Result<WorkspaceSetting, StoreError> {
        self.ensure_open()?;
        self.settings.insert(setting.key, setting.value.clone());
        Ok(setting)
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.close_count.fetch_add(1, Ordering::SeqCst);
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_overwrites_existing_key() {
        let store = MemoryStore::new();
        store
            .upsert_workspace_setting(WorkspaceSetting {
                key: WorkspaceSettingKey::LicenseKey,
                value: "first".into(),
            })
            .await
            .unwrap();
        store
            .upsert_workspace_setting(WorkspaceSetting {
                key: WorkspaceSettingKey::LicenseKey,
                value: "second".into(),
            })
            .await
            .unwrap();

        let setting = store
            .get_workspace_setting(WorkspaceSettingKey::LicenseKey)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(setting.value, "second");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn closed_store_rejects_reads() {
        let store = MemoryStore::new();
        store.close().await.unwrap();
        let err = store
            .get_workspace_setting(WorkspaceSettingKey::SecretSession)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Closed));
    }
}
