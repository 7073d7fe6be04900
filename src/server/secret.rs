//! Session secret provisioning.
//!
//! # Design Decisions
//! - Dev mode returns a fixed constant so local sessions survive
//!   restarts; no storage I/O at all
//! - Prod mode provisions a secret exactly once per workspace: the
//!   persisted value always wins, a fresh one is generated only on a
//!   lookup miss
//! - Any storage failure is fatal to the caller; the server must not
//!   start without a stable secret

use uuid::Uuid;

use crate::config::Profile;
use crate::store::{SettingStore, StoreError, WorkspaceSetting, WorkspaceSettingKey};

/// Fixed secret for development mode.
pub const DEV_SECRET: &str = "pinstack";

/// Get-or-create the durable session-signing secret.
pub async fn provision_secret(
    profile: &Profile,
    store: &dyn SettingStore,
) -> Result<String, StoreError> {
    if profile.is_dev() {
        return Ok(DEV_SECRET.to_string());
    }

    if let Some(setting) = store
        .get_workspace_setting(WorkspaceSettingKey::SecretSession)
        .await?
    {
        return Ok(setting.value);
    }

    let stored = store
        .upsert_workspace_setting(WorkspaceSetting {
            key: WorkspaceSettingKey::SecretSession,
            value: Uuid::new_v4().to_string(),
        })
        .await?;
    Ok(stored.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Mode;
    use crate::store::MemoryStore;
    use async_trait::async_trait;

    fn profile(mode: Mode) -> Profile {
        Profile {
            mode,
            ..Profile::default()
        }
    }

    /// Store that fails every operation, to prove dev mode does no I/O.
    struct UnreachableStore;

    #[async_trait]
    impl SettingStore for UnreachableStore {
        async fn get_workspace_setting(
            &self,
            _key: WorkspaceSettingKey,
        ) -> Result<Option<WorkspaceSetting>, StoreError> {
            Err(StoreError::Closed)
        }

        async fn upsert_workspace_setting(
            &self,
            _setting: WorkspaceSetting,
        ) -> Result<WorkspaceSetting, StoreError> {
            Err(StoreError::Closed)
        }

        async fn close(&self) -> Result<(), StoreError> {
            Err(StoreError::Closed)
        }
    }

    #[tokio::test]
    async fn dev_mode_returns_constant_without_touching_store() {
        let secret = provision_secret(&profile(Mode::Dev), &UnreachableStore)
            .await
            .unwrap();
        assert_eq!(secret, DEV_SECRET);
    }

    #[tokio::test]
    async fn prod_provisioning_is_idempotent() {
        let store = MemoryStore::new();
        let first = provision_secret(&profile(Mode::Prod), &store).await.unwrap();
        let second = provision_secret(&profile(Mode::Prod), &store).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.len(), 1, "exactly one setting record created");
        assert_ne!(first, DEV_SECRET);
    }

    #[tokio::test]
    async fn existing_secret_is_never_regenerated() {
        let store = MemoryStore::new();
        store
            .upsert_workspace_setting(WorkspaceSetting {
                key: WorkspaceSettingKey::SecretSession,
                value: "already-provisioned".into(),
            })
            .await
            .unwrap();

        let secret = provision_secret(&profile(Mode::Prod), &store).await.unwrap();
        assert_eq!(secret, "already-provisioned");
    }

    #[tokio::test]
    async fn store_failure_is_fatal() {
        let result = provision_secret(&profile(Mode::Prod), &UnreachableStore).await;
        assert!(result.is_err());
    }
}
