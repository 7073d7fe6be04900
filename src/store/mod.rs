//! Persistence seam.
//!
//! The server core never runs queries itself; it talks to a
//! [`SettingStore`] handle that a storage backend implements. The handle
//! is shared by every route handler and closed exactly once, by the
//! lifecycle manager, after the general listener has stopped.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Well-known workspace setting identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkspaceSettingKey {
    /// Secret used to sign session tokens.
    SecretSession,
    /// Externally managed license key.
    LicenseKey,
}

/// A persisted key-value record scoped to the whole deployed instance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WorkspaceSetting {
    pub key: WorkspaceSettingKey,
    pub value: String,
}

/// Error type for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt settings payload: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("store is closed")]
    Closed,
}

/// Handle to the persistence service.
///
/// Upserts use create-if-absent, overwrite-if-present-with-same-key
/// semantics. All methods fail with [`StoreError::Closed`] once the
/// handle has been released.
#[async_trait]
pub trait SettingStore: Send + Sync + 'static {
    /// Look up a workspace setting by its well-known key.
    async fn get_workspace_setting(
        &self,
        key: WorkspaceSettingKey,
    ) -> Result<Option<WorkspaceSetting>, StoreError>;

    /// Create or overwrite a workspace setting, returning the stored value.
    async fn upsert_workspace_setting(
        &self,
        setting: WorkspaceSetting,
    ) -> Result<WorkspaceSetting, StoreError>;

    /// Release the handle. Further calls fail with [`StoreError::Closed`].
    async fn close(&self) -> Result<(), StoreError>;
}
