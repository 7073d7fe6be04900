//! Subscription state loading.
//!
//! Loading is best-effort at start: a missing or unreadable subscription
//! never stops the server. Validation of the key itself happens in an
//! external service.

use std::sync::Arc;

use crate::store::{SettingStore, StoreError, WorkspaceSettingKey};

/// Externally managed subscription state.
#[derive(Debug, Clone)]
pub struct Subscription {
    pub key: String,
}

pub struct LicenseService {
    store: Arc<dyn SettingStore>,
}

impl LicenseService {
    pub fn new(store: Arc<dyn SettingStore>) -> Self {
        Self { store }
    }

    /// Load the persisted subscription, if any.
    pub async fn load_subscription(&self) -> Result<Option<Subscription>, StoreError> {
        let setting = self
            .store
            .get_workspace_setting(WorkspaceSettingKey::LicenseKey)
            .await?;
        Ok(setting.map(|s| Subscription { key: s.value }))
    }
}
