use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Backend command surface for persisted settings.
#[async_trait]
pub trait SettingsStorePort: Send + Sync {
    /// Snapshot of every persisted setting, keyed by setting key.
    async fn pull_settings(&self) -> Result<Map<String, Value>>;

    /// Write a single key. The value is a JSON scalar; the store validates
    /// it against the key's expected shape and rejects mismatches.
    async fn update_settings(&self, key: &str, value: Value) -> Result<()>;
}
