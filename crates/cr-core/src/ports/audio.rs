use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One capture source as the audio server reports it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AudioDevice {
    /// Human-readable description, shown in the device picker.
    pub name: String,
    pub id: u32,
    /// Stable node name, the value actually stored in settings.
    pub node_name: String,
}

/// Device enumeration for the microphone picker in the settings panel.
#[async_trait]
pub trait AudioDevicesPort: Send + Sync {
    async fn all_devices(&self) -> Result<Vec<AudioDevice>>;
}
