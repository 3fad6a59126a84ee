//! Port interfaces between the engine and the native backend.
//!
//! Ports define the command surface the engine is allowed to call. The
//! backend owning clip storage, recording and device enumeration sits behind
//! these traits; `cr-infra` provides filesystem-backed implementations and
//! tests substitute mocks. Every command may fail, and failure is always an
//! error value at this boundary, never a silent default.

mod audio;
mod clip_store;
mod settings_store;

pub use audio::{AudioDevice, AudioDevicesPort};
pub use clip_store::ClipStorePort;
pub use settings_store::SettingsStorePort;
