//! Native backend adapters: filesystem clip storage, JSON settings
//! persistence and PulseAudio device enumeration behind the `cr-core`
//! ports.

pub mod audio;
pub mod clip_store;
pub mod settings_store;

pub use audio::PactlAudioDevices;
pub use clip_store::FsClipStore;
pub use settings_store::JsonSettingsStore;
