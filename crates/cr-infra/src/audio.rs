//! Capture source enumeration through PulseAudio's `pactl`.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

use cr_core::ports::{AudioDevice, AudioDevicesPort};

/// Lists sources with `pactl --format=json list sources`. Requires a running
/// PulseAudio or PipeWire-Pulse server; any command or parse failure is an
/// error, never an empty device list.
pub struct PactlAudioDevices;

#[derive(Debug, Deserialize)]
struct PactlSource {
    index: u32,
    name: String,
    description: String,
}

fn parse_sources(stdout: &[u8]) -> Result<Vec<AudioDevice>> {
    let sources: Vec<PactlSource> =
        serde_json::from_slice(stdout).context("parse pactl source list failed")?;
    Ok(sources
        .into_iter()
        .map(|source| AudioDevice {
            name: source.description,
            id: source.index,
            node_name: source.name,
        })
        .collect())
}

#[async_trait]
impl AudioDevicesPort for PactlAudioDevices {
    async fn all_devices(&self) -> Result<Vec<AudioDevice>> {
        let output = Command::new("pactl")
            .args(["--format=json", "list", "sources"])
            .output()
            .await
            .context("run pactl failed")?;
        if !output.status.success() {
            bail!(
                "pactl exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        parse_sources(&output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sources_map_to_devices() {
        let stdout = br#"[
            {
                "index": 47,
                "name": "alsa_input.pci-0000_00_1f.3.analog-stereo",
                "description": "Built-in Audio Analog Stereo",
                "mute": false
            },
            {
                "index": 51,
                "name": "alsa_input.usb-mic.mono-fallback",
                "description": "USB Microphone",
                "mute": true
            }
        ]"#;

        let devices = parse_sources(stdout).unwrap();
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].id, 47);
        assert_eq!(devices[0].name, "Built-in Audio Analog Stereo");
        assert_eq!(
            devices[0].node_name,
            "alsa_input.pci-0000_00_1f.3.analog-stereo"
        );
    }

    #[test]
    fn malformed_output_is_an_error() {
        assert!(parse_sources(b"pactl: command not understood").is_err());
    }
}
