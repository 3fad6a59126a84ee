//! Built-in descriptor catalog.
//!
//! One descriptor per persisted setting key. Defaults mirror the recorder's
//! shipped configuration; confirmed values get overwritten from the backend
//! snapshot when the settings view mounts.

use super::model::{SettingCategory, SettingDescriptor, SettingKind, SettingValue};

pub fn descriptor_catalog() -> Vec<SettingDescriptor> {
    use SettingCategory::*;
    use SettingKind::*;

    vec![
        // Recording
        SettingDescriptor::new(
            "clip_length_s",
            Recording,
            Number,
            SettingValue::Number(120.0),
        )
        .with_tooltip("Length of the replay buffer kept in memory, in seconds"),
        SettingDescriptor::new(
            "clip_resolution",
            Recording,
            Select,
            SettingValue::Text("1920x1080".into()),
        )
        .with_options(&["2560x1440", "1920x1080", "1280x720"]),
        SettingDescriptor::new("clip_fps", Recording, Number, SettingValue::Number(60.0)),
        SettingDescriptor::new(
            "video_bitrate",
            Recording,
            Number,
            SettingValue::Number(15000.0),
        )
        .with_tooltip("Target video bitrate in kbit/s"),
        SettingDescriptor::new(
            "video_codec",
            Recording,
            Select,
            SettingValue::Text("h264".into()),
        )
        .with_options(&["h264", "h265", "av1"]),
        SettingDescriptor::new(
            "audio_codec",
            Recording,
            Select,
            SettingValue::Text("aac".into()),
        )
        .with_options(&["aac", "opus"]),
        // Audio
        SettingDescriptor::new(
            "include_desktop_audio",
            Audio,
            Boolean,
            SettingValue::Bool(true),
        ),
        SettingDescriptor::new(
            "include_mic_audio",
            Audio,
            Boolean,
            SettingValue::Bool(true),
        ),
        SettingDescriptor::new(
            "microphone_device",
            Audio,
            Select,
            SettingValue::Text("default".into()),
        )
        .with_tooltip("Capture source used when mic audio is enabled"),
        // Storage
        SettingDescriptor::new(
            "save_path_from_home",
            Storage,
            Text,
            SettingValue::Text("Videos/cliprack".into()),
        )
        .with_tooltip("Where saved clips land, relative to your home directory"),
        SettingDescriptor::new(
            "clip_name_formatting",
            Storage,
            Text,
            SettingValue::Text("%Y-%m-%d_%H-%M-%S".into()),
        ),
        // Shortcuts
        SettingDescriptor::new(
            "save_shortcut",
            Shortcuts,
            Text,
            SettingValue::Text("Alt+C".into()),
        ),
        SettingDescriptor::new(
            "open_gui_shortcut",
            Shortcuts,
            Text,
            SettingValue::Text("Ctrl+Alt+C".into()),
        ),
        // Interface
        SettingDescriptor::new(
            "toggle_notifications",
            Interface,
            Boolean,
            SettingValue::Bool(true),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keys_are_unique() {
        let catalog = descriptor_catalog();
        let keys: HashSet<&str> = catalog.iter().map(|d| d.key.as_str()).collect();
        assert_eq!(keys.len(), catalog.len());
    }

    #[test]
    fn defaults_match_their_kind() {
        for descriptor in descriptor_catalog() {
            assert!(
                descriptor.kind.accepts(&descriptor.default),
                "default of {} does not fit its kind",
                descriptor.key
            );
        }
    }

    #[test]
    fn selects_carry_options_or_are_runtime_populated() {
        for descriptor in descriptor_catalog() {
            if descriptor.kind == SettingKind::Select && descriptor.key != "microphone_device" {
                assert!(descriptor.options.as_ref().is_some_and(|o| !o.is_empty()));
            }
        }
    }
}
