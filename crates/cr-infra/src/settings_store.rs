//! JSON file settings persistence.
//!
//! One pretty-printed JSON object, one key per setting. Values are
//! validated against the descriptor catalog before they touch the file, so
//! a bad write request never corrupts stored settings. Writes go through a
//! temp file and rename.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::fs;

use cr_core::ports::SettingsStorePort;
use cr_core::settings::{descriptor_catalog, SettingKind};

pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location in the user's config directory.
    pub fn default_location() -> Result<Self> {
        let config = dirs::config_dir().context("config directory not found")?;
        Ok(Self::new(config.join("cliprack").join("settings.json")))
    }

    fn defaults() -> Map<String, Value> {
        descriptor_catalog()
            .into_iter()
            .map(|d| (d.key, d.default.as_json()))
            .collect()
    }

    async fn read_stored(&self) -> Result<Map<String, Value>> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => serde_json::from_str(&content)
                .with_context(|| format!("parse settings failed: {}", self.path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => {
                Err(e).with_context(|| format!("read settings failed: {}", self.path.display()))
            }
        }
    }

    async fn atomic_write(&self, content: &str) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("create settings dir failed: {}", dir.display()))?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content)
            .await
            .with_context(|| format!("write temp settings failed: {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path).await.with_context(|| {
            format!(
                "rename temp settings to target failed: {} -> {}",
                tmp_path.display(),
                self.path.display()
            )
        })
    }
}

/// Normalize a keyboard shortcut: spaces stripped, `+`-separated, any of
/// Ctrl/Alt/Shift/Meta as modifiers and exactly one alphanumeric key.
fn normalize_shortcut(raw: &str) -> Result<String> {
    let cleaned = raw.replace(' ', "");
    if cleaned.is_empty() {
        bail!("shortcut cannot be empty");
    }

    const MODIFIERS: [&str; 4] = ["Ctrl", "Alt", "Shift", "Meta"];
    let mut has_key = false;
    for part in cleaned.split('+') {
        if MODIFIERS.contains(&part) {
            continue;
        }
        if part.len() == 1 && part.chars().all(|c| c.is_ascii_alphanumeric()) {
            if has_key {
                bail!("only one non-modifier key allowed");
            }
            has_key = true;
        } else {
            bail!("invalid key in shortcut: {part}");
        }
    }
    if !has_key {
        bail!("shortcut needs a non-modifier key");
    }
    Ok(cleaned)
}

/// Normalize a save path: stored relative to home, leading slashes and an
/// explicit `home/<user>` prefix stripped.
fn normalize_save_path(raw: &str) -> String {
    let cleaned = raw.trim().trim_start_matches('/');
    if let Some(rest) = cleaned.strip_prefix("home/") {
        // Drop the user segment as well.
        match rest.split_once('/') {
            Some((_, tail)) => tail.to_string(),
            None => String::new(),
        }
    } else {
        cleaned.to_string()
    }
}

#[async_trait]
impl SettingsStorePort for JsonSettingsStore {
    async fn pull_settings(&self) -> Result<Map<String, Value>> {
        let mut map = Self::defaults();
        for (key, value) in self.read_stored().await? {
            map.insert(key, value);
        }
        Ok(map)
    }

    async fn update_settings(&self, key: &str, value: Value) -> Result<()> {
        let catalog = descriptor_catalog();
        let Some(descriptor) = catalog.iter().find(|d| d.key == key) else {
            bail!("unknown settings key: {key}");
        };

        let validated = match descriptor.kind {
            SettingKind::Boolean => {
                Value::from(value.as_bool().context("expected a boolean")?)
            }
            SettingKind::Number => Value::from(value.as_f64().context("expected a number")?),
            SettingKind::Text | SettingKind::Select => {
                let text = value.as_str().context("expected a string")?;
                match key {
                    "save_shortcut" | "open_gui_shortcut" => {
                        Value::from(normalize_shortcut(text)?)
                    }
                    "save_path_from_home" => Value::from(normalize_save_path(text)),
                    _ => Value::from(text),
                }
            }
        };

        let mut stored = self.read_stored().await?;
        stored.insert(key.to_string(), validated);
        let content = serde_json::to_string_pretty(&Value::Object(stored))
            .context("serialize settings failed")?;
        self.atomic_write(&content).await
    }
}
