//! Settings diff tracker.
//!
//! Holds a pending-changes overlay on top of the last-confirmed settings
//! values and commits one category at a time. Commits are per-key backend
//! calls: keys succeed or fail independently, a failed key simply stays
//! pending so the user can retry it, and nothing that already committed is
//! ever rolled back.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use cr_core::ports::{AudioDevicesPort, SettingsStorePort};
use cr_core::settings::{
    descriptor_catalog, SettingCategory, SettingDescriptor, SettingValue,
};
use cr_core::EngineError;

/// What a category commit did.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CommitSummary {
    pub committed: Vec<String>,
    /// Keys that failed, with the backend's message. They remain pending.
    pub failed: Vec<(String, String)>,
    /// True when the commit was ignored because one for the same category
    /// was already in flight.
    pub rejected: bool,
}

impl CommitSummary {
    fn rejected() -> Self {
        Self {
            rejected: true,
            ..Self::default()
        }
    }
}

pub struct SettingsEditor {
    store: Arc<dyn SettingsStorePort>,
    descriptors: Vec<SettingDescriptor>,
    pending: HashMap<String, SettingValue>,
    committing: HashSet<SettingCategory>,
}

impl SettingsEditor {
    /// Load the settings view: pull the backend snapshot once and merge its
    /// confirmed values over the descriptor catalog's defaults. Values whose
    /// shape does not fit the descriptor's kind are ignored (the default
    /// stands in) rather than poisoning the panel.
    pub async fn load(store: Arc<dyn SettingsStorePort>) -> Result<Self, EngineError> {
        let snapshot = store.pull_settings().await.map_err(EngineError::backend)?;
        let mut descriptors = descriptor_catalog();
        for descriptor in &mut descriptors {
            if let Some(value) = snapshot.get(&descriptor.key).and_then(SettingValue::from_json)
            {
                if descriptor.kind.accepts(&value) {
                    descriptor.confirmed = value;
                } else {
                    log::warn!(
                        "stored value for {} has the wrong shape, using default",
                        descriptor.key
                    );
                }
            }
        }
        Ok(Self {
            store,
            descriptors,
            pending: HashMap::new(),
            committing: HashSet::new(),
        })
    }

    pub fn descriptor(&self, key: &str) -> Option<&SettingDescriptor> {
        self.descriptors.iter().find(|d| d.key == key)
    }

    pub fn descriptors_in(
        &self,
        category: SettingCategory,
    ) -> impl Iterator<Item = &SettingDescriptor> {
        self.descriptors.iter().filter(move |d| d.category == category)
    }

    /// Value the panel should display for `key`: pending override if there
    /// is one, else the last confirmed value.
    pub fn effective(&self, key: &str) -> Option<SettingValue> {
        if let Some(pending) = self.pending.get(key) {
            return Some(pending.clone());
        }
        self.descriptor(key).map(|d| d.confirmed.clone())
    }

    /// Stage a typed candidate value. Shape mismatches and unknown keys are
    /// dropped. Staging the confirmed value again un-stages the key, so the
    /// overlay only ever holds real diffs.
    pub fn set_pending(&mut self, key: &str, value: SettingValue) {
        let Some(descriptor) = self.descriptor(key) else {
            log::debug!("ignoring edit of unknown setting {key}");
            return;
        };
        if !descriptor.kind.accepts(&value) {
            return;
        }
        if descriptor.confirmed == value {
            self.pending.remove(key);
        } else {
            self.pending.insert(key.to_string(), value);
        }
    }

    /// Stage a raw text edit, validated by the descriptor's kind. A numeric
    /// field whose input does not parse is a silent no-op: the previously
    /// effective value stays, garbage is never stored.
    pub fn set_pending_text(&mut self, key: &str, raw: &str) {
        let Some(descriptor) = self.descriptor(key) else {
            return;
        };
        if let Some(value) = descriptor.kind.coerce_text(raw) {
            self.set_pending(key, value);
        }
    }

    pub fn has_pending(&self, category: SettingCategory) -> bool {
        self.pending
            .keys()
            .any(|key| self.descriptor(key).is_some_and(|d| d.category == category))
    }

    pub fn is_committing(&self, category: SettingCategory) -> bool {
        self.committing.contains(&category)
    }

    /// Persist every pending key of `category`, one independent backend
    /// call per key. Succeeded keys are cleared from the overlay and become
    /// confirmed; failed keys stay pending for retry. Returns a rejected
    /// summary without touching anything if a commit for this category is
    /// already in flight.
    pub async fn commit_category(&mut self, category: SettingCategory) -> CommitSummary {
        if !self.committing.insert(category) {
            return CommitSummary::rejected();
        }

        let keys: Vec<String> = self
            .pending
            .keys()
            .filter(|key| self.descriptor(key).is_some_and(|d| d.category == category))
            .cloned()
            .collect();

        let mut summary = CommitSummary::default();
        for key in keys {
            let Some(value) = self.pending.get(&key).cloned() else {
                continue;
            };
            match self.store.update_settings(&key, value.as_json()).await {
                Ok(()) => {
                    self.pending.remove(&key);
                    if let Some(descriptor) =
                        self.descriptors.iter_mut().find(|d| d.key == key)
                    {
                        descriptor.confirmed = value;
                    }
                    summary.committed.push(key);
                }
                Err(err) => {
                    log::warn!("commit of {key} failed, leaving it pending: {err:#}");
                    summary.failed.push((key, err.to_string()));
                }
            }
        }

        self.committing.remove(&category);
        summary
    }

    /// Fill the microphone picker's option set from the enumerated capture
    /// sources. Enumeration failure surfaces as an error and leaves the
    /// existing options untouched.
    pub async fn refresh_device_options(
        &mut self,
        audio: &dyn AudioDevicesPort,
    ) -> Result<(), EngineError> {
        let devices = audio.all_devices().await.map_err(EngineError::backend)?;
        if let Some(descriptor) = self
            .descriptors
            .iter_mut()
            .find(|d| d.key == "microphone_device")
        {
            descriptor.options =
                Some(devices.into_iter().map(|device| device.node_name).collect());
        }
        Ok(())
    }

    #[cfg(test)]
    fn force_committing(&mut self, category: SettingCategory) {
        self.committing.insert(category);
    }
}
