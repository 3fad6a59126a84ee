//! Optimistic mutation coordinator.
//!
//! Every mutation runs the same three-phase transaction: snapshot the cache
//! entry for the active key, apply the expected outcome to the cache so the
//! view updates immediately, then commit through the backend port. A failed
//! commit restores the exact snapshot; a confirmed commit either re-marks
//! the entry fresh or invalidates it when pagination boundaries may have
//! shifted.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use cr_core::clip::{ClipPath, PageResult};
use cr_core::ports::ClipStorePort;
use cr_core::EngineError;

use super::query_cache::{QueryCache, QueryKey};

/// A user-initiated edit of one clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipMutation {
    Delete { path: ClipPath },
    Rename { path: ClipPath, new_name: String },
    ToggleLike { path: ClipPath },
}

impl ClipMutation {
    /// Identity the mutation targets. Serialization of mutations is
    /// per-identity, keyed on this.
    pub fn path(&self) -> &ClipPath {
        match self {
            ClipMutation::Delete { path }
            | ClipMutation::Rename { path, .. }
            | ClipMutation::ToggleLike { path } => path,
        }
    }

    /// Transform a cached page to the expected post-commit shape.
    fn apply_to(&self, page: &mut PageResult) {
        match self {
            ClipMutation::Delete { path } => {
                let before = page.clips.len();
                page.clips.retain(|clip| &clip.path != path);
                if page.clips.len() < before {
                    page.total_clips = page.total_clips.saturating_sub(1);
                }
            }
            ClipMutation::Rename { path, new_name } => {
                if let Some(clip) = page.clips.iter_mut().find(|c| &c.path == path) {
                    // Same file name the backend will produce, so the
                    // optimistic identity matches the committed one.
                    let file_name = clip_file_name(new_name);
                    clip.name = file_name
                        .strip_suffix(".mp4")
                        .unwrap_or(&file_name)
                        .to_string();
                    clip.path = path.renamed(&file_name);
                }
            }
            ClipMutation::ToggleLike { path } => {
                if let Some(clip) = page.clips.iter_mut().find(|c| &c.path == path) {
                    clip.liked = !clip.liked;
                }
            }
        }
    }
}

/// Rename target as a full clip file name, container extension included.
fn clip_file_name(new_name: &str) -> String {
    let trimmed = new_name.trim();
    if trimmed.ends_with(".mp4") {
        trimmed.to_string()
    } else {
        format!("{trimmed}.mp4")
    }
}

/// The backend command a mutation resolves to, fixed before the optimistic
/// apply so commit needs nothing from the (already mutated) cache.
enum Command {
    Delete(ClipPath),
    Rename(ClipPath, String),
    Like { name: String, liked: bool },
}

pub struct MutationCoordinator {
    store: Arc<dyn ClipStorePort>,
    cache: Arc<QueryCache>,
    /// One gate per clip identity: a second mutation against the same clip
    /// waits for the first to resolve, so rollbacks never diverge.
    identity_gates: Mutex<HashMap<ClipPath, Arc<tokio::sync::Mutex<()>>>>,
}

impl MutationCoordinator {
    pub fn new(store: Arc<dyn ClipStorePort>, cache: Arc<QueryCache>) -> Self {
        Self {
            store,
            cache,
            identity_gates: Mutex::new(HashMap::new()),
        }
    }

    /// Run `mutation` against the entry at `key`.
    ///
    /// `key` is captured once at the start; rollback targets it directly, so
    /// the snapshot is restored correctly even if the view navigates to a
    /// different page or search before the commit resolves.
    pub async fn mutate(
        &self,
        key: &QueryKey,
        mutation: ClipMutation,
    ) -> Result<(), EngineError> {
        let gate = self.gate_for(mutation.path());
        let _held = gate.lock().await;

        let result = self.run(key, &mutation).await;
        drop(_held);
        drop(gate);
        self.release_gate(mutation.path());
        result
    }

    async fn run(&self, key: &QueryKey, mutation: &ClipMutation) -> Result<(), EngineError> {
        // Phase 1: snapshot. A mutation against an uncached key still
        // commits, it just has nothing to apply optimistically.
        let snapshot = self.cache.snapshot(key);
        let command = self.command_for(mutation, snapshot.as_ref())?;

        // Phase 2: optimistic apply.
        if snapshot.is_some() {
            self.cache.apply(key, |page| mutation.apply_to(page));
        }

        // Phase 3: commit.
        let committed = match &command {
            Command::Delete(path) => self.store.delete_clip(path).await,
            Command::Rename(path, new_name) => self.store.rename_clip(path, new_name).await,
            Command::Like { name, liked } => self.store.like_clip(name, *liked).await,
        };

        match committed {
            Ok(()) => {
                match mutation {
                    // The optimistic shape is already exact.
                    ClipMutation::ToggleLike { .. } => self.cache.mark_fresh(key),
                    // Deletes shift pagination boundaries and renames change
                    // identity keys and search membership; force refetches.
                    ClipMutation::Delete { .. } | ClipMutation::Rename { .. } => {
                        self.cache.invalidate_all()
                    }
                }
                Ok(())
            }
            Err(err) => {
                log::warn!("mutation on {} failed, rolling back: {err:#}", mutation.path());
                if let Some(snapshot) = snapshot {
                    self.cache.restore(key, snapshot);
                }
                Err(EngineError::backend(err))
            }
        }
    }

    /// Local validation plus resolution to the backend command. Rejections
    /// here never reach the backend.
    fn command_for(
        &self,
        mutation: &ClipMutation,
        snapshot: Option<&PageResult>,
    ) -> Result<Command, EngineError> {
        match mutation {
            ClipMutation::Delete { path } => Ok(Command::Delete(path.clone())),
            ClipMutation::Rename { path, new_name } => {
                let trimmed = new_name.trim();
                if trimmed.is_empty() {
                    return Err(EngineError::validation("rename target must not be empty"));
                }
                if trimmed.contains(['/', '\\']) {
                    return Err(EngineError::validation(
                        "rename target must not contain path separators",
                    ));
                }
                Ok(Command::Rename(path.clone(), clip_file_name(trimmed)))
            }
            ClipMutation::ToggleLike { path } => {
                // The target's current liked state decides the command
                // argument, so the record must be on the snapshotted page.
                let record = snapshot
                    .and_then(|page| page.clips.iter().find(|c| &c.path == path))
                    .ok_or_else(|| {
                        EngineError::validation(format!("clip {path} is not on the active page"))
                    })?;
                Ok(Command::Like {
                    name: record.name.clone(),
                    liked: !record.liked,
                })
            }
        }
    }

    fn gate_for(&self, path: &ClipPath) -> Arc<tokio::sync::Mutex<()>> {
        let mut gates = self.identity_gates.lock().unwrap();
        gates
            .entry(path.clone())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Drop the gate entry once nobody is waiting on it anymore.
    fn release_gate(&self, path: &ClipPath) {
        let mut gates = self.identity_gates.lock().unwrap();
        if let Some(gate) = gates.get(path) {
            if Arc::strong_count(gate) == 1 {
                gates.remove(path);
            }
        }
    }
}
