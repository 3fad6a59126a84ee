//! Clip catalog domain model.

mod pagination;
mod record;

pub use pagination::{page_tokens, PageToken};
pub use record::{ClipPath, ClipRecord, Tag};

use serde::{Deserialize, Serialize};

/// One fetched page of the clip catalog.
///
/// Invariants: `clips.len()` never exceeds the page size the fetch was issued
/// with, and when `total_pages <= 1` every known clip is on this page
/// (`clips.len() == total_clips`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageResult {
    pub clips: Vec<ClipRecord>,
    pub total_pages: usize,
    pub total_clips: usize,
}

impl PageResult {
    /// An empty catalog page, used when the clip directory does not exist yet.
    pub fn empty() -> Self {
        Self {
            clips: Vec::new(),
            total_pages: 0,
            total_clips: 0,
        }
    }

    /// Position of the clip identified by `path` on this page, if present.
    pub fn position_of(&self, path: &ClipPath) -> Option<usize> {
        self.clips.iter().position(|c| &c.path == path)
    }
}
