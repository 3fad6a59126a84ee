use anyhow::Result;
use async_trait::async_trait;

use crate::clip::{ClipPath, PageResult};

/// Backend command surface for the clip catalog.
///
/// Paging is 1-based. `search` is a case-insensitive substring filter on the
/// clip name; `None` fetches the unfiltered page (an empty string is
/// normalized to `None` before it reaches this port).
#[async_trait]
pub trait ClipStorePort: Send + Sync {
    async fn pull_clips(
        &self,
        page: usize,
        page_size: usize,
        search: Option<&str>,
    ) -> Result<PageResult>;

    /// Delete a clip. A missing path is an error, not a no-op.
    async fn delete_clip(&self, path: &ClipPath) -> Result<()>;

    /// Rename a clip file. Changes the clip's identity key.
    async fn rename_clip(&self, path: &ClipPath, new_name: &str) -> Result<()>;

    /// Persist the liked flag. The backend addresses clips by display name
    /// for this command (original command shape, kept as-is).
    async fn like_clip(&self, name: &str, liked: bool) -> Result<()>;
}
