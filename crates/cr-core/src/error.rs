use thiserror::Error;

/// Error taxonomy of the catalog/settings engine.
///
/// A superseded fetch response is not represented here: ordering conflicts
/// are discarded inside the cache (with a debug log) and are never
/// user-visible. Nothing in this enum is fatal; the engine stays usable
/// after any single command failure.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A backend command failed and the remote state is unknown. Mutations
    /// roll back their optimistic apply; reads keep their stale cache entry.
    #[error("backend command failed: {0}")]
    Backend(#[source] anyhow::Error),

    /// Input rejected locally before any backend command was issued.
    #[error("invalid input: {0}")]
    Validation(String),
}

impl EngineError {
    pub fn backend(err: anyhow::Error) -> Self {
        Self::Backend(err)
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
