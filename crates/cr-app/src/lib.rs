//! The ClipRack engine: keeps the paginated, searchable clip catalog
//! consistent with optimistic local edits, and batches/diffs/persists
//! user-edited settings by category.
//!
//! Everything here runs on a single logical thread (the UI event loop); the
//! only suspension points are backend port calls. Responses are reconciled
//! in request-issuance order per cache key, guarded by per-key sequence
//! numbers; superseded completions are discarded.

pub mod catalog;
pub mod debounce;
pub mod settings;

pub use catalog::{CatalogController, ClipMutation, MutationCoordinator, QueryCache, QueryKey};
pub use debounce::DebounceGate;
pub use settings::{CommitSummary, SettingsEditor};
