//! Settings domain model.
//!
//! Settings are a flat key/value namespace on the backend; the engine layers
//! descriptors (category, kind, defaults, options) on top so the panel can
//! render and validate them without consulting the backend.

mod catalog;
mod model;

pub use catalog::descriptor_catalog;
pub use model::{SettingCategory, SettingDescriptor, SettingKind, SettingValue};
