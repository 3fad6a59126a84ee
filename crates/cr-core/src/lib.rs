//! Core domain models and port contracts for ClipRack.
//!
//! This crate is I/O free. It defines the clip catalog and settings domain,
//! the port traits the engine talks to, and the error taxonomy shared by the
//! engine and its adapters. Infrastructure implementations live in
//! `cr-infra`, engine logic in `cr-app`.

pub mod clip;
pub mod error;
pub mod ports;
pub mod settings;

pub use clip::{ClipPath, ClipRecord, PageResult, Tag};
pub use error::EngineError;
