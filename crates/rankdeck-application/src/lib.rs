//! Application layer for rankdeck.
//!
//! This crate coordinates the domain layer (session aggregate, ranking math,
//! rating policy) with infrastructure stores to expose the engine's
//! transport-agnostic play operations.

pub mod play;

pub use play::{ConcurrencyGuard, PlayService, SessionLifecycle};
