//! Domain layer of the rankdeck engine.
//!
//! Owns the play session aggregate and its state machine, the binary
//! insertion ranking math, the global ELO rating policy, and the traits
//! infrastructure implements to persist it all.

pub mod card;
pub mod config;
pub mod error;
pub mod ranking;
pub mod rating;
pub mod session;

// Re-export common error type
pub use error::{EngineError, Result};
