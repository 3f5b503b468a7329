//! Play session domain module.
//!
//! This module contains the session aggregate, its state machine, and the
//! repository interface for persisting it.
//!
//! # Module Structure
//!
//! - `model`: Core session aggregate (`PlaySession`) and its history records
//! - `state`: Lifecycle and interaction state types (`SessionStatus`, `PlayState`)
//! - `repository`: Repository trait for session persistence

mod model;
mod repository;
mod state;

// Re-export public API
pub use model::{PlaySession, SwipeRecord, VoteRecord};
pub use repository::SessionRepository;
pub use state::{PlayState, SessionStatus, SwipeDirection};
