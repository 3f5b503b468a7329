//! Global card rating domain module.
//!
//! # Module Structure
//!
//! - `model`: Cross-session rating state per card (`GlobalRating`)
//! - `elo`: The single ELO update policy (`EloPolicy`)
//! - `repository`: Repository trait for rating persistence
//! - `service`: Vote/swipe application and leaderboard queries

mod elo;
mod model;
mod repository;
mod service;

// Re-export public API
pub use elo::EloPolicy;
pub use model::GlobalRating;
pub use repository::{OutcomeFn, RatingRepository, TallyFn};
pub use service::EloRatingService;
