//! Play operations.
//!
//! # Module Structure
//!
//! - `lifecycle`: Deck assembly, session creation, expiry handling
//! - `guard`: Optimistic-version precheck and duplicate-vote suppression
//! - `service`: The operation facade (`PlayService`)
//! - `responses`: Transport-agnostic response payloads

mod guard;
mod lifecycle;
mod responses;
mod service;

// Re-export public API
pub use guard::ConcurrencyGuard;
pub use lifecycle::SessionLifecycle;
pub use responses::{
    ComparisonPair, ComparisonStep, RankEntry, SessionProbe, SessionResults, SessionStatistics,
    StartedSession, SwipeOutcome, VoteOutcome,
};
pub use service::PlayService;
