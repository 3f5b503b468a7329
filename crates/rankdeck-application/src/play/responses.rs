//! Response payloads for the play operations.
//!
//! These are transport-agnostic: an HTTP or RPC layer serializes them as-is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rankdeck_core::session::{PlayState, SessionStatus};

/// Result of `start_session`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartedSession {
    pub session_id: String,
    /// Shuffled deck in presentation order.
    pub deck: Vec<String>,
    pub expires_at: DateTime<Utc>,
    pub version: u64,
}

/// A pairwise matchup put to the player.
///
/// `card_a` is always the candidate being placed; `card_b` is the ranked
/// opponent chosen by the binary insertion step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonPair {
    pub card_a: String,
    pub card_b: String,
    /// True when this is the candidate's first comparison of the round.
    pub is_first_ranking: bool,
}

/// Result of `next_comparison`: either another matchup or a settled position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ComparisonStep {
    Pair {
        card_a: String,
        card_b: String,
        is_first_ranking: bool,
    },
    PositionDetermined {
        final_position: usize,
    },
}

/// Result of `submit_swipe`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwipeOutcome {
    pub state: PlayState,
    /// True when the swipe opened a ranking round.
    pub requires_voting: bool,
    pub comparison: Option<ComparisonPair>,
    pub session_completed: bool,
    pub version: u64,
}

/// Result of `submit_vote`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteOutcome {
    /// The next matchup for the same candidate, if the position is still open.
    pub next_comparison: Option<ComparisonPair>,
    /// Where the candidate landed, once the interval collapsed.
    pub inserted_at: Option<usize>,
    pub session_completed: bool,
    pub state: PlayState,
    pub version: u64,
}

/// Result of `validate_session`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionProbe {
    pub is_valid: bool,
    pub state: PlayState,
    pub status: SessionStatus,
    pub version: u64,
}

/// One row of a finished (or in-progress) personal ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankEntry {
    /// 1-based display rank.
    pub rank: usize,
    pub card_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStatistics {
    pub total_swipes: usize,
    pub total_votes: usize,
    /// Swiped fraction of the deck, `0.0..=1.0`.
    pub completion_rate: f64,
}

/// Result of `results`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResults {
    pub ranking: Vec<RankEntry>,
    pub statistics: SessionStatistics,
}
