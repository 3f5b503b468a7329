//! Binary insertion over the vote-constrained interval.
//!
//! A candidate card finds its ranking position through successive pairwise
//! comparisons. Each comparison halves the admissible interval, so placing a
//! card into a ranking of `n` costs at most `ceil(log2(n + 1))` votes.

use super::bounds::InsertionBounds;
use crate::session::VoteRecord;

/// The next action required to position a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertionStep {
    /// Ask the player to compare the candidate against this ranked card.
    Compare { against: String },
    /// The interval collapsed; the candidate belongs at this position.
    Insert { position: usize },
}

/// Stateless insertion-step selector.
///
/// All state lives in the session document (ranking plus vote history), so
/// the same inputs always produce the same step and a client may safely
/// retry after a disconnect.
pub struct BinaryInsertionRanker;

impl BinaryInsertionRanker {
    /// Decides the next step for `candidate`, which must not already be
    /// ranked.
    ///
    /// An empty ranking collapses immediately to position 0 (the first
    /// accepted card needs no comparisons). With no vote history the first
    /// comparison probes the middle of the ranking; afterwards the interval
    /// recomputed from all votes drives the probe.
    pub fn next_step(
        candidate: &str,
        ranking: &[String],
        votes: &[VoteRecord],
    ) -> InsertionStep {
        let bounds = InsertionBounds::for_candidate(candidate, ranking, votes);
        if bounds.is_collapsed() {
            InsertionStep::Insert {
                position: bounds.start,
            }
        } else {
            InsertionStep::Compare {
                against: ranking[bounds.midpoint()].clone(),
            }
        }
    }
}
