//! Insertion interval computation.
//!
//! Every vote involving a candidate constrains where it may land in the
//! personal ranking: beating a ranked card caps the interval above that
//! card's index, losing to one raises the floor below it. The conjunction of
//! all constraints is a half-open interval `[start, end)` over insertion
//! positions, independent of the order votes arrived in.

use crate::session::VoteRecord;

/// Half-open interval `[start, end)` of admissible insertion positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertionBounds {
    pub start: usize,
    pub end: usize,
}

impl InsertionBounds {
    /// The unconstrained interval over a ranking of `len` entries.
    pub fn full(len: usize) -> Self {
        Self { start: 0, end: len }
    }

    /// Whether the interval pins a single position (`start`).
    pub fn is_collapsed(&self) -> bool {
        self.start >= self.end
    }

    /// Midpoint position used to pick the next comparison opponent.
    pub fn midpoint(&self) -> usize {
        (self.start + self.end) / 2
    }

    /// Width of the interval (0 when collapsed).
    pub fn width(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Computes the admissible interval for `candidate` from its vote
    /// history against the current ranking.
    ///
    /// Votes against cards no longer present in the ranking cannot be
    /// positioned and are skipped with a warning; the remaining constraints
    /// still apply. An empty ranking yields the collapsed interval `[0, 0)`.
    pub fn for_candidate(candidate: &str, ranking: &[String], votes: &[VoteRecord]) -> Self {
        let mut bounds = Self::full(ranking.len());

        for vote in votes.iter().filter(|v| v.involves(candidate)) {
            let other = if vote.card_a == candidate {
                &vote.card_b
            } else {
                &vote.card_a
            };
            let Some(other_index) = ranking.iter().position(|c| c == other) else {
                tracing::warn!(
                    candidate,
                    other = other.as_str(),
                    "comparison card missing from ranking, skipping vote constraint"
                );
                continue;
            };

            if vote.winner == candidate {
                // Candidate ranks above the card it beat
                bounds.end = bounds.end.min(other_index);
            } else {
                // Candidate ranks below the card it lost to
                bounds.start = bounds.start.max(other_index + 1);
            }
        }

        bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn vote(card_a: &str, card_b: &str, winner: &str) -> VoteRecord {
        VoteRecord {
            card_a: card_a.to_string(),
            card_b: card_b.to_string(),
            winner: winner.to_string(),
            recorded_at: Utc::now(),
        }
    }

    fn ranking(cards: &[&str]) -> Vec<String> {
        cards.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn no_votes_gives_full_interval() {
        let bounds = InsertionBounds::for_candidate("x", &ranking(&["a", "b", "c"]), &[]);
        assert_eq!(bounds, InsertionBounds { start: 0, end: 3 });
        assert!(!bounds.is_collapsed());
    }

    #[test]
    fn empty_ranking_collapses_at_zero() {
        let bounds = InsertionBounds::for_candidate("x", &[], &[]);
        assert_eq!(bounds, InsertionBounds { start: 0, end: 0 });
        assert!(bounds.is_collapsed());
    }

    #[test]
    fn win_caps_the_interval() {
        // x beat b (index 1): x must land at or above index 1
        let votes = vec![vote("x", "b", "x")];
        let bounds = InsertionBounds::for_candidate("x", &ranking(&["a", "b", "c"]), &votes);
        assert_eq!(bounds, InsertionBounds { start: 0, end: 1 });
    }

    #[test]
    fn loss_raises_the_floor() {
        // x lost to b (index 1): x must land below b
        let votes = vec![vote("x", "b", "b")];
        let bounds = InsertionBounds::for_candidate("x", &ranking(&["a", "b", "c"]), &votes);
        assert_eq!(bounds, InsertionBounds { start: 2, end: 3 });
    }

    #[test]
    fn constraints_conjoin_to_narrowest_interval() {
        // Lost to a (index 0), beat c (index 2): exactly between them
        let votes = vec![vote("x", "a", "a"), vote("x", "c", "x")];
        let bounds = InsertionBounds::for_candidate("x", &ranking(&["a", "b", "c"]), &votes);
        assert_eq!(bounds, InsertionBounds { start: 1, end: 2 });
    }

    #[test]
    fn bounds_are_independent_of_vote_order() {
        let rank = ranking(&["a", "b", "c", "d", "e"]);
        let votes = vec![
            vote("x", "c", "x"),
            vote("x", "a", "a"),
            vote("x", "b", "x"),
        ];

        // All six permutations of the three constraints
        let orders: [[usize; 3]; 6] = [
            [0, 1, 2],
            [0, 2, 1],
            [1, 0, 2],
            [1, 2, 0],
            [2, 0, 1],
            [2, 1, 0],
        ];
        let expected = InsertionBounds::for_candidate("x", &rank, &votes);
        for order in orders {
            let permuted: Vec<VoteRecord> = order.iter().map(|&i| votes[i].clone()).collect();
            assert_eq!(
                InsertionBounds::for_candidate("x", &rank, &permuted),
                expected
            );
        }
        assert_eq!(expected, InsertionBounds { start: 1, end: 1 });
    }

    #[test]
    fn vote_against_unranked_card_is_skipped() {
        // "ghost" was removed from the ranking; only the loss to a applies
        let votes = vec![vote("x", "ghost", "x"), vote("x", "a", "a")];
        let bounds = InsertionBounds::for_candidate("x", &ranking(&["a", "b"]), &votes);
        assert_eq!(bounds, InsertionBounds { start: 1, end: 2 });
    }

    #[test]
    fn votes_between_other_cards_do_not_constrain() {
        let votes = vec![vote("a", "b", "a")];
        let bounds = InsertionBounds::for_candidate("x", &ranking(&["a", "b"]), &votes);
        assert_eq!(bounds, InsertionBounds { start: 0, end: 2 });
    }

    #[test]
    fn contradictory_votes_collapse_to_inverted_interval() {
        // Beat a (index 0) but lost to b (index 1): end=0, start=2
        let votes = vec![vote("x", "a", "x"), vote("x", "b", "b")];
        let bounds = InsertionBounds::for_candidate("x", &ranking(&["a", "b", "c"]), &votes);
        assert!(bounds.is_collapsed());
        assert_eq!(bounds.width(), 0);
    }

    #[test]
    fn candidate_counts_votes_from_either_side() {
        // Same constraint expressed with the candidate as card_b
        let votes = vec![vote("b", "x", "x")];
        let bounds = InsertionBounds::for_candidate("x", &ranking(&["a", "b", "c"]), &votes);
        assert_eq!(bounds, InsertionBounds { start: 0, end: 1 });
    }
}
