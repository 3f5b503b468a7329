//! Global card rating model.
//!
//! One `GlobalRating` exists per card per tenant, independent of any single
//! session. Votes from every session feed the same record; swipe gestures
//! feed its engagement tallies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cross-session rating state for one card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalRating {
    pub card_id: String,
    /// ELO-scale rating, whole points.
    pub rating: f64,
    pub wins: u64,
    pub losses: u64,
    pub total_games: u64,
    /// wins / total_games, 0.0 before the first game.
    pub win_rate: f64,
    /// Right swipes received across all sessions.
    #[serde(default)]
    pub likes: u64,
    /// Left swipes received across all sessions.
    #[serde(default)]
    pub dislikes: u64,
    /// Total swipe gestures; drives rating confidence.
    #[serde(default)]
    pub total_interactions: u64,
    #[serde(default)]
    pub last_interaction_at: Option<DateTime<Utc>>,
    pub last_updated: DateTime<Utc>,
}

impl GlobalRating {
    /// Seeds a fresh record at the configured initial rating.
    pub fn seed(card_id: impl Into<String>, initial_rating: f64, now: DateTime<Utc>) -> Self {
        Self {
            card_id: card_id.into(),
            rating: initial_rating,
            wins: 0,
            losses: 0,
            total_games: 0,
            win_rate: 0.0,
            likes: 0,
            dislikes: 0,
            total_interactions: 0,
            last_interaction_at: None,
            last_updated: now,
        }
    }

    /// Expected probability of beating an opponent at `opponent_rating`.
    pub fn expected_score_against(&self, opponent_rating: f64) -> f64 {
        1.0 / (1.0 + 10.0_f64.powf((opponent_rating - self.rating) / 400.0))
    }

    /// Confidence in the rating given observed engagement, in `[0, 1]`.
    ///
    /// Scales linearly with swipe volume and saturates at 100 interactions.
    pub fn confidence(&self) -> f64 {
        (self.total_interactions as f64 / 100.0).min(1.0)
    }

    /// Confidence-weighted composite score used to order leaderboards, so a
    /// barely-seen card cannot top the board on one lucky vote.
    pub fn weighted_score(&self) -> f64 {
        self.rating * self.confidence()
    }

    /// Books one comparison outcome into the win/loss tallies.
    pub fn record_game(&mut self, won: bool, now: DateTime<Utc>) {
        if won {
            self.wins += 1;
        } else {
            self.losses += 1;
        }
        self.total_games += 1;
        self.win_rate = self.wins as f64 / self.total_games as f64;
        self.last_updated = now;
    }

    /// Books one swipe gesture into the engagement tallies.
    pub fn record_swipe(&mut self, liked: bool, now: DateTime<Utc>) {
        if liked {
            self.likes += 1;
        } else {
            self.dislikes += 1;
        }
        self.total_interactions += 1;
        self.last_interaction_at = Some(now);
        self.last_updated = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_starts_neutral() {
        let r = GlobalRating::seed("c1", 1500.0, Utc::now());
        assert_eq!(r.rating, 1500.0);
        assert_eq!(r.total_games, 0);
        assert_eq!(r.win_rate, 0.0);
        assert_eq!(r.confidence(), 0.0);
        assert_eq!(r.weighted_score(), 0.0);
    }

    #[test]
    fn expected_score_is_half_between_equals() {
        let r = GlobalRating::seed("c1", 1500.0, Utc::now());
        let p = r.expected_score_against(1500.0);
        assert!((p - 0.5).abs() < 1e-9);
    }

    #[test]
    fn expected_score_favors_higher_rating() {
        let strong = GlobalRating::seed("c1", 1700.0, Utc::now());
        let p = strong.expected_score_against(1300.0);
        assert!(p > 0.9, "400 points ahead should win ~91%, got {p}");
    }

    #[test]
    fn win_rate_tracks_games() {
        let mut r = GlobalRating::seed("c1", 1500.0, Utc::now());
        r.record_game(true, Utc::now());
        r.record_game(true, Utc::now());
        r.record_game(false, Utc::now());
        assert_eq!(r.wins, 2);
        assert_eq!(r.losses, 1);
        assert_eq!(r.total_games, 3);
        assert!((r.win_rate - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn confidence_saturates_at_hundred_interactions() {
        let mut r = GlobalRating::seed("c1", 1500.0, Utc::now());
        for i in 0..150 {
            r.record_swipe(i % 2 == 0, Utc::now());
        }
        assert_eq!(r.confidence(), 1.0);
        assert_eq!(r.weighted_score(), r.rating);
        assert_eq!(r.likes, 75);
        assert_eq!(r.dislikes, 75);
    }

    #[test]
    fn weighted_score_discounts_unseen_cards() {
        let mut seasoned = GlobalRating::seed("old", 1500.0, Utc::now());
        for _ in 0..100 {
            seasoned.record_swipe(true, Utc::now());
        }
        let mut fresh = GlobalRating::seed("new", 1700.0, Utc::now());
        fresh.record_swipe(true, Utc::now());

        assert!(fresh.rating > seasoned.rating);
        assert!(seasoned.weighted_score() > fresh.weighted_score());
    }
}
