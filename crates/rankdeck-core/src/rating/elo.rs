//! ELO update policy.
//!
//! One policy applies uniformly to every vote: standard logistic expected
//! score, K dampened by a card's game count (floored at a quarter of the
//! base K), and whole-point rounding of the resulting ratings.

use chrono::{DateTime, Utc};

use super::model::GlobalRating;
use crate::config::EngineConfig;

/// Rating update parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EloPolicy {
    pub k_factor: f64,
    pub damping: bool,
}

impl EloPolicy {
    pub fn new(k_factor: f64, damping: bool) -> Self {
        Self { k_factor, damping }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.k_factor, config.rating_damping)
    }

    /// Expected score of a player rated `rating_a` against `rating_b`.
    pub fn expected_score(rating_a: f64, rating_b: f64) -> f64 {
        1.0 / (1.0 + 10.0_f64.powf((rating_b - rating_a) / 400.0))
    }

    /// K applied to a card that has played `games` comparisons.
    ///
    /// Established cards move less: `K / (1 + ln(games + 1))`, never below
    /// `K / 4`. With damping disabled the base K applies to every game.
    pub fn effective_k(&self, games: u64) -> f64 {
        if !self.damping {
            return self.k_factor;
        }
        let dampened = self.k_factor / (1.0 + ((games + 1) as f64).ln());
        dampened.max(self.k_factor / 4.0)
    }

    /// Applies one resolved comparison to both cards' ratings and tallies.
    pub fn apply(&self, winner: &mut GlobalRating, loser: &mut GlobalRating, now: DateTime<Utc>) {
        let expected_winner = Self::expected_score(winner.rating, loser.rating);
        let expected_loser = 1.0 - expected_winner;

        let k_winner = self.effective_k(winner.total_games);
        let k_loser = self.effective_k(loser.total_games);

        winner.rating = (winner.rating + k_winner * (1.0 - expected_winner)).round();
        loser.rating = (loser.rating + k_loser * (0.0 - expected_loser)).round();

        winner.record_game(true, now);
        loser.record_game(false, now);
    }
}

impl Default for EloPolicy {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}
