//! Rating service coordinating the ELO policy with persistence.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::elo::EloPolicy;
use super::model::GlobalRating;
use super::repository::RatingRepository;
use crate::card::CardCatalog;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};

/// Applies resolved votes and swipe gestures to global card ratings.
///
/// Votes are all-or-nothing: both cards must exist in the catalog before
/// anything is written, so a vote referencing a deleted card rejects without
/// touching either row. Swipe tallies are advisory engagement statistics and
/// skip the existence check (deck membership already vouched for the card at
/// session start).
pub struct EloRatingService {
    catalog: Arc<dyn CardCatalog>,
    ratings: Arc<dyn RatingRepository>,
    policy: EloPolicy,
    initial_rating: f64,
}

impl EloRatingService {
    pub fn new(
        catalog: Arc<dyn CardCatalog>,
        ratings: Arc<dyn RatingRepository>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            catalog,
            ratings,
            policy: EloPolicy::from_config(config),
            initial_rating: config.initial_rating,
        }
    }

    /// Applies one resolved comparison to both cards' global ratings.
    ///
    /// Missing rows are seeded at the configured initial rating. Returns the
    /// updated (winner, loser) pair.
    pub async fn record_vote(
        &self,
        tenant_id: &str,
        winner_id: &str,
        loser_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(GlobalRating, GlobalRating)> {
        if winner_id == loser_id {
            return Err(EngineError::validation(
                "a card cannot be compared against itself",
            ));
        }
        // Both cards must resolve before either row is written
        self.ensure_card(tenant_id, winner_id).await?;
        self.ensure_card(tenant_id, loser_id).await?;

        let policy = self.policy;
        let (winner, loser) = self
            .ratings
            .record_outcome(
                tenant_id,
                GlobalRating::seed(winner_id, self.initial_rating, now),
                GlobalRating::seed(loser_id, self.initial_rating, now),
                Box::new(move |w, l| policy.apply(w, l, now)),
            )
            .await?;

        tracing::debug!(
            tenant_id,
            winner_id,
            loser_id,
            winner_rating = winner.rating,
            loser_rating = loser.rating,
            "[EloRatingService] Applied vote outcome"
        );
        Ok((winner, loser))
    }

    /// Books a swipe gesture into the card's engagement tallies.
    pub async fn record_swipe(
        &self,
        tenant_id: &str,
        card_id: &str,
        liked: bool,
        now: DateTime<Utc>,
    ) -> Result<GlobalRating> {
        self.ratings
            .record_swipe(
                tenant_id,
                GlobalRating::seed(card_id, self.initial_rating, now),
                Box::new(move |rating| rating.record_swipe(liked, now)),
            )
            .await
    }

    /// Tenant leaderboard ordered by confidence-weighted score, best first.
    pub async fn leaderboard(&self, tenant_id: &str, limit: usize) -> Result<Vec<GlobalRating>> {
        let mut ratings = self.ratings.list_for_tenant(tenant_id).await?;
        ratings.sort_by(|a, b| {
            b.weighted_score()
                .partial_cmp(&a.weighted_score())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ratings.truncate(limit);
        Ok(ratings)
    }

    /// Looks up one card's rating, if it has one yet.
    pub async fn rating_of(&self, tenant_id: &str, card_id: &str) -> Result<Option<GlobalRating>> {
        self.ratings.find(tenant_id, card_id).await
    }

    async fn ensure_card(&self, tenant_id: &str, card_id: &str) -> Result<()> {
        match self.catalog.get(tenant_id, card_id).await? {
            Some(_) => Ok(()),
            None => Err(EngineError::card_not_found(card_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::CardRef;
    use crate::rating::{OutcomeFn, TallyFn};
    use std::collections::HashMap;
    use std::sync::Mutex;

    // Mock CardCatalog for testing
    struct MockCatalog {
        cards: Mutex<HashMap<String, CardRef>>,
    }

    impl MockCatalog {
        fn with_cards(ids: &[&str]) -> Self {
            let cards = ids
                .iter()
                .map(|id| (id.to_string(), CardRef::new(*id, format!("Card {id}"))))
                .collect();
            Self {
                cards: Mutex::new(cards),
            }
        }
    }

    #[async_trait::async_trait]
    impl CardCatalog for MockCatalog {
        async fn get(&self, _tenant_id: &str, card_id: &str) -> Result<Option<CardRef>> {
            let cards = self.cards.lock().unwrap();
            Ok(cards.get(card_id).cloned())
        }

        async fn list_active(&self, _tenant_id: &str, tag: Option<&str>) -> Result<Vec<CardRef>> {
            let cards = self.cards.lock().unwrap();
            Ok(cards
                .values()
                .filter(|c| c.is_active && (tag.is_none() || c.tag.as_deref() == tag))
                .cloned()
                .collect())
        }
    }

    // Mock RatingRepository for testing
    struct MockRatingRepository {
        ratings: Mutex<HashMap<String, GlobalRating>>,
    }

    impl MockRatingRepository {
        fn new() -> Self {
            Self {
                ratings: Mutex::new(HashMap::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl RatingRepository for MockRatingRepository {
        async fn find(&self, _tenant_id: &str, card_id: &str) -> Result<Option<GlobalRating>> {
            let ratings = self.ratings.lock().unwrap();
            Ok(ratings.get(card_id).cloned())
        }

        async fn list_for_tenant(&self, _tenant_id: &str) -> Result<Vec<GlobalRating>> {
            let ratings = self.ratings.lock().unwrap();
            Ok(ratings.values().cloned().collect())
        }

        async fn record_outcome(
            &self,
            _tenant_id: &str,
            winner_seed: GlobalRating,
            loser_seed: GlobalRating,
            apply: OutcomeFn,
        ) -> Result<(GlobalRating, GlobalRating)> {
            let mut ratings = self.ratings.lock().unwrap();
            let mut winner = ratings
                .remove(&winner_seed.card_id)
                .unwrap_or(winner_seed);
            let mut loser = ratings.remove(&loser_seed.card_id).unwrap_or(loser_seed);
            apply(&mut winner, &mut loser);
            ratings.insert(winner.card_id.clone(), winner.clone());
            ratings.insert(loser.card_id.clone(), loser.clone());
            Ok((winner, loser))
        }

        async fn record_swipe(
            &self,
            _tenant_id: &str,
            seed: GlobalRating,
            apply: TallyFn,
        ) -> Result<GlobalRating> {
            let mut ratings = self.ratings.lock().unwrap();
            let mut rating = ratings.remove(&seed.card_id).unwrap_or(seed);
            apply(&mut rating);
            ratings.insert(rating.card_id.clone(), rating.clone());
            Ok(rating)
        }
    }

    fn service(card_ids: &[&str]) -> (EloRatingService, Arc<MockRatingRepository>) {
        let repo = Arc::new(MockRatingRepository::new());
        let service = EloRatingService::new(
            Arc::new(MockCatalog::with_cards(card_ids)),
            repo.clone(),
            &EngineConfig::default(),
        );
        (service, repo)
    }

    #[tokio::test]
    async fn first_vote_seeds_both_cards_and_applies_k() {
        let (service, _) = service(&["a", "b"]);
        let (winner, loser) = service
            .record_vote("tenant-1", "a", "b", Utc::now())
            .await
            .unwrap();
        assert_eq!(winner.rating, 1516.0);
        assert_eq!(loser.rating, 1484.0);
        assert_eq!(winner.total_games, 1);
        assert_eq!(loser.total_games, 1);
    }

    #[tokio::test]
    async fn vote_with_unknown_card_rejects_without_writing() {
        let (service, repo) = service(&["a"]);
        let err = service
            .record_vote("tenant-1", "a", "ghost", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::CardNotFound(_)));
        // Neither row was created
        assert!(repo.ratings.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn self_vote_is_rejected() {
        let (service, _) = service(&["a"]);
        let err = service
            .record_vote("tenant-1", "a", "a", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[tokio::test]
    async fn swipe_tallies_accumulate() {
        let (service, _) = service(&["a"]);
        service
            .record_swipe("tenant-1", "a", true, Utc::now())
            .await
            .unwrap();
        let rating = service
            .record_swipe("tenant-1", "a", false, Utc::now())
            .await
            .unwrap();
        assert_eq!(rating.likes, 1);
        assert_eq!(rating.dislikes, 1);
        assert_eq!(rating.total_interactions, 2);
        assert!(rating.last_interaction_at.is_some());
    }

    #[tokio::test]
    async fn leaderboard_orders_by_weighted_score() {
        let (service, _) = service(&["a", "b", "c"]);
        let now = Utc::now();

        // b beats a twice: b's raw rating ends highest
        service.record_vote("t", "b", "a", now).await.unwrap();
        service.record_vote("t", "b", "a", now).await.unwrap();

        // a is heavily swiped, b barely: confidence flips the order
        for _ in 0..80 {
            service.record_swipe("t", "a", true, now).await.unwrap();
        }
        service.record_swipe("t", "b", true, now).await.unwrap();

        let board = service.leaderboard("t", 10).await.unwrap();
        assert_eq!(board[0].card_id, "a");
        assert_eq!(board[1].card_id, "b");
        // c never interacted, so it has no row at all
        assert_eq!(board.len(), 2);
    }

    #[tokio::test]
    async fn leaderboard_respects_limit() {
        let (service, _) = service(&["a", "b", "c"]);
        let now = Utc::now();
        service.record_vote("t", "a", "b", now).await.unwrap();
        service.record_vote("t", "b", "c", now).await.unwrap();

        let board = service.leaderboard("t", 2).await.unwrap();
        assert_eq!(board.len(), 2);
    }
}
