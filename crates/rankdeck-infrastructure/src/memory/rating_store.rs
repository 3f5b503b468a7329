//! In-memory rating repository.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use rankdeck_core::error::Result;
use rankdeck_core::rating::{GlobalRating, OutcomeFn, RatingRepository, TallyFn};

type RatingKey = (String, String);

/// Tenant-scoped rating store backed by a `RwLock<HashMap>`.
///
/// Mutation closures run while the write lock is held, so read-modify-write
/// cycles on contended rating rows never interleave across sessions.
#[derive(Default)]
pub struct MemoryRatingStore {
    ratings: RwLock<HashMap<RatingKey, GlobalRating>>,
}

impl MemoryRatingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RatingRepository for MemoryRatingStore {
    async fn find(&self, tenant_id: &str, card_id: &str) -> Result<Option<GlobalRating>> {
        let ratings = self.ratings.read().await;
        Ok(ratings
            .get(&(tenant_id.to_string(), card_id.to_string()))
            .cloned())
    }

    async fn list_for_tenant(&self, tenant_id: &str) -> Result<Vec<GlobalRating>> {
        let ratings = self.ratings.read().await;
        Ok(ratings
            .iter()
            .filter(|((tenant, _), _)| tenant == tenant_id)
            .map(|(_, rating)| rating.clone())
            .collect())
    }

    async fn record_outcome(
        &self,
        tenant_id: &str,
        winner_seed: GlobalRating,
        loser_seed: GlobalRating,
        apply: OutcomeFn,
    ) -> Result<(GlobalRating, GlobalRating)> {
        let mut ratings = self.ratings.write().await;
        let winner_key = (tenant_id.to_string(), winner_seed.card_id.clone());
        let loser_key = (tenant_id.to_string(), loser_seed.card_id.clone());

        let mut winner = ratings.remove(&winner_key).unwrap_or(winner_seed);
        let mut loser = ratings.remove(&loser_key).unwrap_or(loser_seed);
        apply(&mut winner, &mut loser);
        ratings.insert(winner_key, winner.clone());
        ratings.insert(loser_key, loser.clone());
        Ok((winner, loser))
    }

    async fn record_swipe(
        &self,
        tenant_id: &str,
        seed: GlobalRating,
        apply: TallyFn,
    ) -> Result<GlobalRating> {
        let mut ratings = self.ratings.write().await;
        let key = (tenant_id.to_string(), seed.card_id.clone());
        let mut rating = ratings.remove(&key).unwrap_or(seed);
        apply(&mut rating);
        ratings.insert(key, rating.clone());
        Ok(rating)
    }
}
