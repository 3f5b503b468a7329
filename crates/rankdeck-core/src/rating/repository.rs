//! Rating repository trait.

use async_trait::async_trait;

use super::model::GlobalRating;
use crate::error::Result;

/// Mutation applied to a winner/loser rating pair under store isolation.
pub type OutcomeFn = Box<dyn FnOnce(&mut GlobalRating, &mut GlobalRating) + Send>;

/// Mutation applied to a single rating under store isolation.
pub type TallyFn = Box<dyn FnOnce(&mut GlobalRating) + Send>;

/// An abstract, tenant-scoped store for global card ratings.
///
/// Rating rows are contended across sessions: two players can vote on the
/// same card simultaneously. Implementations therefore run the supplied
/// mutation closures under their own isolation (a single lock, a
/// transaction) over fetch-or-seeded rows, so read-modify-write never
/// interleaves.
#[async_trait]
pub trait RatingRepository: Send + Sync {
    /// Finds a card's rating within a tenant.
    async fn find(&self, tenant_id: &str, card_id: &str) -> Result<Option<GlobalRating>>;

    /// Lists all rating rows belonging to a tenant.
    async fn list_for_tenant(&self, tenant_id: &str) -> Result<Vec<GlobalRating>>;

    /// Applies a resolved comparison to both cards' rows atomically.
    ///
    /// Rows absent from the store are created from the seeds before `apply`
    /// runs. Returns the updated (winner, loser) pair.
    async fn record_outcome(
        &self,
        tenant_id: &str,
        winner_seed: GlobalRating,
        loser_seed: GlobalRating,
        apply: OutcomeFn,
    ) -> Result<(GlobalRating, GlobalRating)>;

    /// Applies a swipe tally to one card's row atomically, seeding it if
    /// absent. Returns the updated row.
    async fn record_swipe(
        &self,
        tenant_id: &str,
        seed: GlobalRating,
        apply: TallyFn,
    ) -> Result<GlobalRating>;
}
