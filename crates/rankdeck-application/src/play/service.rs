//! The play operation facade.
//!
//! `PlayService` is the engine's public surface: a transport layer (HTTP,
//! RPC, a CLI) calls these operations and serializes the response payloads
//! as-is. Each operation loads the session document, validates the request
//! against it, applies the mutation, and commits through the repository's
//! version compare-and-swap, which is the serialization point for all
//! concurrent writers of one session.

use std::sync::Arc;

use chrono::Utc;

use rankdeck_core::card::CardCatalog;
use rankdeck_core::config::EngineConfig;
use rankdeck_core::error::{EngineError, Result};
use rankdeck_core::ranking::{BinaryInsertionRanker, InsertionStep};
use rankdeck_core::rating::{EloRatingService, GlobalRating, RatingRepository};
use rankdeck_core::session::{
    PlaySession, PlayState, SessionRepository, SessionStatus, SwipeDirection,
};

use super::guard::ConcurrencyGuard;
use super::lifecycle::SessionLifecycle;
use super::responses::{
    ComparisonPair, ComparisonStep, RankEntry, SessionProbe, SessionResults, SessionStatistics,
    StartedSession, SwipeOutcome, VoteOutcome,
};

/// Orchestrates the ranking engine's operations over pluggable stores.
///
/// Mutation order inside an operation is fixed: validate against the loaded
/// document, commit the session through the version CAS, register the dedup
/// fingerprint, then apply rating side effects. The CAS decides races;
/// everything after it is keyed to a committed session state. Card existence
/// is verified before the commit, so a rating-store failure afterwards is
/// infrastructure-only: it is logged, the committed vote stands, and the
/// caller still gets the success response (a retry must be acknowledged as a
/// duplicate, not re-applied).
pub struct PlayService {
    sessions: Arc<dyn SessionRepository>,
    catalog: Arc<dyn CardCatalog>,
    lifecycle: SessionLifecycle,
    guard: ConcurrencyGuard,
    ratings: EloRatingService,
}

impl PlayService {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        catalog: Arc<dyn CardCatalog>,
        ratings: Arc<dyn RatingRepository>,
        config: EngineConfig,
    ) -> Self {
        Self {
            lifecycle: SessionLifecycle::new(catalog.clone(), config.clone()),
            guard: ConcurrencyGuard::new(&config),
            ratings: EloRatingService::new(catalog.clone(), ratings, &config),
            sessions,
            catalog,
        }
    }

    /// Starts a session: assembles a shuffled deck for the tenant and
    /// persists the new document.
    ///
    /// # Errors
    ///
    /// Returns `NoMatchingCards` when the tag filter yields an empty deck.
    pub async fn start_session(
        &self,
        tenant_id: &str,
        deck_tag: Option<&str>,
        client_ref: Option<String>,
    ) -> Result<StartedSession> {
        let now = Utc::now();
        let deck = self.lifecycle.assemble_deck(tenant_id, deck_tag).await?;
        let session = self.lifecycle.create_session(
            tenant_id,
            deck,
            deck_tag.map(str::to_string),
            client_ref,
            now,
        )?;
        self.sessions.insert(&session).await?;

        tracing::info!(
            tenant_id,
            session_id = %session.id,
            deck_size = session.deck.len(),
            "[PlayService] Session started"
        );
        Ok(StartedSession {
            session_id: session.id.clone(),
            deck: session.deck.clone(),
            expires_at: session.expires_at,
            version: session.version,
        })
    }

    /// Applies one swipe gesture.
    ///
    /// A right swipe into a non-empty ranking opens a voting round and the
    /// response carries the first comparison pair; otherwise the session
    /// stays in (or completes from) the swiping state.
    pub async fn submit_swipe(
        &self,
        tenant_id: &str,
        session_id: &str,
        card_id: &str,
        direction: SwipeDirection,
        expected_version: u64,
    ) -> Result<SwipeOutcome> {
        let now = Utc::now();
        let mut session = self.load(tenant_id, session_id).await?;
        self.guard.check_version(&session, expected_version)?;

        session.record_swipe(card_id, direction, now)?;
        session.touch(now);

        let comparison = if session.state == PlayState::Voting {
            Some(self.comparison_pair(tenant_id, &session).await?)
        } else {
            None
        };

        self.sessions.update(&session, expected_version).await?;

        // Engagement tallies are advisory and booked after the commit; deck
        // membership already vouched for the card at session start.
        if let Err(err) = self
            .ratings
            .record_swipe(tenant_id, card_id, direction == SwipeDirection::Right, now)
            .await
        {
            tracing::warn!(
                tenant_id,
                card_id,
                error = %err,
                "[PlayService] Swipe tally write failed after commit"
            );
        }

        tracing::debug!(
            tenant_id,
            session_id,
            card_id,
            ?direction,
            state = ?session.state,
            "[PlayService] Swipe applied"
        );
        Ok(SwipeOutcome {
            state: session.state,
            requires_voting: comparison.is_some(),
            comparison,
            session_completed: session.state == PlayState::Completed,
            version: session.version,
        })
    }

    /// Reports the next step for the candidate awaiting a ranking position.
    ///
    /// Never mutates: a collapsed interval is reported as the determined
    /// position, and the write happens on the vote path only.
    pub async fn next_comparison(
        &self,
        tenant_id: &str,
        session_id: &str,
        candidate_card_id: &str,
    ) -> Result<ComparisonStep> {
        let session = self.load(tenant_id, session_id).await?;
        match session.pending_candidate() {
            Some(candidate) if candidate == candidate_card_id => {}
            Some(_) | None => return Err(EngineError::NoPendingCandidate),
        }
        self.ensure_card(tenant_id, candidate_card_id).await?;

        match BinaryInsertionRanker::next_step(
            candidate_card_id,
            &session.personal_ranking,
            &session.votes,
        ) {
            InsertionStep::Compare { against } => {
                self.ensure_card(tenant_id, &against).await?;
                Ok(ComparisonStep::Pair {
                    card_a: candidate_card_id.to_string(),
                    card_b: against,
                    is_first_ranking: session.votes_for(candidate_card_id).is_empty(),
                })
            }
            InsertionStep::Insert { position } => Ok(ComparisonStep::PositionDetermined {
                final_position: position,
            }),
        }
    }

    /// Resolves the outstanding comparison in favor of `winner_id`.
    ///
    /// Appends the vote, either issues the next comparison for the same
    /// candidate or inserts it at the collapsed position, commits the
    /// session, and applies the ELO outcome to both cards' global ratings.
    pub async fn submit_vote(
        &self,
        tenant_id: &str,
        session_id: &str,
        winner_id: &str,
        expected_version: u64,
    ) -> Result<VoteOutcome> {
        let now = Utc::now();
        let mut session = self.load(tenant_id, session_id).await?;

        // Duplicate check first: a retried request carries the stale version,
        // and the idempotent signal is more useful than a version conflict.
        self.guard
            .check_duplicate_vote(session_id, winner_id, expected_version)
            .await?;
        self.guard.check_version(&session, expected_version)?;

        let candidate = session
            .pending_candidate()
            .ok_or(EngineError::NoPendingCandidate)?
            .to_string();
        let against = match BinaryInsertionRanker::next_step(
            &candidate,
            &session.personal_ranking,
            &session.votes,
        ) {
            InsertionStep::Compare { against } => against,
            InsertionStep::Insert { .. } => {
                return Err(EngineError::inconsistency(format!(
                    "no comparison is open for candidate '{candidate}'"
                )));
            }
        };
        if winner_id != candidate && winner_id != against {
            return Err(EngineError::CardsNotInPlay(winner_id.to_string()));
        }
        // Both pair cards must still exist before anything commits; a card
        // deleted mid-session rejects the whole vote.
        self.ensure_card(tenant_id, &candidate).await?;
        self.ensure_card(tenant_id, &against).await?;
        let loser = if winner_id == candidate {
            against.clone()
        } else {
            candidate.clone()
        };

        session.record_vote(&candidate, &against, winner_id, now)?;

        // The appended vote either collapses the interval or narrows it.
        let (next_comparison, inserted_at) = match BinaryInsertionRanker::next_step(
            &candidate,
            &session.personal_ranking,
            &session.votes,
        ) {
            InsertionStep::Compare { against } => {
                self.ensure_card(tenant_id, &against).await?;
                let pair = ComparisonPair {
                    card_a: candidate.clone(),
                    card_b: against,
                    is_first_ranking: false,
                };
                (Some(pair), None)
            }
            InsertionStep::Insert { position } => {
                session.insert_into_ranking(&candidate, position)?;
                session.end_voting()?;
                session.maybe_complete(now);
                (None, Some(position))
            }
        };

        session.touch(now);
        self.sessions.update(&session, expected_version).await?;

        // The session document is the authority once the CAS lands. Register
        // the fingerprint before the rating write so a retry is acknowledged
        // as a duplicate even if that write fails.
        self.guard
            .record_vote(session_id, winner_id, expected_version)
            .await;
        if let Err(err) = self
            .ratings
            .record_vote(tenant_id, winner_id, &loser, now)
            .await
        {
            tracing::warn!(
                tenant_id,
                session_id,
                winner = winner_id,
                error = %err,
                "[PlayService] Rating update failed after vote commit"
            );
        }

        tracing::debug!(
            tenant_id,
            session_id,
            candidate = candidate.as_str(),
            winner = winner_id,
            inserted_at,
            "[PlayService] Vote applied"
        );
        Ok(VoteOutcome {
            next_comparison,
            inserted_at,
            session_completed: session.state == PlayState::Completed,
            state: session.state,
            version: session.version,
        })
    }

    /// Probes a session's usability without trusting client-side state.
    ///
    /// The reported state is rederived from persisted facts. The one write
    /// this read can perform is the self-heal of a stalled, fully-swiped
    /// session that expired before its completion transition; a lost CAS on
    /// that heal is ignored, since it means another request got there first.
    pub async fn validate_session(&self, tenant_id: &str, session_id: &str) -> Result<SessionProbe> {
        let now = Utc::now();
        let mut session = self.load(tenant_id, session_id).await?;

        if self.lifecycle.heal_if_stalled(&mut session, now) {
            let expected = session.version;
            session.touch(now);
            if let Err(err) = self.sessions.update(&session, expected).await {
                if !err.is_conflict() {
                    return Err(err);
                }
            }
        }

        let status = session.effective_status(now);
        Ok(SessionProbe {
            is_valid: status != SessionStatus::Expired,
            state: session.derived_state(),
            status,
            version: session.version,
        })
    }

    /// Returns the personal ranking and interaction statistics.
    pub async fn results(&self, tenant_id: &str, session_id: &str) -> Result<SessionResults> {
        let session = self.load(tenant_id, session_id).await?;
        let ranking = session
            .personal_ranking
            .iter()
            .enumerate()
            .map(|(index, card_id)| RankEntry {
                rank: index + 1,
                card_id: card_id.clone(),
            })
            .collect();
        Ok(SessionResults {
            ranking,
            statistics: SessionStatistics {
                total_swipes: session.swiped_count(),
                total_votes: session.votes.len(),
                completion_rate: session.swiped_count() as f64 / session.deck.len() as f64,
            },
        })
    }

    /// Tenant-wide leaderboard by confidence-weighted global rating.
    pub async fn leaderboard(&self, tenant_id: &str, limit: usize) -> Result<Vec<GlobalRating>> {
        self.ratings.leaderboard(tenant_id, limit).await
    }

    async fn load(&self, tenant_id: &str, session_id: &str) -> Result<PlaySession> {
        self.sessions
            .find(tenant_id, session_id)
            .await?
            .ok_or_else(|| EngineError::session_not_found(session_id))
    }

    async fn ensure_card(&self, tenant_id: &str, card_id: &str) -> Result<()> {
        match self.catalog.get(tenant_id, card_id).await? {
            Some(_) => Ok(()),
            None => Err(EngineError::card_not_found(card_id)),
        }
    }

    /// First comparison pair for the candidate a swipe just accepted.
    async fn comparison_pair(
        &self,
        tenant_id: &str,
        session: &PlaySession,
    ) -> Result<ComparisonPair> {
        let candidate = session
            .pending_candidate()
            .ok_or(EngineError::NoPendingCandidate)?;
        match BinaryInsertionRanker::next_step(
            candidate,
            &session.personal_ranking,
            &session.votes,
        ) {
            InsertionStep::Compare { against } => {
                self.ensure_card(tenant_id, &against).await?;
                Ok(ComparisonPair {
                    card_a: candidate.to_string(),
                    card_b: against,
                    is_first_ranking: session.votes_for(candidate).is_empty(),
                })
            }
            InsertionStep::Insert { position } => Err(EngineError::inconsistency(format!(
                "candidate '{candidate}' entered voting with a collapsed interval at {position}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rankdeck_core::card::CardRef;
    use rankdeck_core::session::SessionStatus;
    use rankdeck_infrastructure::{MemoryCardCatalog, MemoryRatingStore, MemorySessionStore};

    struct Harness {
        service: PlayService,
        sessions: Arc<MemorySessionStore>,
        ratings: Arc<MemoryRatingStore>,
    }

    async fn harness(cards: &[&str]) -> Harness {
        let catalog = Arc::new(MemoryCardCatalog::new());
        catalog
            .seed(
                "t1",
                cards
                    .iter()
                    .map(|id| CardRef::new(*id, format!("Card {id}")))
                    .collect(),
            )
            .await;
        let sessions = Arc::new(MemorySessionStore::new());
        let ratings = Arc::new(MemoryRatingStore::new());
        let service = PlayService::new(
            sessions.clone(),
            catalog,
            ratings.clone(),
            EngineConfig::default(),
        );
        Harness {
            service,
            sessions,
            ratings,
        }
    }

    /// Swipes `card_id` right and resolves every comparison by `prefers`
    /// until the candidate is placed. Returns the version after the round.
    async fn accept_card(
        h: &Harness,
        session_id: &str,
        card_id: &str,
        version: u64,
        prefers: impl Fn(&str, &str) -> bool,
    ) -> u64 {
        let outcome = h
            .service
            .submit_swipe("t1", session_id, card_id, SwipeDirection::Right, version)
            .await
            .unwrap();
        let mut version = outcome.version;
        let mut comparison = outcome.comparison;
        while let Some(pair) = comparison {
            let winner = if prefers(&pair.card_a, &pair.card_b) {
                pair.card_a.clone()
            } else {
                pair.card_b.clone()
            };
            let outcome = h
                .service
                .submit_vote("t1", session_id, &winner, version)
                .await
                .unwrap();
            version = outcome.version;
            comparison = outcome.next_comparison;
        }
        version
    }

    #[tokio::test]
    async fn start_session_rejects_empty_filter() {
        let h = harness(&["a"]).await;
        let err = h
            .service
            .start_session("t1", Some("minerals"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NoMatchingCards { .. }));
    }

    #[tokio::test]
    async fn start_session_returns_full_shuffled_deck() {
        let h = harness(&["a", "b", "c", "d"]).await;
        let started = h.service.start_session("t1", None, None).await.unwrap();
        assert_eq!(started.version, 1);
        let mut deck = started.deck.clone();
        deck.sort();
        assert_eq!(deck, vec!["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn full_playthrough_sorts_by_preference_and_completes() {
        let h = harness(&["m", "c", "x", "a", "t"]).await;
        let started = h.service.start_session("t1", None, None).await.unwrap();
        let prefers = |a: &str, b: &str| a < b;

        let mut version = started.version;
        for card in &started.deck.clone() {
            version = accept_card(&h, &started.session_id, card, version, prefers).await;
        }

        let probe = h
            .service
            .validate_session("t1", &started.session_id)
            .await
            .unwrap();
        assert_eq!(probe.status, SessionStatus::Completed);
        assert_eq!(probe.state, PlayState::Completed);

        let results = h.service.results("t1", &started.session_id).await.unwrap();
        let order: Vec<&str> = results
            .ranking
            .iter()
            .map(|entry| entry.card_id.as_str())
            .collect();
        assert_eq!(order, vec!["a", "c", "m", "t", "x"]);
        assert_eq!(results.ranking[0].rank, 1);
        assert_eq!(results.statistics.total_swipes, 5);
        assert_eq!(results.statistics.completion_rate, 1.0);
    }

    #[tokio::test]
    async fn left_swipes_never_open_voting() {
        let h = harness(&["a", "b"]).await;
        let started = h.service.start_session("t1", None, None).await.unwrap();

        let mut version = started.version;
        for card in &started.deck.clone() {
            let outcome = h
                .service
                .submit_swipe("t1", &started.session_id, card, SwipeDirection::Left, version)
                .await
                .unwrap();
            assert!(!outcome.requires_voting);
            version = outcome.version;
        }

        let results = h.service.results("t1", &started.session_id).await.unwrap();
        assert!(results.ranking.is_empty());
        assert_eq!(results.statistics.total_votes, 0);
    }

    #[tokio::test]
    async fn second_acceptance_issues_first_comparison() {
        let h = harness(&["a", "b", "c"]).await;
        let started = h.service.start_session("t1", None, None).await.unwrap();
        let deck = started.deck.clone();

        let outcome = h
            .service
            .submit_swipe("t1", &started.session_id, &deck[0], SwipeDirection::Right, 1)
            .await
            .unwrap();
        assert!(!outcome.requires_voting);

        let outcome = h
            .service
            .submit_swipe(
                "t1",
                &started.session_id,
                &deck[1],
                SwipeDirection::Right,
                outcome.version,
            )
            .await
            .unwrap();
        assert!(outcome.requires_voting);
        let pair = outcome.comparison.unwrap();
        assert_eq!(pair.card_a, deck[1]);
        assert_eq!(pair.card_b, deck[0]);
        assert!(pair.is_first_ranking);

        // The read-only probe agrees with the swipe response.
        let step = h
            .service
            .next_comparison("t1", &started.session_id, &deck[1])
            .await
            .unwrap();
        assert_eq!(
            step,
            ComparisonStep::Pair {
                card_a: deck[1].clone(),
                card_b: deck[0].clone(),
                is_first_ranking: true,
            }
        );
    }

    #[tokio::test]
    async fn stale_version_swipe_is_rejected_without_mutation() {
        let h = harness(&["a", "b"]).await;
        let started = h.service.start_session("t1", None, None).await.unwrap();
        let deck = started.deck.clone();

        let err = h
            .service
            .submit_swipe("t1", &started.session_id, &deck[0], SwipeDirection::Left, 9)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::VersionConflict { .. }));

        let stored = h
            .sessions
            .find("t1", &started.session_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.version, 1);
        assert!(stored.swipes.is_empty());
    }

    #[tokio::test]
    async fn duplicate_vote_acknowledges_without_reapplying() {
        let h = harness(&["a", "b", "c"]).await;
        let started = h.service.start_session("t1", None, None).await.unwrap();
        let deck = started.deck.clone();

        let outcome = h
            .service
            .submit_swipe("t1", &started.session_id, &deck[0], SwipeDirection::Right, 1)
            .await
            .unwrap();
        let outcome = h
            .service
            .submit_swipe(
                "t1",
                &started.session_id,
                &deck[1],
                SwipeDirection::Right,
                outcome.version,
            )
            .await
            .unwrap();
        let pair = outcome.comparison.unwrap();
        let vote_version = outcome.version;

        let first = h
            .service
            .submit_vote("t1", &started.session_id, &pair.card_a, vote_version)
            .await
            .unwrap();
        assert_eq!(first.inserted_at, Some(0));

        // Client double-tap: same winner, same expected version.
        let err = h
            .service
            .submit_vote("t1", &started.session_id, &pair.card_a, vote_version)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::DuplicateVote { .. }));

        let stored = h
            .sessions
            .find("t1", &started.session_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.votes.len(), 1);
        assert_eq!(stored.version, first.version);
        let winner_rating = h.ratings.find("t1", &pair.card_a).await.unwrap().unwrap();
        assert_eq!(winner_rating.total_games, 1);
    }

    #[tokio::test]
    async fn vote_survives_a_failing_rating_store() {
        use rankdeck_core::rating::{OutcomeFn, TallyFn};

        struct FailingRatingStore;

        #[async_trait::async_trait]
        impl RatingRepository for FailingRatingStore {
            async fn find(&self, _: &str, _: &str) -> rankdeck_core::Result<Option<GlobalRating>> {
                Ok(None)
            }

            async fn list_for_tenant(&self, _: &str) -> rankdeck_core::Result<Vec<GlobalRating>> {
                Ok(Vec::new())
            }

            async fn record_outcome(
                &self,
                _: &str,
                _: GlobalRating,
                _: GlobalRating,
                _: OutcomeFn,
            ) -> rankdeck_core::Result<(GlobalRating, GlobalRating)> {
                Err(EngineError::data_access("rating store offline"))
            }

            async fn record_swipe(
                &self,
                _: &str,
                _: GlobalRating,
                _: TallyFn,
            ) -> rankdeck_core::Result<GlobalRating> {
                Err(EngineError::data_access("rating store offline"))
            }
        }

        let catalog = Arc::new(MemoryCardCatalog::new());
        catalog
            .seed("t1", vec![CardRef::new("a", "A"), CardRef::new("b", "B")])
            .await;
        let sessions = Arc::new(MemorySessionStore::new());
        let service = PlayService::new(
            sessions.clone(),
            catalog,
            Arc::new(FailingRatingStore),
            EngineConfig::default(),
        );

        let started = service.start_session("t1", None, None).await.unwrap();
        let deck = started.deck.clone();
        let outcome = service
            .submit_swipe("t1", &started.session_id, &deck[0], SwipeDirection::Right, 1)
            .await
            .unwrap();
        let outcome = service
            .submit_swipe(
                "t1",
                &started.session_id,
                &deck[1],
                SwipeDirection::Right,
                outcome.version,
            )
            .await
            .unwrap();
        let pair = outcome.comparison.unwrap();
        let vote_version = outcome.version;

        // The vote commits to the session even though the rating write fails.
        let voted = service
            .submit_vote("t1", &started.session_id, &pair.card_a, vote_version)
            .await
            .unwrap();
        assert_eq!(voted.inserted_at, Some(0));

        let stored = sessions
            .find("t1", &started.session_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.votes.len(), 1);
        assert_eq!(stored.version, voted.version);
        assert_eq!(stored.personal_ranking.len(), 2);

        // The retry is acknowledged as a duplicate, not a version conflict.
        let err = service
            .submit_vote("t1", &started.session_id, &pair.card_a, vote_version)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::DuplicateVote { .. }));
    }

    #[tokio::test]
    async fn vote_for_card_outside_the_pair_is_rejected() {
        let h = harness(&["a", "b", "c"]).await;
        let started = h.service.start_session("t1", None, None).await.unwrap();
        let deck = started.deck.clone();

        let outcome = h
            .service
            .submit_swipe("t1", &started.session_id, &deck[0], SwipeDirection::Right, 1)
            .await
            .unwrap();
        let outcome = h
            .service
            .submit_swipe(
                "t1",
                &started.session_id,
                &deck[1],
                SwipeDirection::Right,
                outcome.version,
            )
            .await
            .unwrap();

        let err = h
            .service
            .submit_vote("t1", &started.session_id, &deck[2], outcome.version)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::CardsNotInPlay(_)));
    }

    #[tokio::test]
    async fn vote_updates_global_ratings_atomically_with_tallies() {
        let h = harness(&["a", "b", "c"]).await;
        let started = h.service.start_session("t1", None, None).await.unwrap();
        let deck = started.deck.clone();

        let outcome = h
            .service
            .submit_swipe("t1", &started.session_id, &deck[0], SwipeDirection::Right, 1)
            .await
            .unwrap();
        let outcome = h
            .service
            .submit_swipe(
                "t1",
                &started.session_id,
                &deck[1],
                SwipeDirection::Right,
                outcome.version,
            )
            .await
            .unwrap();
        let pair = outcome.comparison.unwrap();

        h.service
            .submit_vote("t1", &started.session_id, &pair.card_a, outcome.version)
            .await
            .unwrap();

        let winner = h.ratings.find("t1", &pair.card_a).await.unwrap().unwrap();
        let loser = h.ratings.find("t1", &pair.card_b).await.unwrap().unwrap();
        assert!(winner.rating > loser.rating);
        assert_eq!(winner.wins, 1);
        assert_eq!(loser.losses, 1);
        // Both cards also carry their right-swipe tallies.
        assert_eq!(winner.likes, 1);
        assert_eq!(loser.likes, 1);
    }

    #[tokio::test]
    async fn next_comparison_requires_the_pending_candidate() {
        let h = harness(&["a", "b"]).await;
        let started = h.service.start_session("t1", None, None).await.unwrap();

        let err = h
            .service
            .next_comparison("t1", &started.session_id, "a")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NoPendingCandidate));
    }

    #[tokio::test]
    async fn validate_heals_a_stalled_expired_session() {
        use chrono::Duration;
        use rankdeck_core::session::SwipeRecord;

        let h = harness(&["a", "b"]).await;
        let now = Utc::now();
        // A document a crashed client left fully swiped but never completed.
        let mut session = PlaySession::new(
            "t1",
            vec!["a".to_string(), "b".to_string()],
            None,
            None,
            Duration::hours(24),
            now - Duration::hours(48),
        );
        session.activate().unwrap();
        for card in ["a", "b"] {
            session.swipes.push(SwipeRecord {
                card_id: card.to_string(),
                direction: SwipeDirection::Left,
                recorded_at: now - Duration::hours(47),
            });
        }
        h.sessions.insert(&session).await.unwrap();

        let probe = h.service.validate_session("t1", &session.id).await.unwrap();
        assert!(probe.is_valid);
        assert_eq!(probe.status, SessionStatus::Completed);
        assert_eq!(probe.version, session.version + 1);

        let stored = h.sessions.find("t1", &session.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SessionStatus::Completed);
    }

    #[tokio::test]
    async fn validate_reports_plain_expiry_without_writing() {
        use chrono::Duration;

        let h = harness(&["a", "b"]).await;
        let now = Utc::now();
        // Expired mid-deck: not a candidate for healing.
        let mut session = PlaySession::new(
            "t1",
            vec!["a".to_string(), "b".to_string()],
            None,
            None,
            Duration::hours(24),
            now - Duration::hours(48),
        );
        session.activate().unwrap();
        h.sessions.insert(&session).await.unwrap();

        let probe = h.service.validate_session("t1", &session.id).await.unwrap();
        assert!(!probe.is_valid);
        assert_eq!(probe.status, SessionStatus::Expired);

        let stored = h.sessions.find("t1", &session.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SessionStatus::Active);
        assert_eq!(stored.version, session.version);
    }

    #[tokio::test]
    async fn unknown_session_reports_not_found() {
        let h = harness(&["a"]).await;
        let err = h.service.results("t1", "nope").await.unwrap_err();
        assert!(matches!(err, EngineError::SessionNotFound(_)));
        let err = h
            .service
            .validate_session("t2", "nope")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::SessionNotFound(_)));
    }

    #[tokio::test]
    async fn leaderboard_reflects_session_votes() {
        let h = harness(&["a", "b", "c"]).await;
        let started = h.service.start_session("t1", None, None).await.unwrap();
        let prefers = |x: &str, y: &str| x < y;

        let mut version = started.version;
        for card in &started.deck.clone() {
            version = accept_card(&h, &started.session_id, card, version, prefers).await;
        }

        let board = h.service.leaderboard("t1", 10).await.unwrap();
        assert!(!board.is_empty());
        // Every comparison was decided alphabetically, so "a" never lost.
        let a = board.iter().find(|r| r.card_id == "a").unwrap();
        assert_eq!(a.losses, 0);
    }
}
