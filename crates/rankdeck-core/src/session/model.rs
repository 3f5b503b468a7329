//! Play session domain model.
//!
//! This module contains the core `PlaySession` aggregate that owns a single
//! player's journey through a deck: the fixed card order, the swipe and vote
//! history, and the personal ranking built from them.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::state::{PlayState, SessionStatus, SwipeDirection};
use crate::error::{EngineError, Result};

/// One recorded swipe gesture. Append-only; at most one per deck card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwipeRecord {
    pub card_id: String,
    pub direction: SwipeDirection,
    pub recorded_at: DateTime<Utc>,
}

/// One recorded pairwise comparison. Append-only.
///
/// `card_a` is the candidate being positioned, `card_b` the already-ranked
/// opponent it was shown against. `winner` is one of the two. History is
/// never rewritten, even when a referenced card later leaves the ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub card_a: String,
    pub card_b: String,
    pub winner: String,
    pub recorded_at: DateTime<Utc>,
}

impl VoteRecord {
    /// The card that lost this comparison.
    pub fn loser(&self) -> &str {
        if self.winner == self.card_a {
            &self.card_b
        } else {
            &self.card_a
        }
    }

    /// Whether `card_id` participated in this comparison.
    pub fn involves(&self, card_id: &str) -> bool {
        self.card_a == card_id || self.card_b == card_id
    }
}

/// A single player's pass through a deck of cards.
///
/// The aggregate owns:
/// - the immutable deck order fixed at creation
/// - append-only swipe and vote histories
/// - the personal ranking (best first) built by binary insertion
/// - the optimistic version every mutation must advance
///
/// Mutation methods enforce the aggregate invariants (one swipe per card,
/// ranking contains only accepted cards, no writes after completion).
/// Callers stamp each accepted client mutation exactly once via [`touch`],
/// which advances the optimistic version.
///
/// [`touch`]: PlaySession::touch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaySession {
    /// Unique session identifier (UUID format)
    pub id: String,
    /// Owning tenant; all lookups are scoped by this
    pub tenant_id: String,
    /// Optional client-supplied correlation id (browser session etc.)
    #[serde(default)]
    pub client_ref: Option<String>,
    /// Card ids in presentation order; fixed at creation, never mutated
    pub deck: Vec<String>,
    /// Category filter the deck was assembled from, if any
    #[serde(default)]
    pub deck_tag: Option<String>,
    /// Coarse lifecycle status
    pub status: SessionStatus,
    /// Cached interaction state; rederivable from the fields below
    pub state: PlayState,
    /// Swipe history, at most one entry per deck card
    #[serde(default)]
    pub swipes: Vec<SwipeRecord>,
    /// Pairwise vote history
    #[serde(default)]
    pub votes: Vec<VoteRecord>,
    /// Accepted cards ordered best to worst
    #[serde(default)]
    pub personal_ranking: Vec<String>,
    /// Optimistic concurrency version, starts at 1
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl PlaySession {
    /// Creates a session around an assembled deck.
    ///
    /// The session starts in `Initializing`; call [`activate`] once the deck
    /// is confirmed non-empty to open it for swipes.
    ///
    /// [`activate`]: PlaySession::activate
    pub fn new(
        tenant_id: impl Into<String>,
        deck: Vec<String>,
        deck_tag: Option<String>,
        client_ref: Option<String>,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.into(),
            client_ref,
            deck,
            deck_tag,
            status: SessionStatus::Active,
            state: PlayState::Initializing,
            swipes: Vec::new(),
            votes: Vec::new(),
            personal_ranking: Vec::new(),
            version: 1,
            created_at: now,
            updated_at: now,
            expires_at: now + ttl,
            completed_at: None,
        }
    }

    // ============================================================================
    // Derivations
    // ============================================================================

    pub fn has_swiped(&self, card_id: &str) -> bool {
        self.swipes.iter().any(|s| s.card_id == card_id)
    }

    pub fn swiped_count(&self) -> usize {
        self.swipes.len()
    }

    /// Deck cards not yet swiped, in deck order.
    pub fn remaining_cards(&self) -> Vec<&str> {
        self.deck
            .iter()
            .filter(|card| !self.has_swiped(card))
            .map(String::as_str)
            .collect()
    }

    pub fn remaining_count(&self) -> usize {
        self.deck.len() - self.swiped_count()
    }

    pub fn is_fully_swiped(&self) -> bool {
        self.swiped_count() >= self.deck.len()
    }

    /// Right-swiped cards in swipe order.
    pub fn accepted_cards(&self) -> Vec<&str> {
        self.swipes
            .iter()
            .filter(|s| s.direction == SwipeDirection::Right)
            .map(|s| s.card_id.as_str())
            .collect()
    }

    /// The accepted card still awaiting a ranking position, if any.
    ///
    /// At most one can exist: swipes are rejected while a candidate is
    /// outstanding, so only the most recent acceptance can be unranked.
    pub fn pending_candidate(&self) -> Option<&str> {
        self.accepted_cards()
            .into_iter()
            .find(|card| !self.personal_ranking.iter().any(|r| r == card))
    }

    /// Votes in which `card_id` participated, oldest first.
    pub fn votes_for(&self, card_id: &str) -> Vec<&VoteRecord> {
        self.votes.iter().filter(|v| v.involves(card_id)).collect()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == SessionStatus::Active && now >= self.expires_at
    }

    /// Status with lazy expiry applied; never writes.
    pub fn effective_status(&self, now: DateTime<Utc>) -> SessionStatus {
        if self.is_expired(now) {
            SessionStatus::Expired
        } else {
            self.status
        }
    }

    /// Interaction state recomputed from persisted facts (the stored
    /// `state` field is only a cache of this).
    pub fn derived_state(&self) -> PlayState {
        PlayState::derive(
            self.state,
            self.status,
            self.deck.len(),
            self.swiped_count(),
            self.pending_candidate().is_some(),
        )
    }

    // ============================================================================
    // Mutations
    // ============================================================================

    /// Rejects writes to completed or expired sessions.
    pub fn ensure_mutable(&self, now: DateTime<Utc>) -> Result<()> {
        match self.status {
            SessionStatus::Completed => Err(EngineError::SessionCompleted(self.id.clone())),
            SessionStatus::Expired => Err(EngineError::SessionExpired(self.id.clone())),
            SessionStatus::Active => {
                if self.is_expired(now) {
                    Err(EngineError::SessionExpired(self.id.clone()))
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Opens the session for swipes once the deck is in place.
    pub fn activate(&mut self) -> Result<()> {
        if self.deck.is_empty() {
            return Err(EngineError::NoMatchingCards {
                tag: self.deck_tag.clone(),
            });
        }
        self.transition_to(PlayState::Swiping)
    }

    /// Applies one swipe gesture.
    ///
    /// A right swipe into an empty ranking accepts the card directly (there
    /// is nothing to compare against); a right swipe otherwise leaves the
    /// card as the pending candidate and moves the session to `Voting`.
    /// Completes the session when the last card resolves without a pending
    /// comparison. Does not advance the version; the caller stamps the
    /// mutation via [`touch`].
    ///
    /// [`touch`]: PlaySession::touch
    pub fn record_swipe(
        &mut self,
        card_id: &str,
        direction: SwipeDirection,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.ensure_mutable(now)?;
        if self.state == PlayState::Voting || self.pending_candidate().is_some() {
            return Err(EngineError::VotePending);
        }
        if !self.deck.iter().any(|c| c == card_id) {
            return Err(EngineError::card_not_found(card_id));
        }
        if self.has_swiped(card_id) {
            return Err(EngineError::CardAlreadySwiped(card_id.to_string()));
        }

        self.swipes.push(SwipeRecord {
            card_id: card_id.to_string(),
            direction,
            recorded_at: now,
        });

        if direction == SwipeDirection::Right {
            if self.personal_ranking.is_empty() {
                // First accepted card takes position 0 without comparisons
                self.personal_ranking.push(card_id.to_string());
            } else {
                self.transition_to(PlayState::Voting)?;
            }
        }

        self.maybe_complete(now);
        Ok(())
    }

    /// Appends a comparison outcome for the pending candidate.
    ///
    /// `card_a` must be the pending candidate and `winner` one of the pair.
    /// Ranking insertion is a separate step ([`insert_into_ranking`]) driven
    /// by the caller once the candidate's position interval collapses.
    ///
    /// [`insert_into_ranking`]: PlaySession::insert_into_ranking
    pub fn record_vote(
        &mut self,
        card_a: &str,
        card_b: &str,
        winner: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.ensure_mutable(now)?;
        match self.pending_candidate() {
            Some(candidate) if candidate == card_a => {}
            Some(_) | None => return Err(EngineError::NoPendingCandidate),
        }
        if winner != card_a && winner != card_b {
            return Err(EngineError::CardsNotInPlay(winner.to_string()));
        }

        self.votes.push(VoteRecord {
            card_a: card_a.to_string(),
            card_b: card_b.to_string(),
            winner: winner.to_string(),
            recorded_at: now,
        });
        Ok(())
    }

    /// Places an accepted card at `position` in the personal ranking.
    pub fn insert_into_ranking(&mut self, card_id: &str, position: usize) -> Result<()> {
        if !self.accepted_cards().contains(&card_id) {
            return Err(EngineError::inconsistency(format!(
                "card '{card_id}' was never accepted in this session"
            )));
        }
        if self.personal_ranking.iter().any(|c| c == card_id) {
            return Err(EngineError::inconsistency(format!(
                "card '{card_id}' is already ranked"
            )));
        }
        if position > self.personal_ranking.len() {
            return Err(EngineError::inconsistency(format!(
                "insert position {position} beyond ranking of {}",
                self.personal_ranking.len()
            )));
        }
        self.personal_ranking.insert(position, card_id.to_string());
        Ok(())
    }

    /// Returns from `Voting` to `Swiping` after a candidate is placed.
    pub fn end_voting(&mut self) -> Result<()> {
        self.transition_to(PlayState::Swiping)
    }

    /// Completes the session if every card is swiped and no candidate is
    /// outstanding. Returns whether completion happened.
    pub fn maybe_complete(&mut self, now: DateTime<Utc>) -> bool {
        if self.status == SessionStatus::Active
            && self.is_fully_swiped()
            && self.pending_candidate().is_none()
            && self.state.can_transition(PlayState::Completed)
        {
            self.status = SessionStatus::Completed;
            self.state = PlayState::Completed;
            self.completed_at = Some(now);
            true
        } else {
            false
        }
    }

    /// Marks the session's interaction state as faulted.
    pub fn mark_error(&mut self) {
        // Error is reachable from every state
        self.state = PlayState::Error;
    }

    /// Recovers a faulted or completed session back to `Initializing`,
    /// keeping the deck but wiping interaction history and reopening the
    /// lifecycle.
    pub fn reset(&mut self) -> Result<()> {
        self.transition_to(PlayState::Initializing)?;
        self.status = SessionStatus::Active;
        self.swipes.clear();
        self.votes.clear();
        self.personal_ranking.clear();
        self.completed_at = None;
        Ok(())
    }

    /// Stamps an accepted mutation: bumps the optimistic version and the
    /// update timestamp. Call exactly once per client mutation.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.version += 1;
        self.updated_at = now;
    }

    fn transition_to(&mut self, next: PlayState) -> Result<()> {
        if !self.state.can_transition(next) {
            return Err(EngineError::internal(format!(
                "illegal state transition {:?} -> {:?} for session '{}'",
                self.state, next, self.id
            )));
        }
        self.state = next;
        Ok(())
    }
}
