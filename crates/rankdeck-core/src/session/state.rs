//! Session state types.
//!
//! Two levels of state coexist: [`SessionStatus`] is the coarse lifecycle
//! (is the document still writable), [`PlayState`] is the fine interaction
//! state (what the client may do next). The fine state is rederivable from
//! persisted facts so a session survives client disconnects; the stored value
//! is a cache that validation reconciles.

use serde::{Deserialize, Serialize};

/// Coarse session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// Session accepts swipes and votes.
    Active,
    /// All cards processed; the document is immutable.
    Completed,
    /// TTL elapsed before completion; the document is immutable.
    Expired,
}

/// Direction of a swipe gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwipeDirection {
    /// Discard the card.
    Left,
    /// Accept the card into the personal ranking.
    Right,
}

/// Fine-grained interaction state driving what the client may do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayState {
    /// Deck is being assembled; no interaction accepted yet.
    Initializing,
    /// Client swipes through remaining deck cards.
    Swiping,
    /// A comparison pair is outstanding; only a vote resolves it.
    Voting,
    /// Every card swiped and every accepted card ranked; only a reset
    /// reopens the session.
    Completed,
    /// Unrecoverable interaction fault; only a reset leaves this state.
    Error,
}

impl PlayState {
    /// Whether the machine permits moving from `self` to `next`.
    pub fn can_transition(&self, next: PlayState) -> bool {
        use PlayState::*;
        match (*self, next) {
            (_, Error) => true,
            (Error, Initializing) => true,
            (Error, _) => false,
            (Completed, Initializing) => true,
            (Initializing, Swiping) => true,
            (Swiping, Voting) | (Swiping, Completed) => true,
            (Voting, Swiping) | (Voting, Completed) => true,
            _ => false,
        }
    }

    /// Recomputes the interaction state from persisted facts alone.
    ///
    /// The stored state field is a cache; this is the authority. An `Error`
    /// state is sticky and cannot be derived away, so callers pass the stored
    /// state in.
    pub fn derive(
        stored: PlayState,
        status: SessionStatus,
        deck_size: usize,
        swiped_count: usize,
        has_pending_candidate: bool,
    ) -> PlayState {
        if stored == PlayState::Error {
            return PlayState::Error;
        }
        if status == SessionStatus::Completed {
            return PlayState::Completed;
        }
        if deck_size == 0 {
            return PlayState::Initializing;
        }
        if has_pending_candidate {
            return PlayState::Voting;
        }
        if swiped_count >= deck_size {
            return PlayState::Completed;
        }
        PlayState::Swiping
    }
}
