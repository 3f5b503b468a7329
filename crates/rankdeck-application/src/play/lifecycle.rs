//! Session lifecycle: deck assembly, creation, and expiry handling.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;

use rankdeck_core::card::CardCatalog;
use rankdeck_core::config::EngineConfig;
use rankdeck_core::error::{EngineError, Result};
use rankdeck_core::session::{PlaySession, PlayState};

/// Builds sessions from the card catalog and applies lifecycle policy.
///
/// Expiry is lazy: sessions are never scanned by a timer. The one write this
/// component performs on an expired session is the forced completion of a
/// stalled, fully-swiped deck, which a crashed or disconnected client left
/// without its final transition.
pub struct SessionLifecycle {
    catalog: Arc<dyn CardCatalog>,
    config: EngineConfig,
}

impl SessionLifecycle {
    pub fn new(catalog: Arc<dyn CardCatalog>, config: EngineConfig) -> Self {
        Self { catalog, config }
    }

    /// Assembles a fresh deck for a tenant: active cards matching the tag,
    /// de-duplicated, then shuffled.
    ///
    /// # Errors
    ///
    /// Returns `NoMatchingCards` when the filter yields an empty deck.
    pub async fn assemble_deck(
        &self,
        tenant_id: &str,
        deck_tag: Option<&str>,
    ) -> Result<Vec<String>> {
        let cards = self.catalog.list_active(tenant_id, deck_tag).await?;

        let mut deck: Vec<String> = Vec::with_capacity(cards.len());
        for card in cards {
            if !deck.contains(&card.id) {
                deck.push(card.id);
            }
        }
        if deck.is_empty() {
            return Err(EngineError::NoMatchingCards {
                tag: deck_tag.map(str::to_string),
            });
        }

        deck.shuffle(&mut rand::thread_rng());
        Ok(deck)
    }

    /// Creates and activates a session around an assembled deck.
    pub fn create_session(
        &self,
        tenant_id: &str,
        deck: Vec<String>,
        deck_tag: Option<String>,
        client_ref: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<PlaySession> {
        let mut session = PlaySession::new(
            tenant_id,
            deck,
            deck_tag,
            client_ref,
            self.config.session_ttl(),
            now,
        );
        session.activate()?;
        Ok(session)
    }

    /// Force-completes an expired session whose deck was fully swiped but
    /// which never received its completion transition.
    ///
    /// A session currently in `Voting` is left alone; the in-flight
    /// comparison must be allowed to finish. Returns whether the session
    /// changed.
    pub fn heal_if_stalled(&self, session: &mut PlaySession, now: DateTime<Utc>) -> bool {
        if !session.is_expired(now) {
            return false;
        }
        if session.derived_state() == PlayState::Voting {
            return false;
        }
        if !session.is_fully_swiped() {
            return false;
        }

        let healed = session.maybe_complete(now);
        if healed {
            tracing::info!(
                "[SessionLifecycle] Force-completed stalled session {} (expired with full deck swiped)",
                session.id
            );
        }
        healed
    }
}
