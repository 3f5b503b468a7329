//! Optimistic-concurrency checks shared by the play operations.

use tokio::sync::Mutex;

use rankdeck_core::config::EngineConfig;
use rankdeck_core::error::{EngineError, Result};
use rankdeck_core::session::PlaySession;
use rankdeck_infrastructure::VoteDeduper;

/// Version precheck plus the duplicate-vote window.
///
/// The precheck rejects stale clients before any store round-trip; the
/// repository CAS remains the authority for races that slip past it. The
/// deduper absorbs double-taps: a retried vote repeats both the winner and
/// the expected version, so that pair is the dedup fingerprint. The same
/// winner submitted against an advanced version is a new vote, not a
/// duplicate.
pub struct ConcurrencyGuard {
    deduper: Mutex<VoteDeduper>,
}

impl ConcurrencyGuard {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            deduper: Mutex::new(VoteDeduper::new(
                config.vote_dedup_window(),
                config.dedup_capacity,
            )),
        }
    }

    /// Rejects a mutation carrying a stale expected version.
    pub fn check_version(&self, session: &PlaySession, expected_version: u64) -> Result<()> {
        if session.version != expected_version {
            return Err(EngineError::VersionConflict {
                expected: expected_version,
                actual: session.version,
            });
        }
        Ok(())
    }

    /// Rejects a vote request already applied within the dedup window.
    ///
    /// Call before the version precheck: the retry carries the stale
    /// version, and the idempotent `DuplicateVote` signal is more useful to
    /// the client than `VersionConflict`.
    pub async fn check_duplicate_vote(
        &self,
        session_id: &str,
        winner_card_id: &str,
        expected_version: u64,
    ) -> Result<()> {
        let fingerprint = Self::fingerprint(winner_card_id, expected_version);
        let mut deduper = self.deduper.lock().await;
        if deduper.is_duplicate(session_id, &fingerprint) {
            return Err(EngineError::DuplicateVote {
                winner: winner_card_id.to_string(),
            });
        }
        Ok(())
    }

    /// Registers an applied vote; call only after the whole vote (session
    /// commit and rating update) succeeds.
    pub async fn record_vote(
        &self,
        session_id: &str,
        winner_card_id: &str,
        expected_version: u64,
    ) {
        let fingerprint = Self::fingerprint(winner_card_id, expected_version);
        self.deduper.lock().await.record(session_id, &fingerprint);
    }

    fn fingerprint(winner_card_id: &str, expected_version: u64) -> String {
        format!("{winner_card_id}@{expected_version}")
    }
}
