//! Bounded TTL cache for suppressing rapid duplicate votes.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Remembers recently applied votes keyed by `(session_id, fingerprint)`.
///
/// The fingerprint is caller-defined; the engine uses the winner card id
/// combined with the request's expected version, so only a retry of the same
/// request matches. Entries expire after the configured window and the map
/// is capped at `max_entries`, evicting the oldest entry when full. Methods
/// take `&mut self`; callers that share the deduper across tasks wrap it in
/// a mutex.
pub struct VoteDeduper {
    window: Duration,
    max_entries: usize,
    seen: HashMap<(String, String), Instant>,
}

impl VoteDeduper {
    pub fn new(window: Duration, max_entries: usize) -> Self {
        Self {
            window,
            max_entries,
            seen: HashMap::new(),
        }
    }

    /// Returns true if the same fingerprint was recorded for this session
    /// within the window.
    pub fn is_duplicate(&mut self, session_id: &str, fingerprint: &str) -> bool {
        self.seen.retain(|_, stamp| stamp.elapsed() <= self.window);
        self.seen
            .contains_key(&(session_id.to_string(), fingerprint.to_string()))
    }

    /// Marks a vote as applied.
    pub fn record(&mut self, session_id: &str, fingerprint: &str) {
        self.seen.retain(|_, stamp| stamp.elapsed() <= self.window);
        if self.seen.len() >= self.max_entries {
            if let Some(victim) = self
                .seen
                .iter()
                .min_by_key(|(_, stamp)| **stamp)
                .map(|(key, _)| key.clone())
            {
                self.seen.remove(&victim);
            }
        }
        self.seen.insert(
            (session_id.to_string(), fingerprint.to_string()),
            Instant::now(),
        );
    }
}
