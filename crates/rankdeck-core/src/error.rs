//! Error types for the rankdeck engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire ranking engine.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait. Variants are grouped by how
/// callers should react: not-found, conflict (safe to retry or acknowledge),
/// invalid-state (client bug or stale client), and infrastructure.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum EngineError {
    /// Session does not exist for the tenant
    #[error("Session not found: '{0}'")]
    SessionNotFound(String),

    /// Session exists but its TTL has elapsed
    #[error("Session '{0}' has expired")]
    SessionExpired(String),

    /// Session exists but is already completed and immutable
    #[error("Session '{0}' is already completed")]
    SessionCompleted(String),

    /// Card does not exist or is not part of the session deck
    #[error("Card not found: '{0}'")]
    CardNotFound(String),

    /// Deck assembly found no active cards for the filter
    #[error("No active cards match deck filter '{}'", .tag.as_deref().unwrap_or("any"))]
    NoMatchingCards { tag: Option<String> },

    /// Optimistic concurrency check failed
    #[error("Version conflict: expected {expected}, stored {actual}")]
    VersionConflict { expected: u64, actual: u64 },

    /// Same vote was already applied within the dedup window
    #[error("Duplicate vote for card '{winner}'")]
    DuplicateVote { winner: String },

    /// Each deck card accepts exactly one swipe
    #[error("Card '{0}' was already swiped in this session")]
    CardAlreadySwiped(String),

    /// Voted-for card is not one of the outstanding comparison pair
    #[error("Card '{0}' is not part of the active comparison")]
    CardsNotInPlay(String),

    /// A comparison is outstanding; swipes are blocked until it resolves
    #[error("A comparison is still awaiting a vote")]
    VotePending,

    /// No accepted card is currently awaiting a ranking position
    #[error("No candidate card is awaiting ranking")]
    NoPendingCandidate,

    /// Session data contradicts itself (e.g. a comparison card vanished)
    #[error("Ranking inconsistency: {0}")]
    RankingInconsistency(String),

    /// Request failed input validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Data access error (repository/storage layer)
    #[error("Data access error: {0}")]
    DataAccess(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngineError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a SessionNotFound error
    pub fn session_not_found(id: impl Into<String>) -> Self {
        Self::SessionNotFound(id.into())
    }

    /// Creates a CardNotFound error
    pub fn card_not_found(id: impl Into<String>) -> Self {
        Self::CardNotFound(id.into())
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a RankingInconsistency error
    pub fn inconsistency(message: impl Into<String>) -> Self {
        Self::RankingInconsistency(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a DataAccess error
    pub fn data_access(message: impl Into<String>) -> Self {
        Self::DataAccess(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is any not-found condition (session, card, or empty deck)
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::SessionNotFound(_) | Self::CardNotFound(_) | Self::NoMatchingCards { .. }
        )
    }

    /// Check if this is a concurrency conflict (stale version or repeated vote).
    ///
    /// Conflict errors are safe for clients to handle by refetching or by
    /// treating the request as already applied; no state was corrupted.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::VersionConflict { .. } | Self::DuplicateVote { .. }
        )
    }

    /// Check if this rejects the request because of the session's current
    /// state rather than the request payload
    pub fn is_invalid_state(&self) -> bool {
        matches!(
            self,
            Self::SessionExpired(_)
                | Self::SessionCompleted(_)
                | Self::CardAlreadySwiped(_)
                | Self::CardsNotInPlay(_)
                | Self::VotePending
                | Self::NoPendingCandidate
        )
    }

    /// Check if this is a serialization error
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for EngineError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for EngineError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from String (for error messages)
impl From<String> for EngineError {
    fn from(err: String) -> Self {
        Self::Internal(err)
    }
}

/// A type alias for `Result<T, EngineError>`.
pub type Result<T> = std::result::Result<T, EngineError>;
