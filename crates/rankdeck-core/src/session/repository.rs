//! Session repository trait.
//!
//! Defines the interface for tenant-scoped session persistence.

use async_trait::async_trait;

use super::model::PlaySession;
use crate::error::Result;

/// An abstract repository for play session persistence.
///
/// This trait decouples the engine from the storage mechanism (in-memory
/// map, TOML directory, database). All lookups are tenant-scoped; a session
/// id from another tenant behaves as not found.
///
/// # Implementation Notes
///
/// `update` is the concurrency linchpin: implementations must compare the
/// stored version against `expected_version` and replace the document
/// atomically, so that two racing writers with the same expectation resolve
/// to exactly one winner.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Persists a brand-new session.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Session stored
    /// - `Err(DataAccess)`: A session with this id already exists
    async fn insert(&self, session: &PlaySession) -> Result<()>;

    /// Finds a session by id within a tenant.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(PlaySession))`: Session found
    /// - `Ok(None)`: No such session for this tenant
    /// - `Err(_)`: Error occurred during retrieval
    async fn find(&self, tenant_id: &str, session_id: &str) -> Result<Option<PlaySession>>;

    /// Replaces a stored session iff its version still equals
    /// `expected_version` (compare-and-swap).
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Stored version matched and the document was replaced
    /// - `Err(VersionConflict)`: Another writer got there first
    /// - `Err(SessionNotFound)`: Session vanished
    async fn update(&self, session: &PlaySession, expected_version: u64) -> Result<()>;

    /// Lists all sessions belonging to a tenant.
    async fn list_for_tenant(&self, tenant_id: &str) -> Result<Vec<PlaySession>>;
}
