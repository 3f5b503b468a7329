//! In-memory session repository.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use rankdeck_core::error::{EngineError, Result};
use rankdeck_core::session::{PlaySession, SessionRepository};

type SessionKey = (String, String);

/// Tenant-scoped session store backed by a `RwLock<HashMap>`.
///
/// The write lock makes the version compare-and-swap in `update` atomic:
/// of two racing writers carrying the same expected version, the second one
/// observes the first one's bump and receives `VersionConflict`.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionKey, PlaySession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(session: &PlaySession) -> SessionKey {
        (session.tenant_id.clone(), session.id.clone())
    }
}

#[async_trait]
impl SessionRepository for MemorySessionStore {
    async fn insert(&self, session: &PlaySession) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        let key = Self::key(session);
        if sessions.contains_key(&key) {
            return Err(EngineError::data_access(format!(
                "session '{}' already exists",
                session.id
            )));
        }
        sessions.insert(key, session.clone());
        Ok(())
    }

    async fn find(&self, tenant_id: &str, session_id: &str) -> Result<Option<PlaySession>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(&(tenant_id.to_string(), session_id.to_string()))
            .cloned())
    }

    async fn update(&self, session: &PlaySession, expected_version: u64) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        let key = Self::key(session);
        let stored = sessions
            .get(&key)
            .ok_or_else(|| EngineError::session_not_found(&session.id))?;
        if stored.version != expected_version {
            return Err(EngineError::VersionConflict {
                expected: expected_version,
                actual: stored.version,
            });
        }
        sessions.insert(key, session.clone());
        Ok(())
    }

    async fn list_for_tenant(&self, tenant_id: &str) -> Result<Vec<PlaySession>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .iter()
            .filter(|((tenant, _), _)| tenant == tenant_id)
            .map(|(_, session)| session.clone())
            .collect())
    }
}
