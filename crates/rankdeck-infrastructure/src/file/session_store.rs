//! TOML-file session repository.
//!
//! One document per session under a per-tenant directory:
//!
//! ```text
//! base_dir/
//! └── <tenant_id>/
//!     ├── <session_id_1>.toml
//!     ├── <session_id_2>.toml
//!     └── .tenant.lock
//! ```
//!
//! Writes go through a temporary file with an explicit fsync followed by an
//! atomic rename, under an advisory per-tenant file lock, so the version
//! compare-and-swap in `update` holds across processes. Reads take no lock;
//! the rename guarantees they always see a complete document.

use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use rankdeck_core::error::{EngineError, Result};
use rankdeck_core::session::{PlaySession, SessionRepository};

use crate::paths::RankdeckPaths;

/// File-per-session repository with atomic writes and advisory locking.
pub struct FileSessionStore {
    base_dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Creates a store at the platform default location.
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(RankdeckPaths::sessions_dir()?))
    }

    fn tenant_dir(&self, tenant_id: &str) -> Result<PathBuf> {
        Ok(self.base_dir.join(safe_component(tenant_id)?))
    }

    fn session_path(&self, tenant_id: &str, session_id: &str) -> Result<PathBuf> {
        Ok(self
            .tenant_dir(tenant_id)?
            .join(format!("{}.toml", safe_component(session_id)?)))
    }

    fn load_at(path: &Path) -> Result<Option<PlaySession>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        let session: PlaySession = toml::from_str(&content)?;
        Ok(Some(session))
    }

    /// Writes the document via tmp file + fsync + atomic rename.
    fn save_at(path: &Path, session: &PlaySession) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| EngineError::io("session path has no parent directory"))?;
        if !parent.exists() {
            fs::create_dir_all(parent)?;
        }

        let toml_string = toml::to_string_pretty(session)?;

        let file_name = path
            .file_name()
            .ok_or_else(|| EngineError::io("session path has no file name"))?;
        let tmp_path = parent.join(format!(".{}.tmp", file_name.to_string_lossy()));

        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(toml_string.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    fn acquire_tenant_lock(&self, tenant_id: &str) -> Result<TenantLock> {
        TenantLock::acquire(&self.tenant_dir(tenant_id)?)
    }
}

#[async_trait]
impl SessionRepository for FileSessionStore {
    async fn insert(&self, session: &PlaySession) -> Result<()> {
        let path = self.session_path(&session.tenant_id, &session.id)?;
        let _lock = self.acquire_tenant_lock(&session.tenant_id)?;

        if path.exists() {
            return Err(EngineError::data_access(format!(
                "session '{}' already exists",
                session.id
            )));
        }
        Self::save_at(&path, session)
    }

    async fn find(&self, tenant_id: &str, session_id: &str) -> Result<Option<PlaySession>> {
        let path = self.session_path(tenant_id, session_id)?;
        Self::load_at(&path)
    }

    async fn update(&self, session: &PlaySession, expected_version: u64) -> Result<()> {
        let path = self.session_path(&session.tenant_id, &session.id)?;
        let _lock = self.acquire_tenant_lock(&session.tenant_id)?;

        let stored = Self::load_at(&path)?
            .ok_or_else(|| EngineError::session_not_found(&session.id))?;
        if stored.version != expected_version {
            return Err(EngineError::VersionConflict {
                expected: expected_version,
                actual: stored.version,
            });
        }
        Self::save_at(&path, session)
    }

    async fn list_for_tenant(&self, tenant_id: &str) -> Result<Vec<PlaySession>> {
        let dir = self.tenant_dir(tenant_id)?;
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut sessions = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("toml") {
                continue;
            }
            match Self::load_at(&path) {
                Ok(Some(session)) => sessions.push(session),
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "[FileSessionStore] Skipping unreadable session document"
                    );
                }
            }
        }
        Ok(sessions)
    }
}

/// Rejects identifiers that could escape the storage directory.
fn safe_component(id: &str) -> Result<&str> {
    if id.is_empty()
        || id.starts_with('.')
        || id.contains('/')
        || id.contains('\\')
        || id.contains("..")
    {
        return Err(EngineError::validation(format!(
            "identifier '{id}' is not storage-safe"
        )));
    }
    Ok(id)
}

/// A per-tenant advisory lock guard, released when the handle drops.
///
/// The lock file itself is never unlinked: removing it while another process
/// holds or awaits the lock would let a third process lock a fresh inode and
/// run concurrently, breaking the cross-process CAS.
struct TenantLock {
    #[allow(dead_code)]
    file: File,
}

impl TenantLock {
    fn acquire(tenant_dir: &Path) -> Result<Self> {
        if !tenant_dir.exists() {
            fs::create_dir_all(tenant_dir)?;
        }
        let lock_path = tenant_dir.join(".tenant.lock");

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        #[cfg(unix)]
        {
            use fs2::FileExt;
            file.lock_exclusive().map_err(|e| {
                EngineError::data_access(format!("failed to acquire tenant lock: {e}"))
            })?;
        }

        // Non-Unix builds rely on rename atomicity alone

        Ok(TenantLock { file })
    }
}
