//! Default storage locations for rankdeck data.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.local/share/rankdeck/     # Data directory (platform equivalent)
//! └── sessions/                # Session documents, one subdirectory per tenant
//!     └── <tenant_id>/
//!         ├── <session_id>.toml
//!         └── .tenant.lock     # Advisory write lock
//! ```

use std::path::PathBuf;

use rankdeck_core::error::{EngineError, Result};

/// Platform-aware path resolution for rankdeck storage.
pub struct RankdeckPaths;

impl RankdeckPaths {
    /// Returns the rankdeck data directory.
    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join("rankdeck"))
            .ok_or_else(|| EngineError::config("cannot determine platform data directory"))
    }

    /// Returns the root directory for session documents.
    pub fn sessions_dir() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("sessions"))
    }
}
