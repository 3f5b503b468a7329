//! TOML-file-backed persistence.

mod session_store;

pub use session_store::FileSessionStore;
