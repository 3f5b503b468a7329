//! In-memory trait implementations.
//!
//! Used by embedded deployments, the demo CLI, and tests. All stores are
//! tenant-scoped maps behind `tokio::sync::RwLock`.

mod catalog;
mod rating_store;
mod session_store;

pub use catalog::MemoryCardCatalog;
pub use rating_store::MemoryRatingStore;
pub use session_store::MemorySessionStore;
