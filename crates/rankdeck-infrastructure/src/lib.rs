pub mod dedup;
pub mod file;
pub mod memory;
pub mod paths;

pub use crate::dedup::VoteDeduper;
pub use crate::file::FileSessionStore;
pub use crate::memory::{MemoryCardCatalog, MemoryRatingStore, MemorySessionStore};
pub use crate::paths::RankdeckPaths;
