//! Personal ranking construction.
//!
//! - `bounds`: admissible insertion interval from vote constraints
//! - `insertion`: binary-insertion step selection over that interval

mod bounds;
mod insertion;

pub use bounds::InsertionBounds;
pub use insertion::{BinaryInsertionRanker, InsertionStep};
