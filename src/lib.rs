//! Bitemporal security master: projects an append-only fact log into a
//! gap-free, per-subject interval history and incrementally merges later
//! updates into it.

pub mod bucket;
pub mod builder;
pub mod cli;
pub mod error;
pub mod header;
pub mod io;
pub mod join;
pub mod merge;
pub mod project;
#[cfg(test)]
mod proptests;
pub mod types;
mod util;

pub use builder::build;
pub use bucket::bucket_facts;
pub use error::Error;
pub use header::resolve_header;
pub use join::join_positions;
pub use merge::merge_batch;
pub use project::{filter_by_attribute, remove_empty_columns};
pub use types::{Fact, FlatFact, Header, JoinedPositions, Position, PriorityMap, SecurityMaster, Value};
