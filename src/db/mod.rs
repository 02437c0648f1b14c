//! Record source for the report engine.
//!
//! Reports only ever read. The [`ReportRepo`] trait is the seam between the
//! HTTP layer and wherever marketplace records live; [`MemoryStore`] is the
//! shipped implementation, loaded once from a JSON dataset.

mod error;
mod memory;
pub mod repos;

pub use error::{DbError, DbResult};
pub use memory::{Dataset, MemoryStore};
pub use repos::*;
