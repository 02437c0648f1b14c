//! Time-bucketed report engine.
//!
//! Everything here is synchronous and pure: records come in already fetched,
//! and a [`ReportData`] comes out.

mod aggregate;
mod chart;
mod definitions;
mod distribution;
mod error;
mod ranges;
mod summary;
mod time_frame;

pub use aggregate::*;
pub use chart::*;
pub use definitions::*;
pub use distribution::*;
pub use error::*;
pub use ranges::*;
pub use summary::*;
pub use time_frame::*;
