//! Common types and utilities shared across the CCMP archive tools.

pub mod error;
pub mod grid;
pub mod lattice;
pub mod naming;
pub mod source;
pub mod time;
pub mod variable;

pub use error::{CcmpError, CcmpResult};
pub use grid::{GridCell, GridExtent, SLOTS_PER_DAY};
pub use lattice::{LatticeError, TimeLattice};
pub use source::{
    is_no_data, AggregateGrid, ArchiveError, DailyGrid, ObservationArchive, AGGREGATE_SENTINEL,
};
pub use time::WindowAlignment;
pub use variable::WindVariable;
