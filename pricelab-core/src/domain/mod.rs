//! Core domain types: sales records and grouping keys.

pub mod group;
pub mod record;

pub use group::{GroupKey, GroupLabel};
pub use record::{RawRecord, SaleRecord};
