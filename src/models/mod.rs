//! Core data model: time ranges, batch plans, raw provider rows, and the
//! canonical series handed to callers.

mod bar;
mod batch;
mod interval;
mod range;
mod types;

pub use bar::{CanonicalBar, CanonicalSeries};
pub use batch::{RawBatch, RawRow, RawTimestamp};
pub use interval::Interval;
pub use range::{BatchPlan, TimeRange};
pub use types::ProviderId;
