//! Ordering and lookup over collections of keyed records.
//!
//! [`sort`] is a top-down merge sort keyed by a field name. [`locate`] sorts
//! ascending by a field and then binary-probes for a record whose field
//! contains a query string, expanding to the neighbouring matches.
//!
//! The probe in [`locate`] orders candidates lexicographically while matching
//! them by substring, so it can miss matches that sit outside the window it
//! converges on. Callers needing every match should filter linearly instead.

mod error;
mod locate;
mod order;
mod record;
mod sort;

pub use error::SortError;
pub use locate::locate;
pub use order::{ParseSortOrderError, SortOrder};
pub use record::{FieldValue, Record};
pub use sort::sort;
