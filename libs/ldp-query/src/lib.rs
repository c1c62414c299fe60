#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Client-side record filtering and dashboard statistics.
//!
//! The crate is pure and synchronous. A record type describes its filterable
//! fields through [`FilterField`] and exposes their values through
//! [`Filterable`]; a per-view [`FieldMap`] binds every filter dimension of a
//! [`FilterState`] to one of those fields. [`FilterEngine`] then decides
//! inclusion record by record, and [`StatsAggregator`] derives KPI values from
//! a whole collection.
//!
//! ```ignore
//! let engine = FilterEngine::new(FieldMap::new().status(RequestField::Status));
//! let mut state = FilterState::default();
//! state.set(Dimension::Status, "completed")?;
//! let completed = engine.apply(&requests, &state, Utc::now());
//! ```

pub mod errors;
pub mod field;
pub mod field_map;
pub mod filter;
pub mod state;
pub mod stats;
pub mod time;

pub use errors::FilterError;
pub use field::{FieldKind, FieldValue, FilterField, Filterable};
pub use field_map::{CategoryBinding, FieldMap};
pub use filter::{CUSTOM_CATEGORY, FilterEngine, matches};
pub use state::{ALL, Choice, CountBucket, DateBound, DateRange, Dimension, FilterState};
pub use stats::{Metric, MetricSpec, Rounding, Stats, StatsAggregator, aggregate};
pub use time::parse_timestamp;
