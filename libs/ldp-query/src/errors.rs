use thiserror::Error;

/// Errors raised while updating a [`FilterState`](crate::FilterState).
///
/// Matching itself never fails; only parsing raw UI values can.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Unknown filter dimension: {0}")]
    UnknownDimension(String),

    #[error("Invalid count bucket '{0}': expected one of all, 0, none, 1-5, 6-10, 10+")]
    InvalidCountBucket(String),

    #[error("Invalid date bound '{0}': expected YYYY-MM-DD or an RFC 3339 timestamp")]
    InvalidDate(String),
}

pub type FilterResult<T> = Result<T, FilterError>;
