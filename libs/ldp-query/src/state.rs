use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Days, NaiveDate, Utc};

use crate::errors::{FilterError, FilterResult};
use crate::time::{parse_day, parse_timestamp, start_of_day};

/// Sentinel meaning "no constraint" for choice and bucket dimensions.
pub const ALL: &str = "all";

/// Single-value selection: either everything or exactly one value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Choice {
    #[default]
    All,
    Only(String),
}

impl Choice {
    /// `"all"` and the empty string both mean [`Choice::All`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() || raw == ALL {
            Choice::All
        } else {
            Choice::Only(raw.to_owned())
        }
    }

    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match self {
            Choice::All => None,
            Choice::Only(v) => Some(v.as_str()),
        }
    }

    #[must_use]
    pub fn is_all(&self) -> bool {
        matches!(self, Choice::All)
    }
}

/// Range bucket over a non-negative count, as offered by the dashboards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CountBucket {
    #[default]
    Any,
    Zero,
    OneToFive,
    SixToTen,
    MoreThanTen,
}

impl CountBucket {
    #[must_use]
    pub fn contains(self, count: u64) -> bool {
        match self {
            CountBucket::Any => true,
            CountBucket::Zero => count == 0,
            CountBucket::OneToFive => (1..=5).contains(&count),
            CountBucket::SixToTen => (6..=10).contains(&count),
            CountBucket::MoreThanTen => count > 10,
        }
    }

    #[must_use]
    pub fn is_any(self) -> bool {
        self == CountBucket::Any
    }
}

impl FromStr for CountBucket {
    type Err = FilterError;

    fn from_str(raw: &str) -> FilterResult<Self> {
        match raw.trim() {
            "" | ALL => Ok(CountBucket::Any),
            "0" | "none" => Ok(CountBucket::Zero),
            "1-5" => Ok(CountBucket::OneToFive),
            "6-10" => Ok(CountBucket::SixToTen),
            "10+" => Ok(CountBucket::MoreThanTen),
            other => Err(FilterError::InvalidCountBucket(other.to_owned())),
        }
    }
}

impl fmt::Display for CountBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountBucket::Any => write!(f, "all"),
            CountBucket::Zero => write!(f, "0"),
            CountBucket::OneToFive => write!(f, "1-5"),
            CountBucket::SixToTen => write!(f, "6-10"),
            CountBucket::MoreThanTen => write!(f, "10+"),
        }
    }
}

/// One end of a date range.
///
/// A bare date covers the whole UTC day; a timestamp is an exact instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DateBound {
    Day(NaiveDate),
    Instant(DateTime<Utc>),
}

impl DateBound {
    /// Empty input means "unbounded".
    ///
    /// # Errors
    /// Returns `FilterError::InvalidDate` when the input is neither a
    /// `YYYY-MM-DD` date nor a recognised timestamp.
    pub fn parse(raw: &str) -> FilterResult<Option<Self>> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        if let Some(day) = parse_day(trimmed) {
            return Ok(Some(DateBound::Day(day)));
        }
        parse_timestamp(trimmed)
            .map(|ts| Some(DateBound::Instant(ts)))
            .ok_or_else(|| FilterError::InvalidDate(trimmed.to_owned()))
    }

    fn admits_as_lower(self, ts: DateTime<Utc>) -> bool {
        match self {
            DateBound::Day(day) => ts >= start_of_day(day),
            DateBound::Instant(start) => ts >= start,
        }
    }

    fn admits_as_upper(self, ts: DateTime<Utc>) -> bool {
        match self {
            DateBound::Day(day) => day
                .checked_add_days(Days::new(1))
                .is_none_or(|next| ts < start_of_day(next)),
            DateBound::Instant(end) => ts <= end,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<DateBound>,
    pub end: Option<DateBound>,
}

impl DateRange {
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    #[must_use]
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start.is_none_or(|b| b.admits_as_lower(ts))
            && self.end.is_none_or(|b| b.admits_as_upper(ts))
    }
}

/// Filter dimensions a view can expose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dimension {
    Status,
    Industry,
    Category,
    Integration,
    Company,
    PrimaryCount,
    SecondaryCount,
    Search,
    DateFrom,
    DateTo,
}

impl Dimension {
    pub const ALL: &'static [Dimension] = &[
        Dimension::Status,
        Dimension::Industry,
        Dimension::Category,
        Dimension::Integration,
        Dimension::Company,
        Dimension::PrimaryCount,
        Dimension::SecondaryCount,
        Dimension::Search,
        Dimension::DateFrom,
        Dimension::DateTo,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Dimension::Status => "status",
            Dimension::Industry => "industry",
            Dimension::Category => "category",
            Dimension::Integration => "integration",
            Dimension::Company => "company",
            Dimension::PrimaryCount => "primary-count",
            Dimension::SecondaryCount => "secondary-count",
            Dimension::Search => "search",
            Dimension::DateFrom => "date-from",
            Dimension::DateTo => "date-to",
        }
    }
}

impl FromStr for Dimension {
    type Err = FilterError;

    fn from_str(raw: &str) -> FilterResult<Self> {
        Dimension::ALL
            .iter()
            .copied()
            .find(|d| d.name().eq_ignore_ascii_case(raw.trim()))
            .ok_or_else(|| FilterError::UnknownDimension(raw.to_owned()))
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Transient per-view filter selection. Every field is independent and the
/// default value of each imposes no constraint.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterState {
    pub status: Choice,
    pub industry: Choice,
    pub category: Choice,
    pub integration: Choice,
    pub company: Choice,
    pub primary_count: CountBucket,
    pub secondary_count: CountBucket,
    pub search: String,
    pub date_range: DateRange,
}

impl FilterState {
    /// Update one dimension from its raw UI value.
    ///
    /// The state is left untouched when the value does not parse.
    ///
    /// # Errors
    /// Returns `FilterError` for malformed count buckets or date bounds.
    pub fn set(&mut self, dimension: Dimension, value: &str) -> FilterResult<()> {
        match dimension {
            Dimension::Status => self.status = Choice::parse(value),
            Dimension::Industry => self.industry = Choice::parse(value),
            Dimension::Category => self.category = Choice::parse(value),
            Dimension::Integration => self.integration = Choice::parse(value),
            Dimension::Company => self.company = Choice::parse(value),
            Dimension::PrimaryCount => self.primary_count = value.parse()?,
            Dimension::SecondaryCount => self.secondary_count = value.parse()?,
            Dimension::Search => value.clone_into(&mut self.search),
            Dimension::DateFrom => self.date_range.start = DateBound::parse(value)?,
            Dimension::DateTo => self.date_range.end = DateBound::parse(value)?,
        }
        Ok(())
    }

    /// Builder form of [`FilterState::set`].
    ///
    /// # Errors
    /// Same as [`FilterState::set`].
    pub fn with(mut self, dimension: Dimension, value: &str) -> FilterResult<Self> {
        self.set(dimension, value)?;
        Ok(self)
    }

    /// Reset every dimension in one step.
    pub fn clear(&mut self) {
        *self = FilterState::default();
    }

    /// Trimmed search needle, `None` when search imposes no constraint.
    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        let term = self.search.trim();
        (!term.is_empty()).then_some(term)
    }

    /// Number of dimensions currently constraining the view.
    #[must_use]
    pub fn active_count(&self) -> usize {
        [
            !self.status.is_all(),
            !self.industry.is_all(),
            !self.category.is_all(),
            !self.integration.is_all(),
            !self.company.is_all(),
            !self.primary_count.is_any(),
            !self.secondary_count.is_any(),
            self.search_term().is_some(),
            self.date_range.start.is_some(),
            self.date_range.end.is_some(),
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }

    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.active_count() == 0
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn choice_sentinels() {
        assert_eq!(Choice::parse("all"), Choice::All);
        assert_eq!(Choice::parse(""), Choice::All);
        assert_eq!(Choice::parse("pending"), Choice::Only("pending".to_owned()));
    }

    #[test]
    fn count_bucket_boundaries() {
        assert!(CountBucket::Zero.contains(0));
        assert!(!CountBucket::Zero.contains(1));
        assert!(CountBucket::OneToFive.contains(1));
        assert!(CountBucket::OneToFive.contains(5));
        assert!(!CountBucket::OneToFive.contains(6));
        assert!(CountBucket::SixToTen.contains(6));
        assert!(CountBucket::SixToTen.contains(10));
        assert!(!CountBucket::MoreThanTen.contains(10));
        assert!(CountBucket::MoreThanTen.contains(11));
    }

    #[test]
    fn count_bucket_accepts_none_alias() {
        assert_eq!("none".parse::<CountBucket>().unwrap(), CountBucket::Zero);
        assert_eq!("all".parse::<CountBucket>().unwrap(), CountBucket::Any);
        assert!("3-4".parse::<CountBucket>().is_err());
    }

    #[test]
    fn date_only_end_bound_covers_whole_day() {
        let range = DateRange {
            start: None,
            end: DateBound::parse("2025-01-31").unwrap(),
        };
        let late = Utc.with_ymd_and_hms(2025, 1, 31, 23, 59, 59).unwrap();
        let next = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
        assert!(range.contains(late));
        assert!(!range.contains(next));
    }

    #[test]
    fn instant_bounds_are_inclusive() {
        let at = Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap();
        let range = DateRange {
            start: Some(DateBound::Instant(at)),
            end: Some(DateBound::Instant(at)),
        };
        assert!(range.contains(at));
        assert!(!range.contains(at + chrono::Duration::seconds(1)));
    }

    #[test]
    fn invalid_value_leaves_state_untouched() {
        let mut state = FilterState::default()
            .with(Dimension::PrimaryCount, "1-5")
            .unwrap();
        let err = state.set(Dimension::PrimaryCount, "lots").unwrap_err();
        assert_eq!(err, FilterError::InvalidCountBucket("lots".to_owned()));
        assert_eq!(state.primary_count, CountBucket::OneToFive);

        assert!(state.set(Dimension::DateFrom, "not-a-date").is_err());
        assert!(state.date_range.start.is_none());
    }

    #[test]
    fn active_count_and_clear() {
        let mut state = FilterState::default()
            .with(Dimension::Status, "pending")
            .and_then(|s| s.with(Dimension::Search, "  acme "))
            .and_then(|s| s.with(Dimension::DateTo, "2025-01-01"))
            .unwrap();
        assert_eq!(state.active_count(), 3);
        assert_eq!(state.search_term(), Some("acme"));

        state.clear();
        assert!(state.is_unconstrained());
        assert_eq!(state, FilterState::default());
    }

    #[test]
    fn whitespace_search_is_no_constraint() {
        let state = FilterState::default()
            .with(Dimension::Search, "   ")
            .unwrap();
        assert!(state.search_term().is_none());
        assert!(state.is_unconstrained());
    }

    #[test]
    fn dimension_round_trips_through_name() {
        for dim in Dimension::ALL {
            assert_eq!(dim.name().parse::<Dimension>().unwrap(), *dim);
        }
        assert!("colour".parse::<Dimension>().is_err());
    }
}
