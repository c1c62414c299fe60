use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, Utc};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Count,
    Number,
    Bool,
    DateTime,
    List,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Text => write!(f, "Text"),
            FieldKind::Count => write!(f, "Count"),
            FieldKind::Number => write!(f, "Number"),
            FieldKind::Bool => write!(f, "Bool"),
            FieldKind::DateTime => write!(f, "DateTime"),
            FieldKind::List => write!(f, "List"),
        }
    }
}

/// A closed set of filterable fields of one record type.
pub trait FilterField: Copy + Eq + std::hash::Hash + fmt::Debug + 'static {
    const FIELDS: &'static [Self];

    fn name(&self) -> &'static str;

    fn kind(&self) -> FieldKind;

    fn from_name(name: &str) -> Option<Self> {
        Self::FIELDS
            .iter()
            .copied()
            .find(|f| f.name().eq_ignore_ascii_case(name))
    }
}

/// Value of one record field as seen by the filter engine.
///
/// `Missing` covers absent, null and malformed values alike.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue<'a> {
    Missing,
    Text(Cow<'a, str>),
    Count(u64),
    Number(f64),
    Bool(bool),
    DateTime(DateTime<Utc>),
    List(&'a [String]),
}

impl<'a> FieldValue<'a> {
    #[must_use]
    pub fn text(value: &'a str) -> Self {
        FieldValue::Text(Cow::Borrowed(value))
    }

    #[must_use]
    pub fn opt_text(value: Option<&'a str>) -> Self {
        value.map_or(FieldValue::Missing, FieldValue::text)
    }

    #[must_use]
    pub fn opt_count(value: Option<u32>) -> Self {
        value.map_or(FieldValue::Missing, |v| FieldValue::Count(u64::from(v)))
    }

    #[must_use]
    pub fn opt_number(value: Option<f64>) -> Self {
        value.map_or(FieldValue::Missing, FieldValue::Number)
    }

    #[must_use]
    pub fn opt_datetime(value: Option<DateTime<Utc>>) -> Self {
        value.map_or(FieldValue::Missing, FieldValue::DateTime)
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_count(&self) -> Option<u64> {
        match self {
            FieldValue::Count(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::DateTime(ts) => Some(*ts),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }

    /// Text form used when building the free-text search haystack.
    #[must_use]
    pub fn render(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Missing => Cow::Borrowed(""),
            FieldValue::Text(s) => Cow::Borrowed(s.as_ref()),
            FieldValue::Count(n) => Cow::Owned(n.to_string()),
            FieldValue::Number(n) => Cow::Owned(n.to_string()),
            FieldValue::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
            FieldValue::DateTime(ts) => Cow::Owned(ts.to_rfc3339()),
            FieldValue::List(items) => Cow::Owned(items.join(", ")),
        }
    }
}

/// A record that can be evaluated by the filter engine.
///
/// `now` is passed so that derived fields (for example a demo account's
/// active/expired state) are computed against the caller's clock and never
/// cached between passes.
pub trait Filterable {
    type Field: FilterField;

    fn field(&self, field: Self::Field, now: DateTime<Utc>) -> FieldValue<'_>;
}
