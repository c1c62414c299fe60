use chrono::{DateTime, Utc};

use crate::field::{FieldValue, FilterField, Filterable};
use crate::field_map::{CategoryBinding, FieldMap};
use crate::state::{Choice, CountBucket, FilterState};

/// Category sentinel selecting records outside the predefined list.
pub const CUSTOM_CATEGORY: &str = "custom";

/// Decide whether `record` passes every constrained dimension of `state`.
///
/// Pure: the result depends only on the arguments, and malformed record
/// values never panic (they simply fail the dimension that needs them).
pub fn matches<R: Filterable>(
    record: &R,
    state: &FilterState,
    map: &FieldMap<R::Field>,
    now: DateTime<Utc>,
) -> bool {
    choice_matches(record, map.status, &state.status, now)
        && choice_matches(record, map.industry, &state.industry, now)
        && category_matches(record, map.category.as_ref(), &state.category, now)
        && membership_matches(record, map.integration, &state.integration, now)
        && membership_matches(record, map.company, &state.company, now)
        && count_matches(record, map.primary_count, state.primary_count, now)
        && count_matches(record, map.secondary_count, state.secondary_count, now)
        && search_matches(record, &map.search, state, now)
        && date_matches(record, map.date, state, now)
}

fn choice_matches<R: Filterable>(
    record: &R,
    field: Option<R::Field>,
    choice: &Choice,
    now: DateTime<Utc>,
) -> bool {
    let (Some(field), Some(wanted)) = (field, choice.value()) else {
        return true;
    };
    record.field(field, now).as_text() == Some(wanted)
}

fn category_matches<R: Filterable>(
    record: &R,
    binding: Option<&CategoryBinding<R::Field>>,
    choice: &Choice,
    now: DateTime<Utc>,
) -> bool {
    let (Some(binding), Some(wanted)) = (binding, choice.value()) else {
        return true;
    };

    let value = record.field(binding.field, now);
    let value = value.as_text();

    if wanted != CUSTOM_CATEGORY {
        return value == Some(wanted);
    }

    let marked_custom = binding
        .kind_field
        .is_some_and(|kind| record.field(kind, now).as_text() == Some(CUSTOM_CATEGORY));

    marked_custom
        || value.is_some_and(|v| !v.is_empty() && !binding.known.iter().any(|k| *k == v))
}

fn membership_matches<R: Filterable>(
    record: &R,
    field: Option<R::Field>,
    choice: &Choice,
    now: DateTime<Utc>,
) -> bool {
    let (Some(field), Some(wanted)) = (field, choice.value()) else {
        return true;
    };
    record
        .field(field, now)
        .as_list()
        .is_some_and(|items| items.iter().any(|item| item == wanted))
}

fn count_matches<R: Filterable>(
    record: &R,
    field: Option<R::Field>,
    bucket: CountBucket,
    now: DateTime<Utc>,
) -> bool {
    let Some(field) = field else {
        return true;
    };
    if bucket.is_any() {
        return true;
    }
    // A missing count reads as zero.
    let count = record.field(field, now).as_count().unwrap_or(0);
    bucket.contains(count)
}

fn search_matches<R: Filterable>(
    record: &R,
    fields: &[R::Field],
    state: &FilterState,
    now: DateTime<Utc>,
) -> bool {
    let Some(term) = state.search_term() else {
        return true;
    };
    if fields.is_empty() {
        return true;
    }

    let haystack = fields
        .iter()
        .map(|f| record.field(*f, now).render().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    haystack.contains(&term.to_lowercase())
}

fn date_matches<R: Filterable>(
    record: &R,
    field: Option<R::Field>,
    state: &FilterState,
    now: DateTime<Utc>,
) -> bool {
    let Some(field) = field else {
        return true;
    };
    if state.date_range.is_unbounded() {
        return true;
    }
    match record.field(field, now) {
        FieldValue::DateTime(ts) => state.date_range.contains(ts),
        _ => false,
    }
}

/// Field map bound filter, reusable across renders of one view.
#[derive(Clone, Debug)]
pub struct FilterEngine<F: FilterField> {
    map: FieldMap<F>,
}

impl<F: FilterField> FilterEngine<F> {
    #[must_use]
    pub fn new(map: FieldMap<F>) -> Self {
        Self { map }
    }

    #[must_use]
    pub fn field_map(&self) -> &FieldMap<F> {
        &self.map
    }

    pub fn matches<R>(&self, record: &R, state: &FilterState, now: DateTime<Utc>) -> bool
    where
        R: Filterable<Field = F>,
    {
        matches(record, state, &self.map, now)
    }

    /// Matching records in their original relative order.
    pub fn apply<'r, R>(
        &self,
        records: &'r [R],
        state: &FilterState,
        now: DateTime<Utc>,
    ) -> Vec<&'r R>
    where
        R: Filterable<Field = F>,
    {
        records
            .iter()
            .filter(|r| self.matches(*r, state, now))
            .collect()
    }
}
