//! Summary metrics over a record collection.
//!
//! Every metric is recomputed from scratch on each call. Divisions guard
//! against empty denominators so that no metric ever yields `NaN`.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};

pub type Predicate<R> = Arc<dyn Fn(&R, DateTime<Utc>) -> bool + Send + Sync>;

/// Returns `Some` only for records where the value is present.
pub type Extractor<R> = Arc<dyn Fn(&R) -> Option<f64> + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rounding {
    Whole,
    Tenths,
}

impl Rounding {
    fn apply(self, value: f64) -> f64 {
        match self {
            Rounding::Whole => value.round(),
            Rounding::Tenths => (value * 10.0).round() / 10.0,
        }
    }
}

pub enum Metric<R> {
    Total,
    Count(Predicate<R>),
    /// `count(numerator) / count(denominator)` as a whole-number percentage;
    /// 0 when no record matches `denominator`.
    Ratio {
        numerator: Predicate<R>,
        denominator: Predicate<R>,
    },
    /// Mean over records where the extractor yields a value; 0 when none do.
    Average {
        value: Extractor<R>,
        rounding: Rounding,
    },
}

impl<R> Clone for Metric<R> {
    fn clone(&self) -> Self {
        match self {
            Metric::Total => Metric::Total,
            Metric::Count(p) => Metric::Count(Arc::clone(p)),
            Metric::Ratio {
                numerator,
                denominator,
            } => Metric::Ratio {
                numerator: Arc::clone(numerator),
                denominator: Arc::clone(denominator),
            },
            Metric::Average { value, rounding } => Metric::Average {
                value: Arc::clone(value),
                rounding: *rounding,
            },
        }
    }
}

impl<R> fmt::Debug for Metric<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Total => f.write_str("Total"),
            Metric::Count(_) => f.write_str("Count"),
            Metric::Ratio { .. } => f.write_str("Ratio"),
            Metric::Average { rounding, .. } => {
                f.debug_struct("Average").field("rounding", rounding).finish()
            }
        }
    }
}

/// A named metric.
#[derive(Clone, Debug)]
pub struct MetricSpec<R> {
    pub name: &'static str,
    pub metric: Metric<R>,
}

impl<R> MetricSpec<R> {
    #[must_use]
    pub fn total(name: &'static str) -> Self {
        Self {
            name,
            metric: Metric::Total,
        }
    }

    pub fn count<P>(name: &'static str, predicate: P) -> Self
    where
        P: Fn(&R, DateTime<Utc>) -> bool + Send + Sync + 'static,
    {
        Self {
            name,
            metric: Metric::Count(Arc::new(predicate)),
        }
    }

    pub fn ratio<N, D>(name: &'static str, numerator: N, denominator: D) -> Self
    where
        N: Fn(&R, DateTime<Utc>) -> bool + Send + Sync + 'static,
        D: Fn(&R, DateTime<Utc>) -> bool + Send + Sync + 'static,
    {
        Self {
            name,
            metric: Metric::Ratio {
                numerator: Arc::new(numerator),
                denominator: Arc::new(denominator),
            },
        }
    }

    pub fn average<E>(name: &'static str, value: E, rounding: Rounding) -> Self
    where
        E: Fn(&R) -> Option<f64> + Send + Sync + 'static,
    {
        Self {
            name,
            metric: Metric::Average {
                value: Arc::new(value),
                rounding,
            },
        }
    }

    fn evaluate(&self, records: &[R], now: DateTime<Utc>) -> f64 {
        match &self.metric {
            Metric::Total => as_f64(records.len()),
            Metric::Count(predicate) => as_f64(count(records, predicate.as_ref(), now)),
            Metric::Ratio {
                numerator,
                denominator,
            } => {
                let den = count(records, denominator.as_ref(), now);
                if den == 0 {
                    return 0.0;
                }
                let num = count(records, numerator.as_ref(), now);
                (100.0 * as_f64(num) / as_f64(den)).round()
            }
            Metric::Average { value, rounding } => {
                let present: Vec<f64> = records
                    .iter()
                    .filter_map(|r| value(r))
                    .filter(|v| v.is_finite())
                    .collect();
                if present.is_empty() {
                    return 0.0;
                }
                let mean = present.iter().sum::<f64>() / as_f64(present.len());
                rounding.apply(mean)
            }
        }
    }
}

fn count<R>(
    records: &[R],
    predicate: &(dyn Fn(&R, DateTime<Utc>) -> bool + Send + Sync),
    now: DateTime<Utc>,
) -> usize {
    records.iter().filter(|&r| predicate(r, now)).count()
}

fn as_f64(n: usize) -> f64 {
    u32::try_from(n).map_or(f64::from(u32::MAX), f64::from)
}

/// Metric values in declaration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Stats {
    entries: Vec<(&'static str, f64)>,
}

impl Stats {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
    }

    /// Value of `name`, or 0 for an unknown metric.
    #[must_use]
    pub fn value(&self, name: &str) -> f64 {
        self.get(name).unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.entries.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Stats {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Evaluate every spec over the whole of `records`.
pub fn aggregate<R>(records: &[R], specs: &[MetricSpec<R>], now: DateTime<Utc>) -> Stats {
    Stats {
        entries: specs
            .iter()
            .map(|spec| (spec.name, spec.evaluate(records, now)))
            .collect(),
    }
}

/// A fixed metric set, evaluated on demand.
#[derive(Clone, Debug)]
pub struct StatsAggregator<R> {
    specs: Vec<MetricSpec<R>>,
}

impl<R> StatsAggregator<R> {
    #[must_use]
    pub fn new(specs: Vec<MetricSpec<R>>) -> Self {
        Self { specs }
    }

    #[must_use]
    pub fn specs(&self) -> &[MetricSpec<R>] {
        &self.specs
    }

    pub fn aggregate(&self, records: &[R], now: DateTime<Utc>) -> Stats {
        aggregate(records, &self.specs, now)
    }
}

impl<R> Default for StatsAggregator<R> {
    fn default() -> Self {
        Self { specs: Vec::new() }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    struct Row {
        done: bool,
        score: Option<f64>,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                done: true,
                score: Some(9.0),
            },
            Row {
                done: false,
                score: None,
            },
            Row {
                done: false,
                score: Some(6.0),
            },
        ]
    }

    fn specs() -> Vec<MetricSpec<Row>> {
        vec![
            MetricSpec::total("total"),
            MetricSpec::count("done", |r: &Row, _| r.done),
            MetricSpec::ratio("done_rate", |r: &Row, _| r.done, |_, _| true),
            MetricSpec::average("score", |r: &Row| r.score, Rounding::Tenths),
        ]
    }

    #[test]
    fn computes_each_metric() {
        let stats = aggregate(&rows(), &specs(), Utc::now());
        assert_eq!(stats.get("total"), Some(3.0));
        assert_eq!(stats.get("done"), Some(1.0));
        assert_eq!(stats.get("done_rate"), Some(33.0));
        assert_eq!(stats.get("score"), Some(7.5));
    }

    #[test]
    fn empty_collection_is_all_zero() {
        let stats = aggregate(&[], &specs(), Utc::now());
        assert_eq!(stats.len(), 4);
        for (name, value) in stats.iter() {
            assert!(!value.is_nan(), "{name} is NaN");
            assert!(value.abs() < f64::EPSILON, "{name} = {value}");
        }
    }

    #[test]
    fn average_ignores_non_finite_values() {
        let rows = vec![
            Row {
                done: false,
                score: Some(f64::NAN),
            },
            Row {
                done: false,
                score: Some(4.0),
            },
        ];
        let stats = aggregate(&rows, &specs(), Utc::now());
        assert_eq!(stats.get("score"), Some(4.0));
    }

    #[test]
    fn whole_rounding_rounds_half_up() {
        let rows = vec![
            Row {
                done: false,
                score: Some(2.0),
            },
            Row {
                done: false,
                score: Some(3.0),
            },
        ];
        let spec = [MetricSpec::average("avg", |r: &Row| r.score, Rounding::Whole)];
        assert_eq!(aggregate(&rows, &spec, Utc::now()).get("avg"), Some(3.0));
    }

    #[test]
    fn unknown_metric_reads_as_zero() {
        let stats = aggregate(&rows(), &specs(), Utc::now());
        assert!(stats.get("missing").is_none());
        assert!(stats.value("missing").abs() < f64::EPSILON);
    }

    #[test]
    fn serializes_in_declaration_order() {
        let stats = aggregate(&rows(), &specs(), Utc::now());
        let json = serde_json::to_string(&stats).unwrap();
        assert_eq!(
            json,
            r#"{"total":3.0,"done":1.0,"done_rate":33.0,"score":7.5}"#
        );
    }
}
