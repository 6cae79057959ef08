use crate::types::{AggregateBucket, CategoryCount, PeriodKey};
use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;

/// Time bucket width for the period aggregators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Day,
    Month,
}

impl Granularity {
    /// Bucket key for a date: the day unchanged, or the date truncated to
    /// its year-month.
    pub fn bucket(self, date: NaiveDate) -> PeriodKey {
        match self {
            Granularity::Day => PeriodKey::Day(date),
            Granularity::Month => PeriodKey::Month(date.with_day(1).unwrap_or(date)),
        }
    }
}

/// Sum a numeric field per period bucket.
///
/// Bucket order is unspecified; the merger sorts. At most one bucket per
/// period key comes out of a single call.
pub fn sum_by_period<T>(
    rows: &[T],
    date_of: impl Fn(&T) -> NaiveDate,
    value_of: impl Fn(&T) -> f64,
    granularity: Granularity,
) -> Vec<AggregateBucket> {
    let mut totals: HashMap<PeriodKey, f64> = HashMap::new();
    for row in rows {
        let period = granularity.bucket(date_of(row));
        *totals.entry(period).or_insert(0.0) += value_of(row);
    }
    totals
        .into_iter()
        .map(|(period, total)| AggregateBucket {
            period,
            date: period.anchor(),
            total,
        })
        .collect()
}

/// Count rows per period bucket (one row = one event).
pub fn count_by_period<T>(
    rows: &[T],
    date_of: impl Fn(&T) -> NaiveDate,
    granularity: Granularity,
) -> Vec<AggregateBucket> {
    sum_by_period(rows, date_of, |_| 1.0, granularity)
}

/// Count rows per categorical value, skipping rows with no value.
///
/// Sorted by descending count, ties broken by label, so breakdown tables
/// come out in a stable display order.
pub fn count_by_category<T>(
    rows: &[T],
    label_of: impl Fn(&T) -> Option<&str>,
) -> Vec<CategoryCount> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for row in rows {
        if let Some(label) = label_of(row) {
            *counts.entry(label.to_string()).or_insert(0) += 1;
        }
    }
    let mut out: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(label, count)| CategoryCount { label, count })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    out
}
