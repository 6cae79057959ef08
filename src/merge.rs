use crate::types::{AggregateBucket, PeriodKey, SeriesPoint};
use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Default)]
struct Joined {
    issued_date: Option<NaiveDate>,
    cancelled_date: Option<NaiveDate>,
    issued: f64,
    cancelled: f64,
}

/// Full outer join of the two aggregate series on period key.
///
/// Every period key appearing in either input appears exactly once in the
/// output; a period present in only one input gets 0 for the other column.
/// Output is sorted ascending by period. The row's date is the issuance-side
/// bucket date when present, the cancellation-side date otherwise.
pub fn merge_series(
    issued: &[AggregateBucket],
    cancelled: &[AggregateBucket],
) -> Vec<SeriesPoint> {
    let mut joined: BTreeMap<PeriodKey, Joined> = BTreeMap::new();
    for b in issued {
        let e = joined.entry(b.period).or_default();
        e.issued_date = Some(b.date);
        e.issued += b.total;
    }
    for b in cancelled {
        let e = joined.entry(b.period).or_default();
        e.cancelled_date = Some(b.date);
        e.cancelled += b.total;
    }
    joined
        .into_iter()
        .map(|(period, j)| SeriesPoint {
            period,
            date: j
                .issued_date
                .or(j.cancelled_date)
                .unwrap_or_else(|| period.anchor()),
            issued: j.issued,
            cancelled: j.cancelled,
        })
        .collect()
}
