use crate::types::{CancellationRecord, IssuanceRecord, RatePoint, SeriesPoint, Summary};

/// Benchmark cancellation rate the operation is held to (0.75%).
pub const TARGET_RATE: f64 = 0.0075;

/// Cancellations over issuances, pinned to exactly 0 when there were no
/// issuances so charts never see NaN or infinity.
fn rate(cancelled: f64, issued: f64) -> f64 {
    if issued > 0.0 {
        cancelled / issued
    } else {
        0.0
    }
}

/// Attach the cancellation rate and the fixed target to every series row.
pub fn with_rates(series: &[SeriesPoint]) -> Vec<RatePoint> {
    series
        .iter()
        .map(|p| RatePoint {
            period: p.period,
            date: p.date,
            issued: p.issued,
            cancelled: p.cancelled,
            rate: rate(p.cancelled, p.issued),
            target: TARGET_RATE,
        })
        .collect()
}

/// Headline metrics over the (already filtered) record sets.
///
/// The denominator is the summed per-row issued quantity, not the issuance
/// row count.
pub fn summarize(issuances: &[IssuanceRecord], cancellations: &[CancellationRecord]) -> Summary {
    let total_issued: f64 = issuances.iter().map(|r| r.quantity).sum();
    let total_cancelled = cancellations.len() as u64;
    Summary {
        total_issued,
        total_cancelled,
        cancellation_rate: rate(total_cancelled as f64, total_issued),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PeriodKey;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn point(issued: f64, cancelled: f64) -> SeriesPoint {
        SeriesPoint {
            period: PeriodKey::Month(d(2024, 1, 1)),
            date: d(2024, 1, 1),
            issued,
            cancelled,
        }
    }

    #[test]
    fn rate_is_zero_when_nothing_was_issued() {
        let rated = with_rates(&[point(0.0, 7.0)]);
        assert_eq!(rated[0].rate, 0.0);
        assert!(rated[0].rate.is_finite());
    }

    #[test]
    fn rate_divides_cancelled_by_issued() {
        let rated = with_rates(&[point(400.0, 3.0)]);
        assert_eq!(rated[0].rate, 3.0 / 400.0);
    }

    #[test]
    fn target_is_attached_to_every_row() {
        let rated = with_rates(&[point(1.0, 0.0), point(0.0, 0.0)]);
        assert!(rated.iter().all(|p| p.target == TARGET_RATE));
    }

    #[test]
    fn summary_sums_quantities_not_rows() {
        let issuances = vec![
            IssuanceRecord {
                date: d(2024, 1, 5),
                quantity: 3.0,
                month: "2024-01".into(),
                dispatch: None,
                user: None,
            },
            IssuanceRecord {
                date: d(2024, 1, 6),
                quantity: 7.0,
                month: "2024-01".into(),
                dispatch: None,
                user: None,
            },
        ];
        let cancellations = vec![CancellationRecord {
            date: d(2024, 1, 8),
            month: "2024-01".into(),
            dispatch: None,
            reason: None,
            user: None,
        }];
        let summary = summarize(&issuances, &cancellations);
        assert_eq!(summary.total_issued, 10.0);
        assert_eq!(summary.total_cancelled, 1);
        assert_eq!(summary.cancellation_rate, 0.1);
    }

    #[test]
    fn empty_inputs_summarize_to_zeros() {
        let summary = summarize(&[], &[]);
        assert_eq!(summary.total_issued, 0.0);
        assert_eq!(summary.total_cancelled, 0);
        assert_eq!(summary.cancellation_rate, 0.0);
    }
}
