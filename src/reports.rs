use crate::aggregate::{self, Granularity};
use crate::cache::LoadedData;
use crate::filter::{self, ReportFilter};
use crate::merge;
use crate::metrics;
use crate::types::{
    CancellationExportRow, CancellationRecord, CategoryCount, CategoryRow, IssuanceExportRow,
    IssuanceRecord, MonthlyRateRow, RatePoint, SeriesPoint, Summary, TimelineRow,
};
use crate::util::{format_number, format_percent};

/// Everything one report run produces.
///
/// Category breakdowns are `None` when the backing column was absent from
/// the source file; the section is skipped and the rest still renders.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub summary: Summary,
    /// Day-granularity issuance/cancellation series over the filtered rows.
    pub timeline: Vec<SeriesPoint>,
    /// Month-granularity rate-vs-target series over the full datasets.
    pub monthly_rate: Vec<RatePoint>,
    pub issuances_by_user: Option<Vec<CategoryCount>>,
    pub cancellations_by_reason: Option<Vec<CategoryCount>>,
    pub cancellations_by_user: Option<Vec<CategoryCount>>,
}

pub fn build_report(data: &LoadedData, filter: &ReportFilter) -> Report {
    let (issuances, cancellations) = filter::apply(filter, &data.issuances, &data.cancellations);

    let summary = metrics::summarize(&issuances, &cancellations);

    let issued_daily =
        aggregate::sum_by_period(&issuances, |r| r.date, |r| r.quantity, Granularity::Day);
    let cancelled_daily = aggregate::count_by_period(&cancellations, |r| r.date, Granularity::Day);
    let timeline = merge::merge_series(&issued_daily, &cancelled_daily);

    // The rate-vs-target table always covers every month on file, whatever
    // the active filter.
    let issued_monthly =
        aggregate::sum_by_period(&data.issuances, |r| r.date, |r| r.quantity, Granularity::Month);
    let cancelled_monthly =
        aggregate::count_by_period(&data.cancellations, |r| r.date, Granularity::Month);
    let monthly_rate = metrics::with_rates(&merge::merge_series(&issued_monthly, &cancelled_monthly));

    let issuances_by_user = data
        .issuance_report
        .has_user
        .then(|| aggregate::count_by_category(&issuances, |r| r.user.as_deref()));
    let cancellations_by_reason = data
        .cancellation_report
        .has_reason
        .then(|| aggregate::count_by_category(&cancellations, |r| r.reason.as_deref()));
    let cancellations_by_user = data
        .cancellation_report
        .has_user
        .then(|| aggregate::count_by_category(&cancellations, |r| r.user.as_deref()));

    Report {
        summary,
        timeline,
        monthly_rate,
        issuances_by_user,
        cancellations_by_reason,
        cancellations_by_user,
    }
}

pub fn timeline_rows(series: &[SeriesPoint]) -> Vec<TimelineRow> {
    series
        .iter()
        .map(|p| TimelineRow {
            date: p.date.format("%Y-%m-%d").to_string(),
            issued: format_number(p.issued, 0),
            cancelled: format_number(p.cancelled, 0),
        })
        .collect()
}

pub fn monthly_rate_rows(points: &[RatePoint]) -> Vec<MonthlyRateRow> {
    points
        .iter()
        .map(|p| MonthlyRateRow {
            month: p.period.label(),
            issued: format_number(p.issued, 0),
            cancelled: format_number(p.cancelled, 0),
            rate: format_percent(p.rate, 2),
            target: format_percent(p.target, 2),
        })
        .collect()
}

pub fn category_rows(counts: &[CategoryCount]) -> Vec<CategoryRow> {
    counts
        .iter()
        .map(|c| CategoryRow {
            label: c.label.clone(),
            total: c.count,
        })
        .collect()
}

/// Loaded issuance rows back in source-file shape, for the data export.
pub fn issuance_export_rows(rows: &[IssuanceRecord]) -> Vec<IssuanceExportRow> {
    rows.iter()
        .map(|r| IssuanceExportRow {
            date: r.date.format("%Y-%m-%d").to_string(),
            quantity: format!("{}", r.quantity),
            month: r.month.clone(),
            dispatch: r.dispatch.clone().unwrap_or_default(),
            user: r.user.clone().unwrap_or_default(),
        })
        .collect()
}

/// Loaded cancellation rows back in source-file shape, for the data export.
pub fn cancellation_export_rows(rows: &[CancellationRecord]) -> Vec<CancellationExportRow> {
    rows.iter()
        .map(|r| CancellationExportRow {
            date: r.date.format("%Y-%m-%d").to_string(),
            month: r.month.clone(),
            dispatch: r.dispatch.clone().unwrap_or_default(),
            reason: r.reason.clone().unwrap_or_default(),
            user: r.user.clone().unwrap_or_default(),
        })
        .collect()
}
