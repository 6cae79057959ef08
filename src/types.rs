use chrono::NaiveDate;
use serde::Serialize;
use tabled::Tabled;

/// One row of the issuance spreadsheet: a batch of CTRC freight documents
/// emitted on one date by one user.
#[derive(Debug, Clone, PartialEq)]
pub struct IssuanceRecord {
    pub date: NaiveDate,
    /// Documents emitted on this row (the CTRC_EMITIDO column).
    pub quantity: f64,
    /// Month label, taken from the month column or derived from the date.
    pub month: String,
    pub dispatch: Option<String>,
    pub user: Option<String>,
}

/// One row of the cancellation spreadsheet. One row is one cancellation
/// event; there is no quantity column.
#[derive(Debug, Clone, PartialEq)]
pub struct CancellationRecord {
    pub date: NaiveDate,
    pub month: String,
    pub dispatch: Option<String>,
    pub reason: Option<String>,
    pub user: Option<String>,
}

/// Time bucket identity produced by the aggregator.
///
/// `Month` always holds the first day of its month, so equality and the
/// derived chronological ordering are consistent per granularity. The merger
/// never mixes granularities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PeriodKey {
    Day(NaiveDate),
    Month(NaiveDate),
}

impl PeriodKey {
    pub fn label(&self) -> String {
        match self {
            PeriodKey::Day(d) => d.format("%Y-%m-%d").to_string(),
            PeriodKey::Month(d) => d.format("%Y-%m").to_string(),
        }
    }

    /// Calendar date anchoring the bucket: the day itself, or the first of
    /// the month.
    pub fn anchor(&self) -> NaiveDate {
        match *self {
            PeriodKey::Day(d) | PeriodKey::Month(d) => d,
        }
    }
}

/// One aggregation bucket: a period, the date representing it, and a total.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateBucket {
    pub period: PeriodKey,
    pub date: NaiveDate,
    pub total: f64,
}

/// Row count for one categorical value (user, cancellation reason).
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryCount {
    pub label: String,
    pub count: u64,
}

/// One row of the merged issuance/cancellation time series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub period: PeriodKey,
    pub date: NaiveDate,
    pub issued: f64,
    pub cancelled: f64,
}

/// A `SeriesPoint` with the cancellation rate and the fixed target attached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatePoint {
    pub period: PeriodKey,
    pub date: NaiveDate,
    pub issued: f64,
    pub cancelled: f64,
    /// cancelled / issued, pinned to 0 when issued is 0.
    pub rate: f64,
    pub target: f64,
}

/// Headline metrics for the selected period, exported to `summary.json`.
#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct Summary {
    pub total_issued: f64,
    pub total_cancelled: u64,
    pub cancellation_rate: f64,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TimelineRow {
    #[serde(rename = "Date")]
    #[tabled(rename = "Date")]
    pub date: String,
    #[serde(rename = "Issued")]
    #[tabled(rename = "Issued")]
    pub issued: String,
    #[serde(rename = "Cancelled")]
    #[tabled(rename = "Cancelled")]
    pub cancelled: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct MonthlyRateRow {
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub month: String,
    #[serde(rename = "Issued")]
    #[tabled(rename = "Issued")]
    pub issued: String,
    #[serde(rename = "Cancelled")]
    #[tabled(rename = "Cancelled")]
    pub cancelled: String,
    #[serde(rename = "Rate")]
    #[tabled(rename = "Rate")]
    pub rate: String,
    #[serde(rename = "Target")]
    #[tabled(rename = "Target")]
    pub target: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CategoryRow {
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub label: String,
    #[serde(rename = "Total")]
    #[tabled(rename = "Total")]
    pub total: u64,
}

/// Raw issuance row in the same tabular shape as the source file, for the
/// data-export output.
#[derive(Debug, Serialize, Clone)]
pub struct IssuanceExportRow {
    #[serde(rename = "DATA_EMISSAO")]
    pub date: String,
    #[serde(rename = "CTRC_EMITIDO")]
    pub quantity: String,
    #[serde(rename = "MES")]
    pub month: String,
    #[serde(rename = "EXPEDICAO")]
    pub dispatch: String,
    #[serde(rename = "USUÁRIO")]
    pub user: String,
}

/// Raw cancellation row in the same tabular shape as the source file.
#[derive(Debug, Serialize, Clone)]
pub struct CancellationExportRow {
    #[serde(rename = "DATA_CANCELADO")]
    pub date: String,
    #[serde(rename = "MES")]
    pub month: String,
    #[serde(rename = "EXPEDICAO")]
    pub dispatch: String,
    #[serde(rename = "MOTIVO")]
    pub reason: String,
    #[serde(rename = "USUARIO")]
    pub user: String,
}
