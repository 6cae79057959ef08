use crate::error::{Dataset, ReportError, Result};
use crate::types::{CancellationRecord, IssuanceRecord};
use crate::util::{month_label, parse_date_safe, parse_f64_safe};
use chrono::NaiveDate;
use csv::{Reader, ReaderBuilder, StringRecord};
use std::fs::File;
use std::path::Path;

/// Logical-role to header-name mapping for the issuance file.
///
/// The two export variants in circulation disagree on header names, so the
/// loader works on roles and lets the caller pick the mapping.
#[derive(Debug, Clone)]
pub struct IssuanceColumns {
    pub date: String,
    pub quantity: String,
    pub month: String,
    pub dispatch: String,
    pub user: String,
}

impl Default for IssuanceColumns {
    fn default() -> Self {
        Self {
            date: "DATA_EMISSAO".into(),
            quantity: "CTRC_EMITIDO".into(),
            month: "MES".into(),
            dispatch: "EXPEDICAO".into(),
            user: "USUÁRIO".into(),
        }
    }
}

impl IssuanceColumns {
    /// Header names used by the second export variant.
    pub fn alternate() -> Self {
        Self {
            date: "Data".into(),
            quantity: "CTRC_EMITIDO".into(),
            month: "Mes".into(),
            dispatch: "Expedição".into(),
            user: "Usuario".into(),
        }
    }
}

/// Logical-role to header-name mapping for the cancellation file.
#[derive(Debug, Clone)]
pub struct CancellationColumns {
    pub date: String,
    pub month: String,
    pub dispatch: String,
    pub reason: String,
    pub user: String,
}

impl Default for CancellationColumns {
    fn default() -> Self {
        Self {
            date: "DATA_CANCELADO".into(),
            month: "MES".into(),
            dispatch: "EXPEDICAO".into(),
            reason: "MOTIVO".into(),
            user: "USUARIO".into(),
        }
    }
}

impl CancellationColumns {
    /// Header names used by the second export variant.
    pub fn alternate() -> Self {
        Self {
            date: "Data".into(),
            month: "Mes".into(),
            dispatch: "Expedição".into(),
            reason: "Motivo".into(),
            user: "Usuario".into(),
        }
    }
}

/// What the loader saw while reading one source file.
///
/// Absent category columns are not an error: the affected report section is
/// skipped and everything else still renders. They are listed here so the
/// caller can tell the operator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    /// Expected header names the file did not carry.
    pub missing_columns: Vec<String>,
    pub has_user: bool,
    /// Cancellation files only; always false for issuances.
    pub has_reason: bool,
}

pub fn load_issuances(
    path: &Path,
    cols: &IssuanceColumns,
) -> Result<(Vec<IssuanceRecord>, LoadReport)> {
    let mut rdr = open_reader(Dataset::Issuances, path)?;
    let headers = rdr.headers()?.clone();

    let date_idx = require_column(Dataset::Issuances, &headers, &cols.date)?;
    let quantity_idx = require_column(Dataset::Issuances, &headers, &cols.quantity)?;
    let month_idx = column_index(&headers, &cols.month);
    let dispatch_idx = column_index(&headers, &cols.dispatch);
    let user_idx = column_index(&headers, &cols.user);

    let mut report = LoadReport {
        has_user: user_idx.is_some(),
        ..LoadReport::default()
    };
    for (idx, name) in [
        (month_idx, &cols.month),
        (dispatch_idx, &cols.dispatch),
        (user_idx, &cols.user),
    ] {
        if idx.is_none() {
            report.missing_columns.push(name.clone());
        }
    }

    let mut rows = Vec::new();
    for (i, rec) in rdr.records().enumerate() {
        let rec = rec?;
        let line = i + 2; // line 1 is the header
        let date = cell_date(Dataset::Issuances, &rec, date_idx, &cols.date, line)?;
        let quantity = cell_f64(Dataset::Issuances, &rec, quantity_idx, &cols.quantity, line)?;
        rows.push(IssuanceRecord {
            date,
            quantity,
            month: field(&rec, month_idx).unwrap_or_else(|| month_label(date)),
            dispatch: field(&rec, dispatch_idx),
            user: field(&rec, user_idx),
        });
    }
    report.total_rows = rows.len();
    Ok((rows, report))
}

pub fn load_cancellations(
    path: &Path,
    cols: &CancellationColumns,
) -> Result<(Vec<CancellationRecord>, LoadReport)> {
    let mut rdr = open_reader(Dataset::Cancellations, path)?;
    let headers = rdr.headers()?.clone();

    let date_idx = require_column(Dataset::Cancellations, &headers, &cols.date)?;
    let month_idx = column_index(&headers, &cols.month);
    let dispatch_idx = column_index(&headers, &cols.dispatch);
    let reason_idx = column_index(&headers, &cols.reason);
    let user_idx = column_index(&headers, &cols.user);

    let mut report = LoadReport {
        has_user: user_idx.is_some(),
        has_reason: reason_idx.is_some(),
        ..LoadReport::default()
    };
    for (idx, name) in [
        (month_idx, &cols.month),
        (dispatch_idx, &cols.dispatch),
        (reason_idx, &cols.reason),
        (user_idx, &cols.user),
    ] {
        if idx.is_none() {
            report.missing_columns.push(name.clone());
        }
    }

    let mut rows = Vec::new();
    for (i, rec) in rdr.records().enumerate() {
        let rec = rec?;
        let line = i + 2;
        let date = cell_date(Dataset::Cancellations, &rec, date_idx, &cols.date, line)?;
        rows.push(CancellationRecord {
            date,
            month: field(&rec, month_idx).unwrap_or_else(|| month_label(date)),
            dispatch: field(&rec, dispatch_idx),
            reason: field(&rec, reason_idx),
            user: field(&rec, user_idx),
        });
    }
    report.total_rows = rows.len();
    Ok((rows, report))
}

fn open_reader(dataset: Dataset, path: &Path) -> Result<Reader<File>> {
    match File::open(path) {
        Ok(file) => Ok(ReaderBuilder::new().flexible(true).from_reader(file)),
        Err(source) => Err(ReportError::SourceNotFound {
            dataset,
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn column_index(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}

fn require_column(dataset: Dataset, headers: &StringRecord, name: &str) -> Result<usize> {
    column_index(headers, name).ok_or_else(|| ReportError::MissingColumn {
        dataset,
        column: name.to_string(),
    })
}

/// Optional cell access: absent columns and empty cells both map to `None`.
fn field(rec: &StringRecord, idx: Option<usize>) -> Option<String> {
    let v = rec.get(idx?)?.trim();
    if v.is_empty() {
        None
    } else {
        Some(v.to_string())
    }
}

fn cell_date(
    dataset: Dataset,
    rec: &StringRecord,
    idx: usize,
    column: &str,
    row: usize,
) -> Result<NaiveDate> {
    let raw = rec.get(idx).unwrap_or("");
    parse_date_safe(Some(raw)).ok_or_else(|| ReportError::Parse {
        dataset,
        column: column.to_string(),
        row,
        value: raw.trim().to_string(),
    })
}

fn cell_f64(
    dataset: Dataset,
    rec: &StringRecord,
    idx: usize,
    column: &str,
    row: usize,
) -> Result<f64> {
    let raw = rec.get(idx).unwrap_or("");
    parse_f64_safe(Some(raw)).ok_or_else(|| ReportError::Parse {
        dataset,
        column: column.to_string(),
        row,
        value: raw.trim().to_string(),
    })
}
