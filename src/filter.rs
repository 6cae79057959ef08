use crate::types::{CancellationRecord, IssuanceRecord};

/// Month/dispatch selection applied to both datasets.
///
/// `None` means "all rows". Selector values are meant to come from the
/// `distinct_*` lists, which are built from the issuance dataset only — the
/// canonical source of valid periods and dispatch groups. A value that never
/// occurs simply matches nothing; it is not an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportFilter {
    pub month: Option<String>,
    pub dispatch: Option<String>,
}

impl ReportFilter {
    fn matches(&self, month: &str, dispatch: Option<&str>) -> bool {
        if let Some(want) = &self.month {
            if month != want {
                return false;
            }
        }
        if let Some(want) = &self.dispatch {
            // A row with no dispatch value never matches a dispatch selector.
            if dispatch != Some(want.as_str()) {
                return false;
            }
        }
        true
    }
}

/// Distinct month labels observed in the issuance dataset, sorted.
pub fn distinct_months(rows: &[IssuanceRecord]) -> Vec<String> {
    let mut vals: Vec<String> = rows.iter().map(|r| r.month.clone()).collect();
    vals.sort();
    vals.dedup();
    vals
}

/// Distinct dispatch groups observed in the issuance dataset, sorted.
pub fn distinct_dispatches(rows: &[IssuanceRecord]) -> Vec<String> {
    let mut vals: Vec<String> = rows.iter().filter_map(|r| r.dispatch.clone()).collect();
    vals.sort();
    vals.dedup();
    vals
}

/// Apply the filter to both datasets.
///
/// Selector values are validated against the issuance dataset's distinct
/// sets first: a value the issuance data never saw matches nothing, so both
/// subsequences come back empty. A dispatch group or month that only the
/// cancellation file mentions can therefore never survive a selection.
pub fn apply(
    filter: &ReportFilter,
    issuances: &[IssuanceRecord],
    cancellations: &[CancellationRecord],
) -> (Vec<IssuanceRecord>, Vec<CancellationRecord>) {
    if let Some(month) = &filter.month {
        if !distinct_months(issuances).contains(month) {
            return (Vec::new(), Vec::new());
        }
    }
    if let Some(dispatch) = &filter.dispatch {
        if !distinct_dispatches(issuances).contains(dispatch) {
            return (Vec::new(), Vec::new());
        }
    }
    (
        filter_issuances(issuances, filter),
        filter_cancellations(cancellations, filter),
    )
}

pub fn filter_issuances(rows: &[IssuanceRecord], filter: &ReportFilter) -> Vec<IssuanceRecord> {
    rows.iter()
        .filter(|r| filter.matches(&r.month, r.dispatch.as_deref()))
        .cloned()
        .collect()
}

pub fn filter_cancellations(
    rows: &[CancellationRecord],
    filter: &ReportFilter,
) -> Vec<CancellationRecord> {
    rows.iter()
        .filter(|r| filter.matches(&r.month, r.dispatch.as_deref()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn issuance(month: &str, dispatch: Option<&str>) -> IssuanceRecord {
        IssuanceRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            quantity: 1.0,
            month: month.into(),
            dispatch: dispatch.map(Into::into),
            user: None,
        }
    }

    #[test]
    fn distinct_values_are_sorted_and_deduped() {
        let rows = vec![
            issuance("2024-02", Some("SP")),
            issuance("2024-01", Some("RJ")),
            issuance("2024-01", Some("SP")),
            issuance("2024-01", None),
        ];
        assert_eq!(distinct_months(&rows), vec!["2024-01", "2024-02"]);
        assert_eq!(distinct_dispatches(&rows), vec!["RJ", "SP"]);
    }

    #[test]
    fn no_selector_returns_all_rows() {
        let rows = vec![issuance("2024-01", Some("SP")), issuance("2024-02", None)];
        let out = filter_issuances(&rows, &ReportFilter::default());
        assert_eq!(out, rows);
    }

    #[test]
    fn selectors_match_exactly() {
        let rows = vec![
            issuance("2024-01", Some("SP")),
            issuance("2024-01", Some("RJ")),
            issuance("2024-02", Some("SP")),
        ];
        let filter = ReportFilter {
            month: Some("2024-01".into()),
            dispatch: Some("SP".into()),
        };
        let out = filter_issuances(&rows, &filter);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].dispatch.as_deref(), Some("SP"));
    }

    #[test]
    fn unknown_selector_yields_empty_not_error() {
        let rows = vec![issuance("2024-01", Some("SP"))];
        let filter = ReportFilter {
            month: Some("2030-12".into()),
            dispatch: None,
        };
        assert!(filter_issuances(&rows, &filter).is_empty());
    }

    #[test]
    fn rows_without_a_dispatch_never_match_a_dispatch_selector() {
        let rows = vec![issuance("2024-01", None)];
        let filter = ReportFilter {
            month: None,
            dispatch: Some("SP".into()),
        };
        assert!(filter_issuances(&rows, &filter).is_empty());
    }

    #[test]
    fn cancellation_only_values_never_survive_a_selection() {
        let issuances = vec![issuance("2024-01", Some("SP"))];
        let cancellations = vec![CancellationRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
            month: "2024-01".into(),
            dispatch: Some("MG".into()),
            reason: None,
            user: None,
        }];
        // "MG" exists only in the cancellation data, so it is not a valid
        // selector: both subsequences come back empty.
        let filter = ReportFilter {
            month: None,
            dispatch: Some("MG".into()),
        };
        let (iss, canc) = apply(&filter, &issuances, &cancellations);
        assert!(iss.is_empty());
        assert!(canc.is_empty());

        // A valid selector still excludes the mismatching cancellation row.
        let filter = ReportFilter {
            month: None,
            dispatch: Some("SP".into()),
        };
        let (iss, canc) = apply(&filter, &issuances, &cancellations);
        assert_eq!(iss.len(), 1);
        assert!(canc.is_empty());
    }
}
