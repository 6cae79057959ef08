//! Issuance/cancellation reporting pipeline for CTRC freight documents.
//!
//! Two spreadsheet exports go in (documents issued, documents cancelled);
//! out come a merged time series, category breakdowns, and a monthly
//! cancellation-rate comparison against the fixed 0.75% target.

pub mod aggregate;
pub mod cache;
pub mod error;
pub mod filter;
pub mod loader;
pub mod merge;
pub mod metrics;
pub mod output;
pub mod reports;
pub mod types;
pub mod util;
