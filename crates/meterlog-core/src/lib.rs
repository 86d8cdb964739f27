//! Core types and logic for meterlog.
//!
//! This crate provides the foundational pieces of the meter-tracking
//! application:
//!
//! - **Identifiers**: `MeterId`, `ReadingId`
//! - **Domain model**: `Meter`, `MeterReading`, `CostSettings`
//! - **Validation**: `validate_candidate`, `ordered_neighbors`
//! - **Statistics**: `compute_intervals`, `monthly_rollup`, `summary`, `cost_by_type`
//! - **Export**: CSV and printable HTML documents
//! - **Backup**: the JSON backup/restore document
//!
//! # Dates and values
//!
//! Reading dates carry day granularity only (`NaiveDate`); two readings on
//! the same calendar day are the same date. A meter's committed readings are
//! strictly increasing in both date and value, enforced by
//! [`validate::validate_candidate`] on every write.
//!
//! Everything here is pure data transformation; persistence lives in
//! `meterlog-store`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod backup;
pub mod error;
pub mod export;
pub mod ids;
pub mod meter;
pub mod stats;
pub mod validate;

pub use backup::Backup;
pub use error::{ExportError, ValidationError};
pub use ids::{IdError, MeterId, ReadingId};
pub use meter::{
    CostSettings, Meter, MeterReading, MeterType, ReadingDraft, DEFAULT_ELECTRICITY_RATE,
    DEFAULT_GAS_RATE, DEFAULT_WATER_RATE,
};
pub use stats::{
    compute_intervals, cost_by_type, filter_by_window, monthly_rollup, summary, Interval,
    MonthlyUsage, ReportingWindow, UsageSummary, ROLLUP_MONTHS,
};
pub use validate::{ordered_neighbors, parse_date, parse_value, validate_candidate, Neighbors};
