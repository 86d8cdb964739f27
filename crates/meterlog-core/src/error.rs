//! Error types for meterlog-core.

use chrono::NaiveDate;

/// Result type for validation operations.
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Errors that can occur when validating a candidate reading.
///
/// All variants are recoverable: the user corrects the input and resubmits.
/// The monotonicity variants carry the conflicting neighbor's date, value and
/// unit so callers can render a precise message.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Another reading of the same meter already exists on this date.
    #[error("a reading for {date} already exists ({value} {unit})")]
    DuplicateDate {
        /// Date of the existing reading.
        date: NaiveDate,
        /// Value of the existing reading.
        value: f64,
        /// Measurement unit of the meter.
        unit: String,
    },

    /// The candidate value does not exceed the chronologically previous reading.
    #[error("value must be greater than the previous reading of {value} {unit} on {date}")]
    NonMonotonicBackward {
        /// Date of the previous reading.
        date: NaiveDate,
        /// Value of the previous reading.
        value: f64,
        /// Measurement unit of the meter.
        unit: String,
    },

    /// The candidate value is not below the chronologically next reading.
    #[error("value must be less than the next reading of {value} {unit} on {date}")]
    NonMonotonicForward {
        /// Date of the next reading.
        date: NaiveDate,
        /// Value of the next reading.
        value: f64,
        /// Measurement unit of the meter.
        unit: String,
    },

    /// A counter value could not be parsed from user input.
    #[error("not a valid counter value: {input:?}")]
    MalformedNumericInput {
        /// The raw input that failed to parse.
        input: String,
    },

    /// A reading date could not be parsed from user input.
    #[error("not a valid date (expected YYYY-MM-DD): {input:?}")]
    MalformedDateInput {
        /// The raw input that failed to parse.
        input: String,
    },
}

/// Errors that can occur when rendering an export document.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The CSV writer failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Flushing the CSV buffer failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV buffer was not valid UTF-8.
    #[error("CSV output was not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
