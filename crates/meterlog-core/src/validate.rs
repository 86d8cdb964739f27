//! Reading validation and chronological ordering.
//!
//! A meter's readings form a sequence that must be strictly increasing in
//! both date and value: the counter only ever counts up, and the UI collects
//! one reading per calendar day. This module decides whether a candidate
//! reading (new or edited) may be committed, and exposes the neighbor lookup
//! the statistics code builds on.
//!
//! All functions here are pure decision functions; persistence happens in
//! the store crate after validation succeeds.

use chrono::NaiveDate;

use crate::error::{Result, ValidationError};
use crate::{Meter, MeterReading, ReadingDraft, ReadingId};

/// The chronological neighbors of a target date within one meter's readings.
#[derive(Debug, Clone, Copy)]
pub struct Neighbors<'a> {
    /// The reading with the greatest date ≤ the target date, if any.
    pub previous: Option<&'a MeterReading>,

    /// The reading with the smallest date > the target date, if any.
    pub next: Option<&'a MeterReading>,
}

/// Find the chronological neighbors of `target` in `readings`.
///
/// The input does not need to be sorted. Dates compare at day granularity;
/// a reading on the target date itself is reported as `previous`.
pub fn ordered_neighbors<'a, I>(readings: I, target: NaiveDate) -> Neighbors<'a>
where
    I: IntoIterator<Item = &'a MeterReading>,
{
    let mut previous: Option<&MeterReading> = None;
    let mut next: Option<&MeterReading> = None;

    for reading in readings {
        if reading.date <= target {
            if previous.map_or(true, |p| reading.date > p.date) {
                previous = Some(reading);
            }
        } else if next.map_or(true, |n| reading.date < n.date) {
            next = Some(reading);
        }
    }

    Neighbors { previous, next }
}

/// Decide whether `draft` may be committed against `existing`.
///
/// `existing` is the full set of readings for `meter`, in any order. For an
/// edit, `exclude` names the reading being replaced so it does not collide
/// with itself.
///
/// On success, inserting the candidate preserves the invariant that the
/// per-meter sequence has strictly increasing values over strictly
/// increasing dates.
///
/// # Errors
///
/// - [`ValidationError::DuplicateDate`] if another reading shares the
///   candidate's date.
/// - [`ValidationError::NonMonotonicBackward`] if the previous reading's
///   value is not below the candidate's.
/// - [`ValidationError::NonMonotonicForward`] if the next reading's value
///   is not above the candidate's.
pub fn validate_candidate(
    meter: &Meter,
    existing: &[MeterReading],
    draft: &ReadingDraft,
    exclude: Option<ReadingId>,
) -> Result<()> {
    let considered: Vec<&MeterReading> = existing
        .iter()
        .filter(|r| exclude.map_or(true, |id| r.id != id))
        .collect();

    if let Some(same_date) = considered.iter().find(|r| r.date == draft.date) {
        return Err(ValidationError::DuplicateDate {
            date: same_date.date,
            value: same_date.value,
            unit: meter.unit.clone(),
        });
    }

    let neighbors = ordered_neighbors(considered.iter().copied(), draft.date);

    if let Some(previous) = neighbors.previous {
        if previous.value >= draft.value {
            return Err(ValidationError::NonMonotonicBackward {
                date: previous.date,
                value: previous.value,
                unit: meter.unit.clone(),
            });
        }
    }

    if let Some(next) = neighbors.next {
        if next.value <= draft.value {
            return Err(ValidationError::NonMonotonicForward {
                date: next.date,
                value: next.value,
                unit: meter.unit.clone(),
            });
        }
    }

    Ok(())
}

/// Parse a counter value from user input.
///
/// # Errors
///
/// Returns [`ValidationError::MalformedNumericInput`] if the input is not a
/// finite, non-negative number.
pub fn parse_value(input: &str) -> Result<f64> {
    let malformed = || ValidationError::MalformedNumericInput {
        input: input.to_string(),
    };

    let value: f64 = input.trim().parse().map_err(|_| malformed())?;
    if !value.is_finite() || value < 0.0 {
        return Err(malformed());
    }
    Ok(value)
}

/// Parse an ISO `YYYY-MM-DD` reading date from user input.
///
/// # Errors
///
/// Returns [`ValidationError::MalformedDateInput`] if the input is not a
/// valid calendar date.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    input
        .trim()
        .parse()
        .map_err(|_| ValidationError::MalformedDateInput {
            input: input.to_string(),
        })
}
