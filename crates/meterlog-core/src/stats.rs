//! Consumption and cost statistics.
//!
//! Turns a meter's reading sequence into per-interval consumption rows and
//! rolls them up into monthly and range summaries. An interval requires two
//! endpoints, so a sequence of `n` readings yields `n - 1` rows and a meter
//! with fewer than two readings yields nothing.
//!
//! Arithmetic is plain IEEE double; rounding to two decimals happens once at
//! the output boundary so long sequences do not compound rounding error.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{CostSettings, Meter, MeterId, MeterReading, MeterType};

/// How many months of history a rollup keeps.
pub const ROLLUP_MONTHS: usize = 12;

/// Consumption and cost between two chronologically adjacent readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interval {
    /// Date of the later reading in the interval.
    pub date: NaiveDate,

    /// Counter value of the later reading.
    pub meter_value: f64,

    /// Consumed units over the interval, rounded to 2 decimals.
    ///
    /// Committed data is strictly increasing, but provisional previews are
    /// not; a zero or negative delta is passed through for the caller to flag.
    pub consumption: f64,

    /// Consumption times the cost rate, rounded to 2 decimals.
    pub cost: f64,
}

/// Consumption and cost totals for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyUsage {
    /// Month key in `YYYY-MM` form.
    pub month: String,

    /// Summed consumption of the month's intervals, rounded to 2 decimals.
    pub total_consumption: f64,

    /// Summed cost of the month's intervals, rounded to 2 decimals.
    pub total_cost: f64,

    /// Number of intervals contributing to this month.
    pub reading_count: usize,
}

/// Totals and daily averages over a reporting window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSummary {
    /// Total consumption over the window, rounded to 2 decimals.
    pub total_consumption: f64,

    /// Total cost over the window, rounded to 2 decimals.
    pub total_cost: f64,

    /// Total consumption divided by the requested window length.
    pub avg_daily_consumption: f64,

    /// Total cost divided by the requested window length.
    pub avg_daily_cost: f64,

    /// Number of intervals contributing to the totals.
    pub count: usize,
}

/// The reporting windows offered by the statistics view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportingWindow {
    /// The last 7 days.
    Week,
    /// The last 30 days.
    Month,
    /// The last 180 days.
    HalfYear,
    /// The last 365 days.
    Year,
}

impl ReportingWindow {
    /// Window length in days.
    ///
    /// This is also the denominator for daily averages: a sparse data set
    /// yields a deliberately diluted average rather than one computed only
    /// over observed days.
    #[must_use]
    pub const fn days(self) -> u32 {
        match self {
            Self::Week => 7,
            Self::Month => 30,
            Self::HalfYear => 180,
            Self::Year => 365,
        }
    }

    /// The earliest date inside the window, counting back from `today`.
    #[must_use]
    pub fn cutoff(self, today: NaiveDate) -> NaiveDate {
        today - Days::new(u64::from(self.days()))
    }
}

/// Keep the readings whose date falls inside the window ending at `today`.
#[must_use]
pub fn filter_by_window(
    readings: &[MeterReading],
    window: ReportingWindow,
    today: NaiveDate,
) -> Vec<MeterReading> {
    let cutoff = window.cutoff(today);
    readings
        .iter()
        .filter(|r| r.date >= cutoff && r.date <= today)
        .cloned()
        .collect()
}

/// Round to two decimals for display.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Unrounded interval rows over the date-sorted input.
///
/// Shared by the public aggregations so each one rounds exactly once.
fn raw_intervals(readings: &[MeterReading], cost_rate: f64) -> Vec<(NaiveDate, f64, f64, f64)> {
    let mut sorted: Vec<&MeterReading> = readings.iter().collect();
    sorted.sort_by_key(|r| r.date);

    sorted
        .windows(2)
        .map(|pair| {
            let consumption = pair[1].value - pair[0].value;
            (pair[1].date, pair[1].value, consumption, consumption * cost_rate)
        })
        .collect()
}

/// Derive per-interval consumption and cost rows for one meter.
///
/// The input does not need to be sorted. The first reading in date order has
/// no prior value to diff against, so the output is one row shorter than the
/// input (empty for fewer than two readings).
#[must_use]
pub fn compute_intervals(readings: &[MeterReading], cost_rate: f64) -> Vec<Interval> {
    raw_intervals(readings, cost_rate)
        .into_iter()
        .map(|(date, meter_value, consumption, cost)| Interval {
            date,
            meter_value,
            consumption: round2(consumption),
            cost: round2(cost),
        })
        .collect()
}

/// Group a meter's intervals by the later reading's calendar month.
///
/// The full history is aggregated first; only then is the result trimmed to
/// the most recent [`ROLLUP_MONTHS`] entries, oldest first.
#[must_use]
pub fn monthly_rollup(readings: &[MeterReading], cost_rate: f64) -> Vec<MonthlyUsage> {
    let mut months: BTreeMap<(i32, u32), (f64, f64, usize)> = BTreeMap::new();

    for (date, _, consumption, cost) in raw_intervals(readings, cost_rate) {
        let entry = months.entry((date.year(), date.month())).or_default();
        entry.0 += consumption;
        entry.1 += cost;
        entry.2 += 1;
    }

    let mut rollup: Vec<MonthlyUsage> = months
        .into_iter()
        .map(|((year, month), (consumption, cost, count))| MonthlyUsage {
            month: format!("{year:04}-{month:02}"),
            total_consumption: round2(consumption),
            total_cost: round2(cost),
            reading_count: count,
        })
        .collect();

    if rollup.len() > ROLLUP_MONTHS {
        rollup.drain(..rollup.len() - ROLLUP_MONTHS);
    }
    rollup
}

/// Summarize interval rows over a reporting window of `range_days` days.
///
/// The averages divide by the requested window length, not by the span the
/// data actually covers.
#[must_use]
pub fn summary(intervals: &[Interval], range_days: u32) -> UsageSummary {
    let total_consumption: f64 = intervals.iter().map(|i| i.consumption).sum();
    let total_cost: f64 = intervals.iter().map(|i| i.cost).sum();
    let days = f64::from(range_days);

    UsageSummary {
        total_consumption: round2(total_consumption),
        total_cost: round2(total_cost),
        avg_daily_consumption: round2(total_consumption / days),
        avg_daily_cost: round2(total_cost / days),
        count: intervals.len(),
    }
}

/// Total cost per meter type across all meters, using each meter's own type
/// to pick the rate. Types with no spend are omitted.
#[must_use]
pub fn cost_by_type(
    meters: &[Meter],
    readings_by_meter: &HashMap<MeterId, Vec<MeterReading>>,
    settings: &CostSettings,
) -> BTreeMap<MeterType, f64> {
    let mut totals: BTreeMap<MeterType, f64> = BTreeMap::new();

    for meter in meters {
        let Some(readings) = readings_by_meter.get(&meter.id) else {
            continue;
        };
        let rate = settings.rate_for(meter.meter_type);
        let meter_cost: f64 = raw_intervals(readings, rate)
            .into_iter()
            .map(|(_, _, _, cost)| cost)
            .sum();
        *totals.entry(meter.meter_type).or_default() += meter_cost;
    }

    totals
        .into_iter()
        .filter(|(_, cost)| *cost > 0.0)
        .map(|(meter_type, cost)| (meter_type, round2(cost)))
        .collect()
}
