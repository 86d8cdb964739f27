//! Meter and reading types for meterlog.
//!
//! This module defines the persisted record shapes: registered meters, the
//! readings logged against them, and the cost-rate settings used for derived
//! statistics.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{MeterId, ReadingId};

// ============================================================================
// Constants
// ============================================================================

/// Default electricity rate in currency units per kWh.
pub const DEFAULT_ELECTRICITY_RATE: f64 = 0.35;

/// Default gas rate in currency units per kWh.
pub const DEFAULT_GAS_RATE: f64 = 0.12;

/// Default water rate in currency units per m³.
pub const DEFAULT_WATER_RATE: f64 = 4.50;

/// The kind of utility a meter measures.
///
/// The type fixes which cost rate from [`CostSettings`] applies to the
/// meter's consumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeterType {
    /// Electricity meter (typically kWh).
    Electricity,

    /// Gas meter (typically kWh).
    Gas,

    /// Water meter (typically m³).
    Water,
}

impl MeterType {
    /// Get the type name as a string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Electricity => "electricity",
            Self::Gas => "gas",
            Self::Water => "water",
        }
    }

    /// The measurement unit a new meter of this type starts with.
    #[must_use]
    pub fn default_unit(&self) -> &'static str {
        match self {
            Self::Electricity | Self::Gas => "kWh",
            Self::Water => "m³",
        }
    }
}

/// A tracked utility connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meter {
    /// Unique meter id, immutable after creation.
    pub id: MeterId,

    /// Display name chosen by the user.
    pub name: String,

    /// Which utility this meter measures.
    #[serde(rename = "type")]
    pub meter_type: MeterType,

    /// Serial number printed on the physical meter.
    pub serial_number: String,

    /// Measurement unit of the counter (e.g. "kWh", "m³").
    pub unit: String,

    /// When the meter was registered.
    pub created_at: DateTime<Utc>,
}

impl Meter {
    /// Register a new meter, stamping a fresh id and creation time.
    #[must_use]
    pub fn new(name: String, meter_type: MeterType, serial_number: String, unit: String) -> Self {
        Self {
            id: MeterId::generate(),
            name,
            meter_type,
            serial_number,
            unit,
            created_at: Utc::now(),
        }
    }
}

/// A logged value of a meter's cumulative counter.
///
/// Readings carry a calendar date only; time-of-day is never collected, so
/// two readings on the same day are considered the same date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeterReading {
    /// Unique reading id, time-ordered by creation.
    pub id: ReadingId,

    /// The meter this reading belongs to.
    pub meter_id: MeterId,

    /// Counter value at the time of reading. Non-negative.
    pub value: f64,

    /// Calendar date of the reading.
    pub date: NaiveDate,

    /// Optional photo of the counter, stored as a data-URL text blob.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,

    /// Optional free-form notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// When the reading was recorded.
    pub created_at: DateTime<Utc>,
}

impl MeterReading {
    /// Record a new reading, stamping a fresh id and creation time.
    #[must_use]
    pub fn new(meter_id: MeterId, value: f64, date: NaiveDate) -> Self {
        Self {
            id: ReadingId::generate(),
            meter_id,
            value,
            date,
            photo: None,
            notes: None,
            created_at: Utc::now(),
        }
    }

    /// Attach notes to the reading.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Attach a photo (data-URL text) to the reading.
    #[must_use]
    pub fn with_photo(mut self, photo: impl Into<String>) -> Self {
        self.photo = Some(photo.into());
        self
    }
}

/// A candidate reading before it has an id or timestamp.
///
/// This is what a form submission or import row carries into validation;
/// committing it produces a full [`MeterReading`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadingDraft {
    /// Proposed counter value.
    pub value: f64,

    /// Proposed calendar date.
    pub date: NaiveDate,
}

impl ReadingDraft {
    /// Create a draft from a value and date.
    #[must_use]
    pub const fn new(value: f64, date: NaiveDate) -> Self {
        Self { value, date }
    }
}

/// Price per unit of consumption, keyed by meter type.
///
/// Settings are loaded once at start and saved explicitly; the aggregator
/// receives them as a parameter rather than reading ambient state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostSettings {
    /// Electricity rate per unit.
    pub electricity: f64,

    /// Gas rate per unit.
    pub gas: f64,

    /// Water rate per unit.
    pub water: f64,
}

impl CostSettings {
    /// Look up the rate for a meter type.
    #[must_use]
    pub fn rate_for(&self, meter_type: MeterType) -> f64 {
        match meter_type {
            MeterType::Electricity => self.electricity,
            MeterType::Gas => self.gas,
            MeterType::Water => self.water,
        }
    }
}

impl Default for CostSettings {
    fn default() -> Self {
        Self {
            electricity: DEFAULT_ELECTRICITY_RATE,
            gas: DEFAULT_GAS_RATE,
            water: DEFAULT_WATER_RATE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meter_type_as_str() {
        assert_eq!(MeterType::Electricity.as_str(), "electricity");
        assert_eq!(MeterType::Gas.as_str(), "gas");
        assert_eq!(MeterType::Water.as_str(), "water");
    }

    #[test]
    fn meter_type_default_units() {
        assert_eq!(MeterType::Electricity.default_unit(), "kWh");
        assert_eq!(MeterType::Water.default_unit(), "m³");
    }

    #[test]
    fn meter_serde_uses_camel_case() {
        let meter = Meter::new(
            "Kitchen".into(),
            MeterType::Electricity,
            "E-1001".into(),
            "kWh".into(),
        );
        let json = serde_json::to_value(&meter).unwrap();

        assert!(json.get("serialNumber").is_some());
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["type"], "electricity");
    }

    #[test]
    fn reading_serde_uses_camel_case() {
        let meter_id = MeterId::generate();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let reading = MeterReading::new(meter_id, 100.0, date).with_notes("after move-in");
        let json = serde_json::to_value(&reading).unwrap();

        assert!(json.get("meterId").is_some());
        assert_eq!(json["date"], "2024-01-01");
        assert_eq!(json["notes"], "after move-in");
        assert!(json.get("photo").is_none());
    }

    #[test]
    fn cost_settings_rate_lookup() {
        let settings = CostSettings::default();
        assert_eq!(settings.rate_for(MeterType::Electricity), DEFAULT_ELECTRICITY_RATE);
        assert_eq!(settings.rate_for(MeterType::Gas), DEFAULT_GAS_RATE);
        assert_eq!(settings.rate_for(MeterType::Water), DEFAULT_WATER_RATE);
    }
}
