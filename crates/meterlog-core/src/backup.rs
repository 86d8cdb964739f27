//! Backup and restore document.
//!
//! A backup is a single JSON document holding the full data set. Restore
//! overwrites whole collections and deliberately performs no per-record
//! validation: a backup is trusted input, and live-write invariants are not
//! re-checked against it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CostSettings, Meter, MeterReading};

/// The backup file layout.
///
/// Field names are camelCase on the wire (`costSettings`, `exportDate`),
/// matching the established backup file format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    /// All registered meters.
    #[serde(default)]
    pub meters: Vec<Meter>,

    /// All readings, across all meters.
    #[serde(default)]
    pub readings: Vec<MeterReading>,

    /// Cost rates at export time.
    pub cost_settings: CostSettings,

    /// When the backup was produced.
    pub export_date: DateTime<Utc>,
}

impl Backup {
    /// Assemble a backup of the full data set.
    #[must_use]
    pub fn new(
        meters: Vec<Meter>,
        readings: Vec<MeterReading>,
        cost_settings: CostSettings,
        export_date: DateTime<Utc>,
    ) -> Self {
        Self {
            meters,
            readings,
            cost_settings,
            export_date,
        }
    }

    /// Serialize to pretty-printed JSON, the on-disk backup format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a backup file.
    ///
    /// No invariant checking happens here: duplicate dates or non-monotonic
    /// values in the file are accepted as-is.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a well-formed backup document.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
