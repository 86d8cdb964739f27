//! Fixed storage keys.
//!
//! Each persisted collection lives as one JSON document under one fixed key.

/// Key names for the persisted collections.
pub mod key {
    /// The meter collection, a JSON array of meters.
    pub const METERS: &str = "meter_app_meters";

    /// The reading collection, a JSON array of readings across all meters.
    pub const READINGS: &str = "meter_app_readings";

    /// The cost-settings record, a JSON object.
    pub const COST_SETTINGS: &str = "meter_app_cost_settings";
}

/// Returns all fixed keys, e.g. for wiping a store.
#[must_use]
pub fn all_keys() -> Vec<&'static str> {
    vec![key::METERS, key::READINGS, key::COST_SETTINGS]
}
