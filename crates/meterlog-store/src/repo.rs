//! Collection-level repository over a [`KvStore`].
//!
//! The repository owns the three persisted collections and is the only
//! write path: every reading mutation runs the core validator first, and
//! deleting a meter cascades over the reading collection in two explicit
//! steps (rewrite meters, then filter-and-rewrite readings) since the store
//! has no referential integrity of its own.
//!
//! Read-path corruption is not fatal: a collection that fails to decode is
//! treated as empty and logged, so the application stays usable. Write-path
//! errors are always surfaced.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use meterlog_core::{
    validate_candidate, Backup, CostSettings, Meter, MeterId, MeterReading, ReadingDraft,
    ReadingId,
};

use crate::error::{RepoError, StoreError};
use crate::keys::key;
use crate::KvStore;

/// Repository over any [`KvStore`] implementation.
pub struct Repository<S> {
    store: S,
}

impl<S: KvStore> Repository<S> {
    /// Wrap a key-value store.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn load_collection<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, StoreError> {
        let Some(json) = self.store.get(key)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&json) {
            Ok(items) => Ok(items),
            Err(err) => {
                tracing::warn!(key, %err, "corrupt collection in store, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    fn save_collection<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), StoreError> {
        let json =
            serde_json::to_string(items).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.store.set(key, &json)
    }

    // =========================================================================
    // Meters
    // =========================================================================

    /// All registered meters.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    pub fn meters(&self) -> Result<Vec<Meter>, StoreError> {
        self.load_collection(key::METERS)
    }

    /// Insert a meter, or update it in place when the id already exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    pub fn save_meter(&self, meter: &Meter) -> Result<(), StoreError> {
        let mut meters = self.meters()?;
        match meters.iter_mut().find(|m| m.id == meter.id) {
            Some(existing) => *existing = meter.clone(),
            None => meters.push(meter.clone()),
        }
        self.save_collection(key::METERS, &meters)
    }

    /// Delete a meter and all of its readings.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::MeterNotFound`] if the meter does not exist, or
    /// a store error.
    pub fn delete_meter(&self, meter_id: MeterId) -> Result<(), RepoError> {
        let mut meters = self.meters()?;
        let before = meters.len();
        meters.retain(|m| m.id != meter_id);
        if meters.len() == before {
            return Err(RepoError::MeterNotFound { meter_id });
        }
        self.save_collection(key::METERS, &meters)?;

        // Step two of the cascade: the store has no foreign keys.
        let mut readings = self.readings()?;
        let before = readings.len();
        readings.retain(|r| r.meter_id != meter_id);
        let removed = before - readings.len();
        self.save_collection(key::READINGS, &readings)?;

        tracing::debug!(%meter_id, removed, "cascade deleted readings with meter");
        Ok(())
    }

    // =========================================================================
    // Readings
    // =========================================================================

    /// All readings across all meters.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    pub fn readings(&self) -> Result<Vec<MeterReading>, StoreError> {
        self.load_collection(key::READINGS)
    }

    /// The readings logged against one meter.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    pub fn readings_for_meter(&self, meter_id: MeterId) -> Result<Vec<MeterReading>, StoreError> {
        let mut readings = self.readings()?;
        readings.retain(|r| r.meter_id == meter_id);
        Ok(readings)
    }

    /// The most recent reading of a meter, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    pub fn latest_reading(&self, meter_id: MeterId) -> Result<Option<MeterReading>, StoreError> {
        Ok(self
            .readings_for_meter(meter_id)?
            .into_iter()
            .max_by_key(|r| r.date))
    }

    /// Commit a new reading after validating it against its meter's history.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::MeterNotFound`] if the parent meter does not
    /// exist, a [`RepoError::Validation`] if the reading violates the
    /// per-meter invariant, or a store error.
    pub fn add_reading(&self, reading: MeterReading) -> Result<MeterReading, RepoError> {
        let meter = self.require_meter(reading.meter_id)?;
        let existing = self.readings_for_meter(reading.meter_id)?;
        let draft = ReadingDraft::new(reading.value, reading.date);
        validate_candidate(&meter, &existing, &draft, None)?;

        let mut all = self.readings()?;
        all.push(reading.clone());
        self.save_collection(key::READINGS, &all)?;
        Ok(reading)
    }

    /// Replace an existing reading after re-validating it, excluding the
    /// reading being replaced from the duplicate and neighbor checks.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::ReadingNotFound`] if no reading with this id
    /// exists, [`RepoError::MeterNotFound`] if its meter is gone, a
    /// [`RepoError::Validation`] on invariant violation, or a store error.
    pub fn update_reading(&self, reading: MeterReading) -> Result<MeterReading, RepoError> {
        let mut all = self.readings()?;
        let Some(slot) = all.iter_mut().find(|r| r.id == reading.id) else {
            return Err(RepoError::ReadingNotFound {
                reading_id: reading.id,
            });
        };

        let meter = self.require_meter(reading.meter_id)?;
        let existing = self.readings_for_meter(reading.meter_id)?;
        let draft = ReadingDraft::new(reading.value, reading.date);
        validate_candidate(&meter, &existing, &draft, Some(reading.id))?;

        *slot = reading.clone();
        self.save_collection(key::READINGS, &all)?;
        Ok(reading)
    }

    /// Delete a single reading.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::ReadingNotFound`] if no reading with this id
    /// exists, or a store error.
    pub fn delete_reading(&self, reading_id: ReadingId) -> Result<(), RepoError> {
        let mut all = self.readings()?;
        let before = all.len();
        all.retain(|r| r.id != reading_id);
        if all.len() == before {
            return Err(RepoError::ReadingNotFound { reading_id });
        }
        self.save_collection(key::READINGS, &all)?;
        Ok(())
    }

    fn require_meter(&self, meter_id: MeterId) -> Result<Meter, RepoError> {
        self.meters()?
            .into_iter()
            .find(|m| m.id == meter_id)
            .ok_or(RepoError::MeterNotFound { meter_id })
    }

    // =========================================================================
    // Cost settings
    // =========================================================================

    /// The saved cost rates, or the defaults when none are saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    pub fn cost_settings(&self) -> Result<CostSettings, StoreError> {
        let Some(json) = self.store.get(key::COST_SETTINGS)? else {
            return Ok(CostSettings::default());
        };

        match serde_json::from_str(&json) {
            Ok(settings) => Ok(settings),
            Err(err) => {
                tracing::warn!(%err, "corrupt cost settings in store, using defaults");
                Ok(CostSettings::default())
            }
        }
    }

    /// Persist the cost rates.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    pub fn save_cost_settings(&self, settings: &CostSettings) -> Result<(), StoreError> {
        let json = serde_json::to_string(settings)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.store.set(key::COST_SETTINGS, &json)
    }

    // =========================================================================
    // Backup / restore
    // =========================================================================

    /// Assemble a backup of the full data set, stamped with `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    pub fn export_backup(&self, now: DateTime<Utc>) -> Result<Backup, StoreError> {
        Ok(Backup::new(
            self.meters()?,
            self.readings()?,
            self.cost_settings()?,
            now,
        ))
    }

    /// Restore a backup by overwriting each collection wholesale.
    ///
    /// No per-record validation runs: a backup carrying duplicate dates or
    /// non-monotonic values is accepted as-is.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    pub fn import_backup(&self, backup: &Backup) -> Result<(), StoreError> {
        self.save_collection(key::METERS, &backup.meters)?;
        self.save_collection(key::READINGS, &backup.readings)?;
        self.save_cost_settings(&backup.cost_settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryKv;
    use chrono::NaiveDate;
    use meterlog_core::{MeterType, ValidationError};

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn repo() -> Repository<MemoryKv> {
        Repository::new(MemoryKv::new())
    }

    fn register_meter(repo: &Repository<MemoryKv>, name: &str, meter_type: MeterType) -> Meter {
        let meter = Meter::new(
            name.into(),
            meter_type,
            format!("{name}-SN"),
            meter_type.default_unit().into(),
        );
        repo.save_meter(&meter).unwrap();
        meter
    }

    #[test]
    fn meter_upsert_and_listing() {
        let repo = repo();
        let mut meter = register_meter(&repo, "Main", MeterType::Electricity);
        assert_eq!(repo.meters().unwrap().len(), 1);

        meter.name = "Main house".into();
        repo.save_meter(&meter).unwrap();

        let meters = repo.meters().unwrap();
        assert_eq!(meters.len(), 1);
        assert_eq!(meters[0].name, "Main house");
    }

    #[test]
    fn reading_lifecycle_with_validation() {
        let repo = repo();
        let meter = register_meter(&repo, "Water", MeterType::Water);

        let first = repo
            .add_reading(MeterReading::new(meter.id, 100.0, date("2024-01-01")))
            .unwrap();
        repo.add_reading(MeterReading::new(meter.id, 110.0, date("2024-02-01")))
            .unwrap();

        // Duplicate date is rejected and nothing is written.
        let err = repo
            .add_reading(MeterReading::new(meter.id, 120.0, date("2024-02-01")))
            .unwrap_err();
        assert!(matches!(
            err,
            RepoError::Validation(ValidationError::DuplicateDate { .. })
        ));
        assert_eq!(repo.readings().unwrap().len(), 2);

        // Editing the first reading keeps its own date available.
        let mut edited = first.clone();
        edited.value = 101.5;
        repo.update_reading(edited).unwrap();

        let stored = repo.readings_for_meter(meter.id).unwrap();
        assert_eq!(stored.iter().find(|r| r.id == first.id).unwrap().value, 101.5);

        repo.delete_reading(first.id).unwrap();
        assert_eq!(repo.readings_for_meter(meter.id).unwrap().len(), 1);
    }

    #[test]
    fn add_reading_requires_the_meter() {
        let repo = repo();
        let orphan = MeterReading::new(MeterId::generate(), 100.0, date("2024-01-01"));
        assert!(matches!(
            repo.add_reading(orphan),
            Err(RepoError::MeterNotFound { .. })
        ));
    }

    #[test]
    fn latest_reading_picks_the_maximum_date() {
        let repo = repo();
        let meter = register_meter(&repo, "Gas", MeterType::Gas);

        repo.add_reading(MeterReading::new(meter.id, 1000.0, date("2024-01-01")))
            .unwrap();
        repo.add_reading(MeterReading::new(meter.id, 1100.0, date("2024-03-01")))
            .unwrap();
        repo.add_reading(MeterReading::new(meter.id, 1050.0, date("2024-02-01")))
            .unwrap();

        let latest = repo.latest_reading(meter.id).unwrap().unwrap();
        assert_eq!(latest.date, date("2024-03-01"));
        assert_eq!(latest.value, 1100.0);
    }

    #[test]
    fn deleting_a_meter_cascades_to_its_readings() {
        let repo = repo();
        let water = register_meter(&repo, "Water", MeterType::Water);
        let gas = register_meter(&repo, "Gas", MeterType::Gas);

        repo.add_reading(MeterReading::new(water.id, 100.0, date("2024-01-01")))
            .unwrap();
        repo.add_reading(MeterReading::new(gas.id, 1000.0, date("2024-01-01")))
            .unwrap();

        repo.delete_meter(water.id).unwrap();

        assert_eq!(repo.meters().unwrap().len(), 1);
        let remaining = repo.readings().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].meter_id, gas.id);

        assert!(matches!(
            repo.delete_meter(water.id),
            Err(RepoError::MeterNotFound { .. })
        ));
    }

    #[test]
    fn cost_settings_default_until_saved() {
        let repo = repo();
        assert_eq!(repo.cost_settings().unwrap(), CostSettings::default());

        let custom = CostSettings {
            electricity: 0.42,
            gas: 0.15,
            water: 5.10,
        };
        repo.save_cost_settings(&custom).unwrap();
        assert_eq!(repo.cost_settings().unwrap(), custom);
    }

    #[test]
    fn corrupt_collections_read_back_as_empty() {
        let store = MemoryKv::new();
        store.set(key::METERS, "{not json").unwrap();
        store.set(key::COST_SETTINGS, "[]").unwrap();

        let repo = Repository::new(store);
        assert!(repo.meters().unwrap().is_empty());
        assert_eq!(repo.cost_settings().unwrap(), CostSettings::default());
    }
}
