//! Per-vessel tariff store

use crate::domain::model::VesselTariff;
use crate::error::Result;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

/// Persistent store for per-vessel daily rates.
///
/// Vessel names match case-insensitively; the store keys on the lowercased
/// name and keeps the display form in the record.
pub struct TariffStore {
    store_path: PathBuf,
    tariffs: HashMap<String, VesselTariff>,
}

impl TariffStore {
    /// Create or load the tariff store
    pub fn open(store_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&store_dir)?;
        let store_path = store_dir.join("tariffs.json");

        let tariffs = if store_path.exists() {
            let file = File::open(&store_path)?;
            let reader = BufReader::new(file);
            serde_json::from_reader(reader).unwrap_or_default()
        } else {
            HashMap::new()
        };

        Ok(Self { store_path, tariffs })
    }

    fn save(&self) -> Result<()> {
        let file = File::create(&self.store_path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &self.tariffs)?;
        Ok(())
    }

    /// Set or replace the daily rate for a vessel.
    pub fn set(&mut self, vessel_name: &str, daily_rate: f64) -> Result<()> {
        let key = vessel_name.trim().to_lowercase();
        self.tariffs.insert(
            key,
            VesselTariff {
                vessel_name: vessel_name.trim().to_string(),
                daily_rate,
            },
        );
        self.save()?;
        Ok(())
    }

    /// Daily rate for a vessel, if one is registered.
    pub fn rate_for(&self, vessel_name: &str) -> Option<f64> {
        self.tariffs
            .get(&vessel_name.trim().to_lowercase())
            .map(|t| t.daily_rate)
    }

    /// Remove a vessel's tariff.
    pub fn remove(&mut self, vessel_name: &str) -> Result<bool> {
        let removed = self
            .tariffs
            .remove(&vessel_name.trim().to_lowercase())
            .is_some();
        if removed {
            self.save()?;
        }
        Ok(removed)
    }

    /// All tariffs sorted by vessel name.
    pub fn all(&self) -> Vec<&VesselTariff> {
        let mut tariffs: Vec<_> = self.tariffs.values().collect();
        tariffs.sort_by(|a, b| a.vessel_name.cmp(&b.vessel_name));
        tariffs
    }

    pub fn count(&self) -> usize {
        self.tariffs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_set_and_lookup_case_insensitive() {
        let dir = tempdir().unwrap();
        let mut store = TariffStore::open(dir.path().to_path_buf()).unwrap();

        store.set("Ever Given", 120.0).unwrap();
        assert_eq!(store.rate_for("EVER GIVEN"), Some(120.0));
        assert_eq!(store.rate_for("ever given "), Some(120.0));
        assert_eq!(store.rate_for("MSC Oscar"), None);
    }

    #[test]
    fn test_set_is_upsert() {
        let dir = tempdir().unwrap();
        let mut store = TariffStore::open(dir.path().to_path_buf()).unwrap();

        store.set("Ever Given", 120.0).unwrap();
        store.set("ever given", 150.0).unwrap();
        assert_eq!(store.count(), 1);
        assert_eq!(store.rate_for("Ever Given"), Some(150.0));
    }

    #[test]
    fn test_persistence() {
        let dir = tempdir().unwrap();
        {
            let mut store = TariffStore::open(dir.path().to_path_buf()).unwrap();
            store.set("MSC Oscar", 90.5).unwrap();
        }
        let store = TariffStore::open(dir.path().to_path_buf()).unwrap();
        assert_eq!(store.rate_for("msc oscar"), Some(90.5));
    }
}
