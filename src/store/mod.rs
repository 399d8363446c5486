//! Persistent stores backed by JSON files in the data directory
//!
//! Each store loads its file on open and rewrites it after every mutation.
//! Records are small and operator-driven, so full rewrites are fine.

pub mod tariffs;
pub mod users;

pub use tariffs::TariffStore;
pub use users::UserStore;

use crate::domain::model::{ContainerId, MovementLog, PortOperation};
use crate::error::{Result, StoreError};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

/// Filter for [`OperationStore::search`].
///
/// Text fields match case-insensitively by substring, numeric fields match
/// exactly, and the date bounds apply to the record timestamp. All supplied
/// criteria must hold.
#[derive(Debug, Clone, Default)]
pub struct SearchCriteria {
    pub container_id: Option<String>,
    pub vessel_name: Option<String>,
    pub imo_number: Option<u32>,
    pub arrival_port: Option<String>,
    pub departure_port: Option<String>,
    pub container_size: Option<u32>,
    pub container_type: Option<String>,
    pub operation_type: Option<String>,
    pub terminal_name: Option<String>,
    pub transport_mode: Option<String>,
    pub container_status: Option<String>,
    pub location_area: Option<String>,
    pub handling_equipment: Option<String>,
    pub customs_clearance_status: Option<String>,
    pub weight_kg: Option<u32>,
    pub hazmat_flag: Option<bool>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

fn text_matches(filter: &Option<String>, value: &Option<String>) -> bool {
    match filter {
        None => true,
        Some(f) => value
            .as_ref()
            .map(|v| v.to_lowercase().contains(&f.to_lowercase()))
            .unwrap_or(false),
    }
}

fn exact_matches<T: PartialEq + Copy>(filter: &Option<T>, value: &Option<T>) -> bool {
    match filter {
        None => true,
        Some(f) => value.map(|v| v == *f).unwrap_or(false),
    }
}

impl SearchCriteria {
    fn matches(&self, op: &PortOperation) -> bool {
        if let Some(ref id) = self.container_id {
            if !op
                .container_id
                .as_str()
                .to_lowercase()
                .contains(&id.to_lowercase())
            {
                return false;
            }
        }
        if let Some(flag) = self.hazmat_flag {
            if op.hazmat_flag != flag {
                return false;
            }
        }
        if let Some(start) = self.start_date {
            match op.timestamp {
                Some(ts) if ts >= start => {}
                _ => return false,
            }
        }
        if let Some(end) = self.end_date {
            match op.timestamp {
                Some(ts) if ts <= end => {}
                _ => return false,
            }
        }
        text_matches(&self.vessel_name, &op.vessel_name)
            && text_matches(&self.arrival_port, &op.arrival_port)
            && text_matches(&self.departure_port, &op.departure_port)
            && text_matches(&self.container_type, &op.container_type)
            && text_matches(&self.operation_type, &op.operation_type)
            && text_matches(&self.terminal_name, &op.terminal_name)
            && text_matches(&self.transport_mode, &op.transport_mode)
            && text_matches(&self.container_status, &op.container_status)
            && text_matches(&self.location_area, &op.location_area)
            && text_matches(&self.handling_equipment, &op.handling_equipment)
            && text_matches(&self.customs_clearance_status, &op.customs_clearance_status)
            && exact_matches(&self.imo_number, &op.imo_number)
            && exact_matches(&self.container_size, &op.container_size)
            && exact_matches(&self.weight_kg, &op.weight_kg)
    }
}

/// Outcome of an import-style upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Added,
    Updated,
}

/// Persistent store for port operations and their movement history
pub struct OperationStore {
    operations_path: PathBuf,
    movements_path: PathBuf,
    operations: HashMap<String, PortOperation>,
    movements: Vec<MovementLog>,
}

impl OperationStore {
    /// Create or load the store under `store_dir`
    pub fn open(store_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&store_dir)?;
        let operations_path = store_dir.join("operations.json");
        let movements_path = store_dir.join("movements.json");

        let operations = if operations_path.exists() {
            let file = File::open(&operations_path)?;
            let reader = BufReader::new(file);
            serde_json::from_reader(reader).unwrap_or_default()
        } else {
            HashMap::new()
        };

        let movements = if movements_path.exists() {
            let file = File::open(&movements_path)?;
            let reader = BufReader::new(file);
            serde_json::from_reader(reader).unwrap_or_default()
        } else {
            Vec::new()
        };

        Ok(Self {
            operations_path,
            movements_path,
            operations,
            movements,
        })
    }

    fn save(&self) -> Result<()> {
        let file = File::create(&self.operations_path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &self.operations)?;

        let file = File::create(&self.movements_path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &self.movements)?;
        Ok(())
    }

    /// Add a new record. The container id is the primary key.
    pub fn add(&mut self, op: PortOperation) -> Result<()> {
        let key = op.container_id.as_str().to_string();
        if self.operations.contains_key(&key) {
            return Err(StoreError::Duplicate(key).into());
        }
        self.operations.insert(key, op);
        self.save()?;
        Ok(())
    }

    /// Replace an existing record, appending a movement log entry when the
    /// status or yard location changed.
    pub fn update(&mut self, op: PortOperation) -> Result<()> {
        let key = op.container_id.as_str().to_string();
        let old = self
            .operations
            .get(&key)
            .ok_or_else(|| StoreError::NotFound(key.clone()))?;

        if old.container_status != op.container_status || old.location_area != op.location_area {
            self.movements.push(MovementLog {
                container_id: op.container_id.clone(),
                operation_type: op.operation_type.clone(),
                old_status: old.container_status.clone(),
                new_status: op.container_status.clone(),
                old_location: old.location_area.clone(),
                new_location: op.location_area.clone(),
                logged_at: Utc::now(),
            });
        }

        self.operations.insert(key, op);
        self.save()?;
        Ok(())
    }

    /// Insert or replace, for CSV import where duplicate ids mean "update".
    pub fn upsert(&mut self, op: PortOperation) -> Result<UpsertOutcome> {
        let key = op.container_id.as_str().to_string();
        if self.operations.contains_key(&key) {
            self.update(op)?;
            Ok(UpsertOutcome::Updated)
        } else {
            self.add(op)?;
            Ok(UpsertOutcome::Added)
        }
    }

    /// Remove a record and its movement history.
    pub fn remove(&mut self, container_id: &str) -> Result<bool> {
        let key = container_id.trim().to_ascii_uppercase();
        let removed = self.operations.remove(&key).is_some();
        if removed {
            self.movements.retain(|m| m.container_id.as_str() != key);
            self.save()?;
        }
        Ok(removed)
    }

    /// Case-insensitive lookup by container id.
    pub fn get(&self, container_id: &str) -> Option<&PortOperation> {
        self.operations.get(&container_id.trim().to_ascii_uppercase())
    }

    /// All records, newest timestamp first (records without one last).
    pub fn all(&self) -> Vec<&PortOperation> {
        let mut ops: Vec<_> = self.operations.values().collect();
        ops.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        ops
    }

    /// Records matching the given criteria, newest first.
    pub fn search(&self, criteria: &SearchCriteria) -> Vec<&PortOperation> {
        let mut ops: Vec<_> = self
            .operations
            .values()
            .filter(|op| criteria.matches(op))
            .collect();
        ops.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        ops
    }

    /// Movement history for one container, newest first.
    pub fn movements_for(&self, container_id: &ContainerId) -> Vec<&MovementLog> {
        let mut logs: Vec<_> = self
            .movements
            .iter()
            .filter(|m| m.container_id == *container_id)
            .collect();
        logs.sort_by(|a, b| b.logged_at.cmp(&a.logged_at));
        logs
    }

    /// Full movement log, newest first.
    pub fn all_movements(&self) -> Vec<&MovementLog> {
        let mut logs: Vec<_> = self.movements.iter().collect();
        logs.sort_by(|a, b| b.logged_at.cmp(&a.logged_at));
        logs
    }

    pub fn count(&self) -> usize {
        self.operations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn op(id: &str) -> PortOperation {
        PortOperation::new(ContainerId::parse(id).unwrap())
    }

    #[test]
    fn test_add_rejects_duplicate() {
        let dir = tempdir().unwrap();
        let mut store = OperationStore::open(dir.path().to_path_buf()).unwrap();

        store.add(op("CSQU3054383")).unwrap();
        assert!(store.add(op("CSQU3054383")).is_err());
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_update_logs_status_change() {
        let dir = tempdir().unwrap();
        let mut store = OperationStore::open(dir.path().to_path_buf()).unwrap();

        let mut record = op("CSQU3054383");
        record.container_status = Some("In Yard".to_string());
        store.add(record.clone()).unwrap();

        record.container_status = Some("Departed".to_string());
        record.location_area = Some("Berth 4".to_string());
        store.update(record.clone()).unwrap();

        let logs = store.movements_for(&record.container_id);
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].old_status.as_deref(), Some("In Yard"));
        assert_eq!(logs[0].new_status.as_deref(), Some("Departed"));
        assert_eq!(logs[0].new_location.as_deref(), Some("Berth 4"));

        // No-change update appends nothing
        store.update(record.clone()).unwrap();
        assert_eq!(store.movements_for(&record.container_id).len(), 1);
    }

    #[test]
    fn test_get_is_case_insensitive() {
        let dir = tempdir().unwrap();
        let mut store = OperationStore::open(dir.path().to_path_buf()).unwrap();
        store.add(op("CSQU3054383")).unwrap();
        assert!(store.get("csqu3054383").is_some());
        assert!(store.get(" CSQU3054383 ").is_some());
    }

    #[test]
    fn test_remove_drops_movements() {
        let dir = tempdir().unwrap();
        let mut store = OperationStore::open(dir.path().to_path_buf()).unwrap();

        let mut record = op("CSQU3054383");
        record.container_status = Some("In Yard".to_string());
        store.add(record.clone()).unwrap();
        record.container_status = Some("Departed".to_string());
        store.update(record.clone()).unwrap();

        assert!(store.remove("CSQU3054383").unwrap());
        assert!(!store.remove("CSQU3054383").unwrap());
        assert!(store.all_movements().is_empty());
    }

    #[test]
    fn test_persistence_roundtrip() {
        let dir = tempdir().unwrap();
        {
            let mut store = OperationStore::open(dir.path().to_path_buf()).unwrap();
            let mut record = op("CSQU3054383");
            record.vessel_name = Some("Ever Given".to_string());
            store.add(record).unwrap();
        }
        let store = OperationStore::open(dir.path().to_path_buf()).unwrap();
        assert_eq!(store.count(), 1);
        assert_eq!(
            store.get("CSQU3054383").unwrap().vessel_name.as_deref(),
            Some("Ever Given")
        );
    }

    #[test]
    fn test_search_criteria() {
        let dir = tempdir().unwrap();
        let mut store = OperationStore::open(dir.path().to_path_buf()).unwrap();

        let mut a = op("CSQU3054383");
        a.vessel_name = Some("Ever Given".to_string());
        a.imo_number = Some(9811000);
        a.timestamp = Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
        store.add(a).unwrap();

        let mut b = op("MSCU1234566");
        b.vessel_name = Some("MSC Oscar".to_string());
        b.timestamp = Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
        store.add(b).unwrap();

        // Substring, case-insensitive
        let criteria = SearchCriteria {
            vessel_name: Some("ever".to_string()),
            ..Default::default()
        };
        assert_eq!(store.search(&criteria).len(), 1);

        // Numeric exact
        let criteria = SearchCriteria {
            imo_number: Some(9811000),
            ..Default::default()
        };
        assert_eq!(store.search(&criteria).len(), 1);
        let criteria = SearchCriteria {
            imo_number: Some(1),
            ..Default::default()
        };
        assert!(store.search(&criteria).is_empty());

        // Date window on timestamp
        let criteria = SearchCriteria {
            start_date: Some(Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        };
        let hits = store.search(&criteria);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].container_id.as_str(), "MSCU1234566");
    }
}
