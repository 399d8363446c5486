//! CSV import/export for operations and tariffs
//!
//! Import tolerates files written with a UTF-8 BOM (the previous tooling
//! wrote utf-8-sig) and pandas-style numeric artifacts like `9811000.0` in
//! integer columns. Rows are parsed individually so one bad row rejects that
//! row, not the file.

use crate::domain::model::{ContainerId, MovementLog, PortOperation, VesselTariff};
use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// A row that could not be turned into a record.
#[derive(Debug, Clone, Serialize)]
pub struct RowRejection {
    /// 1-based data row number (header is row 1)
    pub row: usize,
    pub reason: String,
}

/// Parse outcome for one CSV data row.
pub type ParsedRow<T> = std::result::Result<T, RowRejection>;

/// Parse a date/time string in any of the formats the terminal's exports
/// have used over time.
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
        }
    }
    None
}

fn decode_utf8_with_bom(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    // Strips a UTF-8 BOM if present; invalid sequences become U+FFFD
    let (decoded, _, _) = encoding_rs::UTF_8.decode(&bytes);
    Ok(decoded.into_owned())
}

fn header_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name))
}

fn field<'r>(record: &'r csv::StringRecord, idx: Option<usize>) -> Option<&'r str> {
    idx.and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn opt_string(record: &csv::StringRecord, idx: Option<usize>) -> Option<String> {
    field(record, idx).map(str::to_string)
}

/// Integer columns may carry pandas float artifacts ("40.0").
fn opt_u32(record: &csv::StringRecord, idx: Option<usize>) -> ParsedRowValue<Option<u32>> {
    match field(record, idx) {
        None => Ok(None),
        Some(s) => {
            let value: f64 = s
                .replace(',', "")
                .parse()
                .map_err(|_| format!("not a number: {}", s))?;
            if !value.is_finite() || value < 0.0 {
                return Err(format!("not a valid count: {}", s));
            }
            Ok(Some(value as u32))
        }
    }
}

fn opt_datetime(record: &csv::StringRecord, idx: Option<usize>) -> ParsedRowValue<Option<DateTime<Utc>>> {
    match field(record, idx) {
        None => Ok(None),
        Some(s) => parse_datetime(s)
            .map(Some)
            .ok_or_else(|| format!("unrecognized date: {}", s)),
    }
}

fn parse_bool(s: &str) -> bool {
    matches!(s.trim().to_lowercase().as_str(), "1" | "true" | "yes")
}

type ParsedRowValue<T> = std::result::Result<T, String>;

const OPERATION_COLUMNS: [&str; 19] = [
    "vessel_name",
    "imo_number",
    "arrival_port",
    "departure_port",
    "container_id",
    "container_size",
    "container_type",
    "operation_type",
    "timestamp",
    "terminal_name",
    "transport_mode",
    "container_status",
    "location_area",
    "handling_equipment",
    "customs_clearance_status",
    "weight_kg",
    "hazmat_flag",
    "arrival_date",
    "departure_date",
];

/// Load port operation rows from a CSV file.
///
/// The header must contain a `container_id` column; every other column is
/// optional. Each returned element is either a record or a per-row rejection
/// (bad identifier, unparseable number or date).
pub fn load_operations_csv(path: &Path) -> Result<Vec<ParsedRow<PortOperation>>> {
    let content = decode_utf8_with_bom(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let id_idx = header_index(&headers, "container_id")
        .ok_or_else(|| Error::InvalidValue {
            field: "header".to_string(),
            value: "missing container_id column".to_string(),
        })?;
    let idx: Vec<Option<usize>> = OPERATION_COLUMNS
        .iter()
        .map(|name| header_index(&headers, name))
        .collect();

    let mut rows = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let row_num = row_idx + 2; // header is row 1
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                rows.push(Err(RowRejection {
                    row: row_num,
                    reason: e.to_string(),
                }));
                continue;
            }
        };
        rows.push(parse_operation_record(&record, &idx, id_idx, row_num));
    }
    Ok(rows)
}

fn parse_operation_record(
    record: &csv::StringRecord,
    idx: &[Option<usize>],
    id_idx: usize,
    row_num: usize,
) -> ParsedRow<PortOperation> {
    let reject = |reason: String| RowRejection {
        row: row_num,
        reason,
    };

    let raw_id = record.get(id_idx).unwrap_or("").trim();
    let container_id = ContainerId::parse(raw_id).map_err(|e| reject(e.to_string()))?;

    let mut op = PortOperation::new(container_id);
    op.vessel_name = opt_string(record, idx[0]);
    op.imo_number = opt_u32(record, idx[1]).map_err(&reject)?;
    op.arrival_port = opt_string(record, idx[2]);
    op.departure_port = opt_string(record, idx[3]);
    op.container_size = opt_u32(record, idx[5]).map_err(&reject)?;
    op.container_type = opt_string(record, idx[6]);
    op.operation_type = opt_string(record, idx[7]);
    op.timestamp = opt_datetime(record, idx[8]).map_err(&reject)?;
    op.terminal_name = opt_string(record, idx[9]);
    op.transport_mode = opt_string(record, idx[10]);
    op.container_status = opt_string(record, idx[11]);
    op.location_area = opt_string(record, idx[12]);
    op.handling_equipment = opt_string(record, idx[13]);
    op.customs_clearance_status = opt_string(record, idx[14]);
    op.weight_kg = opt_u32(record, idx[15]).map_err(&reject)?;
    op.hazmat_flag = field(record, idx[16]).map(parse_bool).unwrap_or(false);
    op.arrival_date = opt_datetime(record, idx[17]).map_err(&reject)?;
    op.departure_date = opt_datetime(record, idx[18]).map_err(&reject)?;
    Ok(op)
}

/// Load vessel tariff rows (`vessel_name,daily_rate`) from a CSV file.
pub fn load_tariffs_csv(path: &Path) -> Result<Vec<ParsedRow<VesselTariff>>> {
    let content = decode_utf8_with_bom(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let name_idx = header_index(&headers, "vessel_name");
    let rate_idx = header_index(&headers, "daily_rate");
    let (name_idx, rate_idx) = match (name_idx, rate_idx) {
        (Some(n), Some(r)) => (n, r),
        _ => {
            return Err(Error::InvalidValue {
                field: "header".to_string(),
                value: "expected vessel_name and daily_rate columns".to_string(),
            })
        }
    };

    let mut rows = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let row_num = row_idx + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                rows.push(Err(RowRejection {
                    row: row_num,
                    reason: e.to_string(),
                }));
                continue;
            }
        };

        let vessel_name = record.get(name_idx).unwrap_or("").trim().to_string();
        if vessel_name.is_empty() {
            rows.push(Err(RowRejection {
                row: row_num,
                reason: "empty vessel name".to_string(),
            }));
            continue;
        }
        let rate_str = record.get(rate_idx).unwrap_or("").trim();
        match rate_str.replace(',', "").parse::<f64>() {
            Ok(daily_rate) if daily_rate >= 0.0 => rows.push(Ok(VesselTariff {
                vessel_name,
                daily_rate,
            })),
            _ => rows.push(Err(RowRejection {
                row: row_num,
                reason: format!("invalid daily rate: {}", rate_str),
            })),
        }
    }
    Ok(rows)
}

fn fmt_opt_u32(v: Option<u32>) -> String {
    v.map(|n| n.to_string()).unwrap_or_default()
}

fn fmt_opt_dt(v: Option<DateTime<Utc>>) -> String {
    v.map(|d| d.to_rfc3339()).unwrap_or_default()
}

/// Export operation records to CSV with the canonical column set.
pub fn export_operations_csv(ops: &[&PortOperation], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(OPERATION_COLUMNS)?;
    for op in ops {
        writer.write_record([
            op.vessel_name.clone().unwrap_or_default(),
            fmt_opt_u32(op.imo_number),
            op.arrival_port.clone().unwrap_or_default(),
            op.departure_port.clone().unwrap_or_default(),
            op.container_id.as_str().to_string(),
            fmt_opt_u32(op.container_size),
            op.container_type.clone().unwrap_or_default(),
            op.operation_type.clone().unwrap_or_default(),
            fmt_opt_dt(op.timestamp),
            op.terminal_name.clone().unwrap_or_default(),
            op.transport_mode.clone().unwrap_or_default(),
            op.container_status.clone().unwrap_or_default(),
            op.location_area.clone().unwrap_or_default(),
            op.handling_equipment.clone().unwrap_or_default(),
            op.customs_clearance_status.clone().unwrap_or_default(),
            fmt_opt_u32(op.weight_kg),
            op.hazmat_flag.to_string(),
            fmt_opt_dt(op.arrival_date),
            fmt_opt_dt(op.departure_date),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Export vessel tariffs to CSV.
pub fn export_tariffs_csv(tariffs: &[&VesselTariff], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["vessel_name", "daily_rate"])?;
    for tariff in tariffs {
        writer.write_record([tariff.vessel_name.clone(), tariff.daily_rate.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Export the movement log to CSV.
pub fn export_movements_csv(movements: &[&MovementLog], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "container_id",
        "operation_type",
        "old_status",
        "new_status",
        "old_location",
        "new_location",
        "logged_at",
    ])?;
    for log in movements {
        writer.write_record([
            log.container_id.as_str().to_string(),
            log.operation_type.clone().unwrap_or_default(),
            log.old_status.clone().unwrap_or_default(),
            log.new_status.clone().unwrap_or_default(),
            log.old_location.clone().unwrap_or_default(),
            log.new_location.clone().unwrap_or_default(),
            log.logged_at.to_rfc3339(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_parse_datetime_formats() {
        assert!(parse_datetime("2024-03-01T08:30:00+00:00").is_some());
        assert!(parse_datetime("2024-03-01 08:30:00").is_some());
        assert!(parse_datetime("2024-03-01").is_some());
        assert!(parse_datetime("2024/03/01").is_some());
        assert!(parse_datetime("").is_none());
        assert!(parse_datetime("yesterday").is_none());
    }

    #[test]
    fn test_import_skips_bom_and_rejects_bad_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ops.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        // utf-8-sig style BOM, one good row, one bad check digit, one float imo
        file.write_all(b"\xEF\xBB\xBFcontainer_id,vessel_name,imo_number,hazmat_flag\n").unwrap();
        file.write_all(b"CSQU3054383,Ever Given,9811000.0,1\n").unwrap();
        file.write_all(b"CSQU3054380,Ever Given,,\n").unwrap();
        drop(file);

        let rows = load_operations_csv(&path).unwrap();
        assert_eq!(rows.len(), 2);

        let op = rows[0].as_ref().unwrap();
        assert_eq!(op.container_id.as_str(), "CSQU3054383");
        assert_eq!(op.imo_number, Some(9811000));
        assert!(op.hazmat_flag);

        let rejection = rows[1].as_ref().unwrap_err();
        assert_eq!(rejection.row, 3);
        assert!(rejection.reason.contains("check digit should be 3"));
    }

    #[test]
    fn test_import_requires_container_id_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ops.csv");
        std::fs::write(&path, "vessel_name\nEver Given\n").unwrap();
        assert!(load_operations_csv(&path).is_err());
    }

    #[test]
    fn test_operations_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ops.csv");

        let mut op = PortOperation::new(ContainerId::parse("CSQU3054383").unwrap());
        op.vessel_name = Some("Ever Given".to_string());
        op.container_size = Some(40);
        op.hazmat_flag = true;
        op.arrival_date = parse_datetime("2024-03-01 08:00:00");

        export_operations_csv(&[&op], &path).unwrap();
        let rows = load_operations_csv(&path).unwrap();
        assert_eq!(rows.len(), 1);
        let back = rows[0].as_ref().unwrap();
        assert_eq!(back.container_id, op.container_id);
        assert_eq!(back.vessel_name, op.vessel_name);
        assert_eq!(back.container_size, Some(40));
        assert!(back.hazmat_flag);
        assert_eq!(back.arrival_date, op.arrival_date);
    }

    #[test]
    fn test_tariffs_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tariffs.csv");
        std::fs::write(
            &path,
            "vessel_name,daily_rate\nEver Given,120.5\n,50\nMSC Oscar,abc\n",
        )
        .unwrap();

        let rows = load_tariffs_csv(&path).unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].is_ok());
        assert!(rows[1].is_err());
        assert!(rows[2].is_err());
        let tariff = rows[0].as_ref().unwrap();
        assert_eq!(tariff.vessel_name, "Ever Given");
        assert!((tariff.daily_rate - 120.5).abs() < 1e-9);
    }
}
