//! Integration tests for the port-tracker stores and pipelines

use chrono::{TimeZone, Utc};
use port_tracker::domain::model::{ContainerId, PortOperation};
use port_tracker::infrastructure::csv_io;
use port_tracker::report::{self, BillingPeriod};
use port_tracker::store::{OperationStore, SearchCriteria, TariffStore, UserStore, UpsertOutcome};
use tempfile::tempdir;

fn op(id: &str) -> PortOperation {
    PortOperation::new(ContainerId::parse(id).unwrap())
}

/// Full record lifecycle against a store that is reopened between steps,
/// the way consecutive CLI invocations see it.
#[test]
fn test_store_survives_reopen() {
    let dir = tempdir().unwrap();

    {
        let mut store = OperationStore::open(dir.path().to_path_buf()).unwrap();
        let mut record = op("CSQU3054383");
        record.vessel_name = Some("MSC Oscar".to_string());
        record.container_status = Some("In Yard".to_string());
        record.location_area = Some("A-12".to_string());
        store.add(record).unwrap();
    }

    {
        let mut store = OperationStore::open(dir.path().to_path_buf()).unwrap();
        assert_eq!(store.count(), 1);

        let mut record = store.get("csqu3054383").unwrap().clone();
        record.container_status = Some("Departed".to_string());
        store.update(record).unwrap();
    }

    let store = OperationStore::open(dir.path().to_path_buf()).unwrap();
    let record = store.get("CSQU3054383").unwrap();
    assert_eq!(record.container_status.as_deref(), Some("Departed"));

    // Status change got a movement log entry that also survived reopen
    let movements = store.movements_for(&record.container_id);
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0].old_status.as_deref(), Some("In Yard"));
    assert_eq!(movements[0].new_status.as_deref(), Some("Departed"));
}

/// CSV import into the store, then export, then re-import of the export.
#[test]
fn test_csv_import_store_export_flow() {
    let dir = tempdir().unwrap();
    let csv_path = dir.path().join("operations.csv");

    // One good row, one with a wrong check digit
    std::fs::write(
        &csv_path,
        "container_id,vessel_name,container_status,arrival_date,departure_date\n\
         CSQU3054383,MSC Oscar,In Yard,2024-03-01,2024-03-05\n\
         CSQU3054387,MSC Oscar,In Yard,2024-03-01,2024-03-05\n",
    )
    .unwrap();

    let rows = csv_io::load_operations_csv(&csv_path).unwrap();
    assert_eq!(rows.len(), 2);

    let mut store = OperationStore::open(dir.path().to_path_buf()).unwrap();
    let mut rejected = 0;
    for row in rows {
        match row {
            Ok(record) => {
                assert_eq!(store.upsert(record).unwrap(), UpsertOutcome::Added);
            }
            Err(rejection) => {
                assert!(rejection.reason.contains("check digit should be 3"));
                rejected += 1;
            }
        }
    }
    assert_eq!(store.count(), 1);
    assert_eq!(rejected, 1);

    // Re-import of the same file updates instead of duplicating
    let rows = csv_io::load_operations_csv(&csv_path).unwrap();
    for record in rows.into_iter().flatten() {
        assert_eq!(store.upsert(record).unwrap(), UpsertOutcome::Updated);
    }
    assert_eq!(store.count(), 1);

    let export_path = dir.path().join("export.csv");
    csv_io::export_operations_csv(&store.all(), &export_path).unwrap();
    let round_trip = csv_io::load_operations_csv(&export_path).unwrap();
    assert_eq!(round_trip.len(), 1);
    let record = round_trip.into_iter().next().unwrap().unwrap();
    assert_eq!(record.container_id.as_str(), "CSQU3054383");
    assert_eq!(record.vessel_name.as_deref(), Some("MSC Oscar"));
}

/// Tariffs plus operations drive a monthly billing report end to end.
#[test]
fn test_billing_end_to_end() {
    let dir = tempdir().unwrap();

    let mut tariffs = TariffStore::open(dir.path().to_path_buf()).unwrap();
    tariffs.set("MSC Oscar", 40.0).unwrap();

    let mut store = OperationStore::open(dir.path().to_path_buf()).unwrap();

    // 4-day stay in March at 40/day = 160
    let mut a = op("CSQU3054383");
    a.vessel_name = Some("MSC Oscar".to_string());
    a.arrival_date = Some(Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap());
    a.departure_date = Some(Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap());
    store.add(a).unwrap();

    // Vessel without a tariff is counted as unpriced
    let mut b = op("MSCU1234566");
    b.vessel_name = Some("Ever Given".to_string());
    b.arrival_date = Some(Utc.with_ymd_and_hms(2024, 4, 10, 8, 0, 0).unwrap());
    b.departure_date = Some(Utc.with_ymd_and_hms(2024, 4, 12, 8, 0, 0).unwrap());
    store.add(b).unwrap();

    let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2024, 4, 30, 0, 0, 0).unwrap();
    let report = report::billing_by_period(
        &store.all(),
        start,
        end,
        BillingPeriod::Monthly,
        None,
        |name| tariffs.rate_for(name),
    );

    assert_eq!(report.rows.len(), 2);
    assert_eq!(report.rows[0].period, "2024-03");
    assert!((report.rows[0].total - 160.0).abs() < f64::EPSILON);
    assert_eq!(report.rows[1].period, "2024-04");
    assert_eq!(report.rows[1].total, 0.0);
    assert!((report.grand_total - 160.0).abs() < f64::EPSILON);
    assert_eq!(report.unpriced_records, 1);
}

/// Search combines text, numeric and date-range criteria.
#[test]
fn test_search_criteria_combination() {
    let dir = tempdir().unwrap();
    let mut store = OperationStore::open(dir.path().to_path_buf()).unwrap();

    let mut a = op("CSQU3054383");
    a.vessel_name = Some("MSC Oscar".to_string());
    a.container_size = Some(40);
    a.timestamp = Some(Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap());
    store.add(a).unwrap();

    let mut b = op("MSCU1234566");
    b.vessel_name = Some("MSC Oscar".to_string());
    b.container_size = Some(20);
    b.timestamp = Some(Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap());
    store.add(b).unwrap();

    let criteria = SearchCriteria {
        vessel_name: Some("msc".to_string()),
        container_size: Some(40),
        start_date: Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()),
        end_date: Some(Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap()),
        ..Default::default()
    };
    let hits = store.search(&criteria);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].container_id.as_str(), "CSQU3054383");
}

/// Account creation, credential check and the resulting action log.
#[test]
fn test_user_accounts_and_action_log() {
    let dir = tempdir().unwrap();

    {
        let mut users = UserStore::open(dir.path().to_path_buf()).unwrap();
        users
            .add_user("alice", "s3cret", port_tracker::domain::model::Role::Admin)
            .unwrap();
        assert!(users.verify("alice", "s3cret").unwrap().is_some());
        assert!(users.verify("alice", "wrong").unwrap().is_none());
    }

    let users = UserStore::open(dir.path().to_path_buf()).unwrap();
    assert_eq!(users.count(), 1);

    let actions = users.actions(None);
    assert_eq!(actions.len(), 2);
    assert!(actions.iter().any(|a| a.action_type == "Login Success"));
    assert!(actions.iter().any(|a| a.action_type == "Login Attempt Failed"));
}
