//! Operational and billing reports
//!
//! Pure aggregations over port operation records. Rendering (table, JSON,
//! Excel) is left to the caller; nothing here touches a store or a terminal.

use crate::domain::model::PortOperation;
use crate::domain::service::billing;
use chrono::{DateTime, Datelike, Duration, Utc};
use clap::ValueEnum;
use serde::Serialize;
use std::collections::HashMap;

/// One labelled count in a distribution report.
#[derive(Debug, Clone, Serialize)]
pub struct CountRow {
    pub label: String,
    pub count: usize,
}

/// Grouping granularity for billing reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingPeriod {
    Daily,
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl std::fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BillingPeriod::Daily => write!(f, "daily"),
            BillingPeriod::Weekly => write!(f, "weekly"),
            BillingPeriod::Monthly => write!(f, "monthly"),
            BillingPeriod::Yearly => write!(f, "yearly"),
        }
    }
}

impl BillingPeriod {
    fn label(&self, date: DateTime<Utc>) -> String {
        match self {
            BillingPeriod::Daily => date.format("%Y-%m-%d").to_string(),
            BillingPeriod::Weekly => {
                let week = date.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
            BillingPeriod::Monthly => date.format("%Y-%m").to_string(),
            BillingPeriod::Yearly => date.format("%Y").to_string(),
        }
    }
}

/// Billing total for one period bucket.
#[derive(Debug, Clone, Serialize)]
pub struct BillingRow {
    pub period: String,
    pub total: f64,
}

/// A billing report over a date range.
#[derive(Debug, Clone, Serialize)]
pub struct BillingReport {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub vessel: Option<String>,
    pub rows: Vec<BillingRow>,
    pub grand_total: f64,
    /// Records inside the range whose vessel has no registered tariff
    pub unpriced_records: usize,
}

fn count_values<'a, I: Iterator<Item = &'a str>>(values: I) -> Vec<CountRow> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for v in values {
        *counts.entry(v).or_insert(0) += 1;
    }
    let mut rows: Vec<CountRow> = counts
        .into_iter()
        .map(|(label, count)| CountRow {
            label: label.to_string(),
            count,
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then(a.label.cmp(&b.label)));
    rows
}

/// Container counts per status.
pub fn status_distribution(ops: &[&PortOperation]) -> Vec<CountRow> {
    count_values(ops.iter().filter_map(|op| op.container_status.as_deref()))
}

/// Busiest yard locations, most populated first.
pub fn location_distribution(ops: &[&PortOperation], top: usize) -> Vec<CountRow> {
    let mut rows = count_values(ops.iter().filter_map(|op| op.location_area.as_deref()));
    rows.truncate(top);
    rows
}

/// Operation counts per calendar month, oldest first.
pub fn monthly_operations(ops: &[&PortOperation]) -> Vec<CountRow> {
    let mut rows = count_values_by_label(
        ops.iter()
            .filter_map(|op| op.timestamp)
            .map(|ts| ts.format("%Y-%m").to_string()),
    );
    rows.sort_by(|a, b| a.label.cmp(&b.label));
    rows
}

/// Operation counts per year, oldest first.
pub fn annual_operations(ops: &[&PortOperation]) -> Vec<CountRow> {
    let mut rows = count_values_by_label(
        ops.iter()
            .filter_map(|op| op.timestamp)
            .map(|ts| ts.format("%Y").to_string()),
    );
    rows.sort_by(|a, b| a.label.cmp(&b.label));
    rows
}

fn count_values_by_label<I: Iterator<Item = String>>(labels: I) -> Vec<CountRow> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(label, count)| CountRow { label, count })
        .collect()
}

/// Busiest ports, arrival and departure mentions combined.
pub fn top_ports(ops: &[&PortOperation], top: usize) -> Vec<CountRow> {
    let mut rows = count_values(
        ops.iter()
            .filter_map(|op| op.arrival_port.as_deref())
            .chain(ops.iter().filter_map(|op| op.departure_port.as_deref())),
    );
    rows.truncate(top);
    rows
}

/// Vessels with the most operations.
pub fn vessel_operation_counts(ops: &[&PortOperation], top: usize) -> Vec<CountRow> {
    let mut rows = count_values(ops.iter().filter_map(|op| op.vessel_name.as_deref()));
    rows.truncate(top);
    rows
}

/// Billing totals grouped by period over `[start, end]`, filtered on arrival
/// date and optionally on vessel name (case-insensitive exact match).
///
/// Every period bucket inside the range appears in the output, including
/// empty ones at 0, so gaps in activity stay visible.
pub fn billing_by_period<F>(
    ops: &[&PortOperation],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    period: BillingPeriod,
    vessel: Option<&str>,
    rate_for: F,
) -> BillingReport
where
    F: Fn(&str) -> Option<f64>,
{
    let vessel_lower = vessel.map(str::to_lowercase);

    let mut totals: HashMap<String, f64> = HashMap::new();
    let mut unpriced = 0usize;

    for op in ops {
        let Some(arrival) = op.arrival_date else { continue };
        if arrival < start || arrival > end {
            continue;
        }
        let Some(ref name) = op.vessel_name else { continue };
        if let Some(ref wanted) = vessel_lower {
            if name.to_lowercase() != *wanted {
                continue;
            }
        }
        match rate_for(name) {
            Some(rate) => {
                *totals.entry(period.label(arrival)).or_insert(0.0) +=
                    billing::container_cost(op, rate);
            }
            None => unpriced += 1,
        }
    }

    // Walk the range a day at a time to enumerate buckets in order,
    // including empty ones.
    let mut rows = Vec::new();
    let mut seen = std::collections::HashSet::new();
    let mut cursor = start;
    while cursor <= end {
        let label = period.label(cursor);
        if seen.insert(label.clone()) {
            let total = totals.get(&label).copied().unwrap_or(0.0);
            rows.push(BillingRow { period: label, total });
        }
        cursor += Duration::days(1);
    }

    let grand_total = rows.iter().map(|r| r.total).sum();
    BillingReport {
        start,
        end,
        vessel: vessel.map(str::to_string),
        rows,
        grand_total,
        unpriced_records: unpriced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ContainerId;
    use chrono::TimeZone;

    fn ts(y: i32, mo: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, 12, 0, 0).unwrap()
    }

    fn op(id: &str, vessel: &str, status: &str) -> PortOperation {
        let mut op = PortOperation::new(ContainerId::parse(id).unwrap());
        op.vessel_name = Some(vessel.to_string());
        op.container_status = Some(status.to_string());
        op
    }

    #[test]
    fn test_status_distribution_sorted_by_count() {
        let a = op("CSQU3054383", "Ever Given", "In Yard");
        let b = op("MSCU1234566", "Ever Given", "In Yard");
        let c = op("AAAA5000000", "MSC Oscar", "Departed");
        let ops: Vec<&PortOperation> = vec![&a, &b, &c];

        let rows = status_distribution(&ops);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].label, "In Yard");
        assert_eq!(rows[0].count, 2);
        assert_eq!(rows[1].label, "Departed");
    }

    #[test]
    fn test_top_ports_combines_arrivals_and_departures() {
        let mut a = op("CSQU3054383", "Ever Given", "In Yard");
        a.arrival_port = Some("Mersin".to_string());
        a.departure_port = Some("Rotterdam".to_string());
        let mut b = op("MSCU1234566", "Ever Given", "In Yard");
        b.arrival_port = Some("Rotterdam".to_string());
        let ops: Vec<&PortOperation> = vec![&a, &b];

        let rows = top_ports(&ops, 10);
        assert_eq!(rows[0].label, "Rotterdam");
        assert_eq!(rows[0].count, 2);
    }

    #[test]
    fn test_monthly_operations_in_order() {
        let mut a = op("CSQU3054383", "Ever Given", "In Yard");
        a.timestamp = Some(ts(2024, 3, 1));
        let mut b = op("MSCU1234566", "Ever Given", "In Yard");
        b.timestamp = Some(ts(2024, 1, 15));
        let ops: Vec<&PortOperation> = vec![&a, &b];

        let rows = monthly_operations(&ops);
        assert_eq!(rows[0].label, "2024-01");
        assert_eq!(rows[1].label, "2024-03");
    }

    #[test]
    fn test_billing_by_period_with_gaps() {
        let mut a = op("CSQU3054383", "Ever Given", "Departed");
        a.arrival_date = Some(ts(2024, 1, 10));
        a.departure_date = Some(ts(2024, 1, 15)); // 5 days
        let mut b = op("MSCU1234566", "Ever Given", "Departed");
        b.arrival_date = Some(ts(2024, 3, 2));
        b.departure_date = Some(ts(2024, 3, 4)); // 2 days
        let ops: Vec<&PortOperation> = vec![&a, &b];

        let report = billing_by_period(
            &ops,
            ts(2024, 1, 1),
            ts(2024, 3, 31),
            BillingPeriod::Monthly,
            None,
            |_| Some(100.0),
        );

        let labels: Vec<_> = report.rows.iter().map(|r| r.period.as_str()).collect();
        assert_eq!(labels, vec!["2024-01", "2024-02", "2024-03"]);
        assert!((report.rows[0].total - 500.0).abs() < 1e-9);
        assert_eq!(report.rows[1].total, 0.0); // gap month present at zero
        assert!((report.rows[2].total - 200.0).abs() < 1e-9);
        assert!((report.grand_total - 700.0).abs() < 1e-9);
        assert_eq!(report.unpriced_records, 0);
    }

    #[test]
    fn test_billing_vessel_filter_and_unpriced() {
        let mut a = op("CSQU3054383", "Ever Given", "Departed");
        a.arrival_date = Some(ts(2024, 1, 10));
        a.departure_date = Some(ts(2024, 1, 11));
        let mut b = op("MSCU1234566", "MSC Oscar", "Departed");
        b.arrival_date = Some(ts(2024, 1, 12));
        b.departure_date = Some(ts(2024, 1, 14));
        let ops: Vec<&PortOperation> = vec![&a, &b];

        // Only Ever Given, which has no tariff: everything is unpriced
        let report = billing_by_period(
            &ops,
            ts(2024, 1, 1),
            ts(2024, 1, 31),
            BillingPeriod::Daily,
            Some("ever given"),
            |name| (name == "MSC Oscar").then_some(80.0),
        );
        assert_eq!(report.grand_total, 0.0);
        assert_eq!(report.unpriced_records, 1);

        // No filter: MSC Oscar bills 2 days at 80
        let report = billing_by_period(
            &ops,
            ts(2024, 1, 1),
            ts(2024, 1, 31),
            BillingPeriod::Yearly,
            None,
            |name| (name == "MSC Oscar").then_some(80.0),
        );
        assert!((report.grand_total - 160.0).abs() < 1e-9);
    }
}
