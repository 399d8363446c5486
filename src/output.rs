//! Output formatting module

use crate::cli::OutputFormat;
use crate::domain::model::{
    ContainerId, ContainerIdError, MovementLog, PortOperation, User, UserAction, VesselTariff,
};
use crate::error::Result;
use crate::infrastructure::csv_io::RowRejection;
use crate::report::{BillingReport, CountRow};
use serde::Serialize;

/// Outcome of an `import` run.
#[derive(Debug, Default, Serialize)]
pub struct ImportSummary {
    pub added: usize,
    pub updated: usize,
    pub rejected: Vec<RowRejection>,
    pub dry_run: bool,
}

/// Cost breakdown for a single container stay.
#[derive(Debug, Serialize)]
pub struct ContainerInvoice {
    pub container_id: String,
    pub vessel: Option<String>,
    pub daily_rate: Option<f64>,
    pub stay_days: Option<i64>,
    pub cost: Option<f64>,
}

#[derive(Serialize)]
struct ValidationJson<'a> {
    input: &'a str,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    owner_code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    serial_number: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    check_digit: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn output_validation(
    output_format: OutputFormat,
    input: &str,
    outcome: &std::result::Result<ContainerId, ContainerIdError>,
) -> Result<()> {
    if output_format == OutputFormat::Json {
        let json = match outcome {
            Ok(id) => ValidationJson {
                input,
                valid: true,
                id: Some(id.as_str()),
                owner_code: Some(id.owner_code()),
                serial_number: Some(id.serial_number()),
                check_digit: Some(id.check_digit()),
                error: None,
            },
            Err(e) => ValidationJson {
                input,
                valid: false,
                id: None,
                owner_code: None,
                serial_number: None,
                check_digit: None,
                error: Some(e.to_string()),
            },
        };
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        match outcome {
            Ok(id) => {
                println!("{}: valid", id);
                println!("  Owner code:    {}", id.owner_code());
                println!("  Category:      {}", id.category_identifier());
                println!("  Serial number: {}", id.serial_number());
                println!("  Check digit:   {}", id.check_digit());
            }
            Err(e) => {
                println!("{}: invalid ({})", input.trim(), e);
            }
        }
    }

    Ok(())
}

pub fn output_operations(output_format: OutputFormat, ops: &[&PortOperation]) -> Result<()> {
    if output_format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(ops)?);
        return Ok(());
    }

    if ops.is_empty() {
        println!("No records.");
        return Ok(());
    }

    println!(
        "{:<13} {:<20} {:<14} {:<12} {:<20}",
        "Container", "Vessel", "Status", "Location", "Timestamp"
    );
    println!("{}", "-".repeat(81));
    for op in ops {
        println!(
            "{:<13} {:<20} {:<14} {:<12} {:<20}",
            op.container_id.as_str(),
            op.vessel_name.as_deref().unwrap_or("-"),
            op.container_status.as_deref().unwrap_or("-"),
            op.location_area.as_deref().unwrap_or("-"),
            op.timestamp
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string()),
        );
    }
    println!("\n{} record(s)", ops.len());

    Ok(())
}

pub fn output_operation(
    output_format: OutputFormat,
    op: &PortOperation,
    movements: &[&MovementLog],
) -> Result<()> {
    if output_format == OutputFormat::Json {
        #[derive(Serialize)]
        struct Detail<'a> {
            #[serde(flatten)]
            operation: &'a PortOperation,
            movements: &'a [&'a MovementLog],
        }
        let detail = Detail {
            operation: op,
            movements,
        };
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }

    fn line(label: &str, value: Option<&str>) {
        println!("{:<18} {}", label, value.unwrap_or("-"));
    }

    println!("Container {}", op.container_id);
    println!("{}", "=".repeat(21));
    line("Vessel:", op.vessel_name.as_deref());
    line(
        "IMO number:",
        op.imo_number.map(|n| n.to_string()).as_deref(),
    );
    line("Arrival port:", op.arrival_port.as_deref());
    line("Departure port:", op.departure_port.as_deref());
    line(
        "Size:",
        op.container_size.map(|s| format!("{} ft", s)).as_deref(),
    );
    line("Type:", op.container_type.as_deref());
    line("Operation:", op.operation_type.as_deref());
    line(
        "Timestamp:",
        op.timestamp.map(|t| t.to_rfc3339()).as_deref(),
    );
    line("Terminal:", op.terminal_name.as_deref());
    line("Transport mode:", op.transport_mode.as_deref());
    line("Status:", op.container_status.as_deref());
    line("Location:", op.location_area.as_deref());
    line("Equipment:", op.handling_equipment.as_deref());
    line("Customs:", op.customs_clearance_status.as_deref());
    line(
        "Weight:",
        op.weight_kg.map(|w| format!("{} kg", w)).as_deref(),
    );
    println!("{:<18} {}", "Hazmat:", if op.hazmat_flag { "yes" } else { "no" });
    line(
        "Arrival date:",
        op.arrival_date.map(|t| t.to_rfc3339()).as_deref(),
    );
    line(
        "Departure date:",
        op.departure_date.map(|t| t.to_rfc3339()).as_deref(),
    );

    if !movements.is_empty() {
        println!("\nMovements:");
        for m in movements {
            print_movement_line(m);
        }
    }

    Ok(())
}

fn print_movement_line(m: &MovementLog) {
    println!(
        "  {} {} status {} -> {}, location {} -> {}",
        m.logged_at.format("%Y-%m-%d %H:%M"),
        m.operation_type.as_deref().unwrap_or("-"),
        m.old_status.as_deref().unwrap_or("-"),
        m.new_status.as_deref().unwrap_or("-"),
        m.old_location.as_deref().unwrap_or("-"),
        m.new_location.as_deref().unwrap_or("-"),
    );
}

pub fn output_movements(output_format: OutputFormat, movements: &[&MovementLog]) -> Result<()> {
    if output_format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(movements)?);
        return Ok(());
    }

    if movements.is_empty() {
        println!("No movements.");
        return Ok(());
    }

    for m in movements {
        println!(
            "{} {} {} status {} -> {}, location {} -> {}",
            m.logged_at.format("%Y-%m-%d %H:%M"),
            m.container_id,
            m.operation_type.as_deref().unwrap_or("-"),
            m.old_status.as_deref().unwrap_or("-"),
            m.new_status.as_deref().unwrap_or("-"),
            m.old_location.as_deref().unwrap_or("-"),
            m.new_location.as_deref().unwrap_or("-"),
        );
    }

    Ok(())
}

pub fn output_count_report(
    output_format: OutputFormat,
    title: &str,
    rows: &[CountRow],
) -> Result<()> {
    if output_format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(rows)?);
        return Ok(());
    }

    println!("{}", title);
    println!("{}", "=".repeat(title.len()));
    if rows.is_empty() {
        println!("(no data)");
        return Ok(());
    }

    let width = rows.iter().map(|r| r.label.len()).max().unwrap_or(0).max(8);
    for row in rows {
        println!("{:<w$}  {}", row.label, row.count, w = width);
    }

    Ok(())
}

pub fn output_billing_report(output_format: OutputFormat, report: &BillingReport) -> Result<()> {
    if output_format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("Billing Report");
    println!("==============");
    println!("From:   {}", report.start.format("%Y-%m-%d"));
    println!("To:     {}", report.end.format("%Y-%m-%d"));
    println!("Vessel: {}", report.vessel.as_deref().unwrap_or("(all)"));
    println!();

    for row in &report.rows {
        println!("{:<12} {:>12.2}", row.period, row.total);
    }
    println!("{}", "-".repeat(25));
    println!("{:<12} {:>12.2}", "Total", report.grand_total);

    if report.unpriced_records > 0 {
        println!(
            "\n{} record(s) had no tariff for their vessel and were not priced.",
            report.unpriced_records
        );
    }

    Ok(())
}

pub fn output_invoice(output_format: OutputFormat, invoice: &ContainerInvoice) -> Result<()> {
    if output_format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(invoice)?);
        return Ok(());
    }

    println!("Container: {}", invoice.container_id);
    println!(
        "Vessel:    {}",
        invoice.vessel.as_deref().unwrap_or("(unknown)")
    );
    match (invoice.daily_rate, invoice.stay_days, invoice.cost) {
        (Some(rate), Some(days), Some(cost)) => {
            println!("Rate:      {:.2}/day", rate);
            println!("Stay:      {} day(s)", days);
            println!("Cost:      {:.2}", cost);
        }
        (None, _, _) => println!("No tariff on record for this vessel."),
        _ => println!("Arrival/departure window incomplete, cannot price the stay."),
    }

    Ok(())
}

pub fn output_tariffs(output_format: OutputFormat, tariffs: &[&VesselTariff]) -> Result<()> {
    if output_format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(tariffs)?);
        return Ok(());
    }

    if tariffs.is_empty() {
        println!("No tariffs.");
        return Ok(());
    }

    let width = tariffs
        .iter()
        .map(|t| t.vessel_name.len())
        .max()
        .unwrap_or(0)
        .max(6);
    println!("{:<w$}  {:>10}", "Vessel", "Rate/day", w = width);
    for tariff in tariffs {
        println!(
            "{:<w$}  {:>10.2}",
            tariff.vessel_name,
            tariff.daily_rate,
            w = width
        );
    }

    Ok(())
}

pub fn output_users(output_format: OutputFormat, users: &[&User]) -> Result<()> {
    // Hashes stay out of the output in both formats.
    #[derive(Serialize)]
    struct UserSummary<'a> {
        username: &'a str,
        role: crate::domain::model::Role,
    }

    let summaries: Vec<UserSummary> = users
        .iter()
        .map(|u| UserSummary {
            username: &u.username,
            role: u.role,
        })
        .collect();

    if output_format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    if summaries.is_empty() {
        println!("No users.");
        return Ok(());
    }

    for s in summaries {
        println!("{:<20} {}", s.username, s.role);
    }

    Ok(())
}

pub fn output_actions(output_format: OutputFormat, actions: &[&UserAction]) -> Result<()> {
    if output_format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(actions)?);
        return Ok(());
    }

    if actions.is_empty() {
        println!("No actions logged.");
        return Ok(());
    }

    for a in actions {
        println!(
            "{} {:<16} {:<20} {}",
            a.action_time.format("%Y-%m-%d %H:%M"),
            a.username,
            a.action_type,
            a.description,
        );
    }

    Ok(())
}

pub fn output_import_summary(output_format: OutputFormat, summary: &ImportSummary) -> Result<()> {
    if output_format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    if summary.dry_run {
        println!("Dry run, nothing written.");
    }
    println!("Added:    {}", summary.added);
    println!("Updated:  {}", summary.updated);
    println!("Rejected: {}", summary.rejected.len());
    for rejection in &summary.rejected {
        println!("  row {}: {}", rejection.row, rejection.reason);
    }

    Ok(())
}
