//! Command handlers

use crate::cli::{Cli, Commands, OperationFields, OutputFormat, ReportKind, TableKind};
use crate::config::Config;
use crate::domain::model::{ContainerId, PortOperation, Role};
use crate::domain::service::billing;
use crate::error::{Error, Result, StoreError};
use crate::export::export_billing_to_excel;
use crate::infrastructure::csv_io;
use crate::output::{self, ContainerInvoice, ImportSummary};
use crate::report::{self, BillingPeriod};
use crate::store::{OperationStore, SearchCriteria, TariffStore, UpsertOutcome, UserStore};
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::info;

/// Execute CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let output_format = cli.format.unwrap_or(config.output_format);

    match &cli.command {
        Commands::Validate { id } => cmd_validate(output_format, id),

        Commands::Add {
            container_id,
            fields,
        } => cmd_add(&config, output_format, container_id, fields),

        Commands::Update {
            container_id,
            fields,
        } => cmd_update(&config, output_format, container_id, fields),

        Commands::Remove { container_id } => cmd_remove(&config, container_id),

        Commands::Show { container_id } => cmd_show(&config, output_format, container_id),

        Commands::List { limit } => cmd_list(&config, output_format, *limit),

        Commands::Search { .. } => cmd_search(&config, output_format, &cli.command),

        Commands::Import {
            file,
            table,
            dry_run,
        } => cmd_import(&config, output_format, file, *table, *dry_run),

        Commands::Export { table, output } => cmd_export(&config, *table, output),

        Commands::Tariff {
            set,
            rate,
            remove,
            list,
        } => cmd_tariff(
            &config,
            output_format,
            set.as_deref(),
            *rate,
            remove.as_deref(),
            *list,
        ),

        Commands::Billing {
            container_id,
            vessel,
            from,
            to,
            period,
            excel,
        } => cmd_billing(
            &config,
            output_format,
            container_id.as_deref(),
            vessel.as_deref(),
            from.as_deref(),
            to.as_deref(),
            *period,
            excel.as_deref(),
        ),

        Commands::Report { kind, top } => cmd_report(&config, output_format, *kind, *top),

        Commands::User {
            add,
            verify,
            set_password,
            set_role,
            remove,
            password,
            role,
            list,
        } => cmd_user(
            &config,
            output_format,
            add.as_deref(),
            verify.as_deref(),
            set_password.as_deref(),
            set_role.as_deref(),
            remove.as_deref(),
            password.as_deref(),
            *role,
            *list,
        ),

        Commands::Log {
            container,
            actions,
            limit,
        } => cmd_log(&config, output_format, container.as_deref(), *actions, *limit),

        Commands::Config {
            show,
            set_data_dir,
            set_output,
            reset,
        } => cmd_config(config, *show, set_data_dir.clone(), *set_output, *reset),
    }
}

fn parse_date_arg(s: &str) -> Result<DateTime<Utc>> {
    csv_io::parse_datetime(s).ok_or_else(|| Error::InvalidDate(s.to_string()))
}

/// Copy the fields given on the command line onto a record.
fn apply_fields(op: &mut PortOperation, fields: &OperationFields) -> Result<()> {
    if fields.vessel.is_some() {
        op.vessel_name = fields.vessel.clone();
    }
    if fields.imo.is_some() {
        op.imo_number = fields.imo;
    }
    if fields.arrival_port.is_some() {
        op.arrival_port = fields.arrival_port.clone();
    }
    if fields.departure_port.is_some() {
        op.departure_port = fields.departure_port.clone();
    }
    if fields.size.is_some() {
        op.container_size = fields.size;
    }
    if fields.container_type.is_some() {
        op.container_type = fields.container_type.clone();
    }
    if fields.operation.is_some() {
        op.operation_type = fields.operation.clone();
    }
    if let Some(ref s) = fields.timestamp {
        op.timestamp = Some(parse_date_arg(s)?);
    }
    if fields.terminal.is_some() {
        op.terminal_name = fields.terminal.clone();
    }
    if fields.transport_mode.is_some() {
        op.transport_mode = fields.transport_mode.clone();
    }
    if fields.status.is_some() {
        op.container_status = fields.status.clone();
    }
    if fields.location.is_some() {
        op.location_area = fields.location.clone();
    }
    if fields.equipment.is_some() {
        op.handling_equipment = fields.equipment.clone();
    }
    if fields.customs.is_some() {
        op.customs_clearance_status = fields.customs.clone();
    }
    if fields.weight.is_some() {
        op.weight_kg = fields.weight;
    }
    if let Some(flag) = fields.hazmat {
        op.hazmat_flag = flag;
    }
    if let Some(ref s) = fields.arrival {
        op.arrival_date = Some(parse_date_arg(s)?);
    }
    if let Some(ref s) = fields.departure {
        op.departure_date = Some(parse_date_arg(s)?);
    }
    Ok(())
}

fn cmd_validate(output_format: OutputFormat, id: &str) -> Result<()> {
    let outcome = ContainerId::parse(id);
    output::output_validation(output_format, id, &outcome)
}

fn cmd_add(
    config: &Config,
    output_format: OutputFormat,
    container_id: &str,
    fields: &OperationFields,
) -> Result<()> {
    let id = ContainerId::parse(container_id)?;
    let mut op = PortOperation::new(id);
    op.timestamp = Some(Utc::now());
    apply_fields(&mut op, fields)?;

    let mut store = OperationStore::open(config.store_dir()?)?;
    store.add(op.clone())?;
    info!(container_id = %op.container_id, "record added");

    output::output_operations(output_format, &[&op])
}

fn cmd_update(
    config: &Config,
    output_format: OutputFormat,
    container_id: &str,
    fields: &OperationFields,
) -> Result<()> {
    let mut store = OperationStore::open(config.store_dir()?)?;
    let mut op = store
        .get(container_id)
        .cloned()
        .ok_or_else(|| StoreError::NotFound(container_id.to_string()))?;

    apply_fields(&mut op, fields)?;
    store.update(op.clone())?;
    info!(container_id = %op.container_id, "record updated");

    output::output_operations(output_format, &[&op])
}

fn cmd_remove(config: &Config, container_id: &str) -> Result<()> {
    let mut store = OperationStore::open(config.store_dir()?)?;
    if store.remove(container_id)? {
        println!("Removed {}", container_id.trim().to_ascii_uppercase());
        Ok(())
    } else {
        Err(StoreError::NotFound(container_id.to_string()).into())
    }
}

fn cmd_show(config: &Config, output_format: OutputFormat, container_id: &str) -> Result<()> {
    let store = OperationStore::open(config.store_dir()?)?;
    let op = store
        .get(container_id)
        .ok_or_else(|| StoreError::NotFound(container_id.to_string()))?;
    let movements = store.movements_for(&op.container_id);
    output::output_operation(output_format, op, &movements)
}

fn cmd_list(config: &Config, output_format: OutputFormat, limit: usize) -> Result<()> {
    let store = OperationStore::open(config.store_dir()?)?;
    let mut ops = store.all();
    ops.truncate(limit);
    output::output_operations(output_format, &ops)
}

fn cmd_search(config: &Config, output_format: OutputFormat, command: &Commands) -> Result<()> {
    let Commands::Search {
        id,
        vessel,
        imo,
        arrival_port,
        departure_port,
        size,
        container_type,
        operation,
        terminal,
        transport_mode,
        status,
        location,
        equipment,
        customs,
        weight,
        hazmat,
        start,
        end,
    } = command
    else {
        unreachable!("cmd_search called with a non-search command");
    };

    let criteria = SearchCriteria {
        container_id: id.clone(),
        vessel_name: vessel.clone(),
        imo_number: *imo,
        arrival_port: arrival_port.clone(),
        departure_port: departure_port.clone(),
        container_size: *size,
        container_type: container_type.clone(),
        operation_type: operation.clone(),
        terminal_name: terminal.clone(),
        transport_mode: transport_mode.clone(),
        container_status: status.clone(),
        location_area: location.clone(),
        handling_equipment: equipment.clone(),
        customs_clearance_status: customs.clone(),
        weight_kg: *weight,
        hazmat_flag: *hazmat,
        start_date: start.as_deref().map(parse_date_arg).transpose()?,
        end_date: end.as_deref().map(parse_date_arg).transpose()?,
    };

    let store = OperationStore::open(config.store_dir()?)?;
    let ops = store.search(&criteria);
    output::output_operations(output_format, &ops)
}

fn cmd_import(
    config: &Config,
    output_format: OutputFormat,
    file: &Path,
    table: TableKind,
    dry_run: bool,
) -> Result<()> {
    let mut summary = ImportSummary {
        dry_run,
        ..Default::default()
    };

    match table {
        TableKind::Operations => {
            let rows = csv_io::load_operations_csv(file)?;
            let mut store = OperationStore::open(config.store_dir()?)?;

            let pb = ProgressBar::new(rows.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap()
                    .progress_chars("#>-"),
            );

            for row in rows {
                match row {
                    Ok(op) => {
                        if dry_run {
                            // Count what would happen without writing.
                            if store.get(op.container_id.as_str()).is_some() {
                                summary.updated += 1;
                            } else {
                                summary.added += 1;
                            }
                        } else {
                            match store.upsert(op)? {
                                UpsertOutcome::Added => summary.added += 1,
                                UpsertOutcome::Updated => summary.updated += 1,
                            }
                        }
                    }
                    Err(rejection) => summary.rejected.push(rejection),
                }
                pb.inc(1);
            }
            pb.finish_and_clear();
        }
        TableKind::Tariffs => {
            let rows = csv_io::load_tariffs_csv(file)?;
            let mut store = TariffStore::open(config.store_dir()?)?;
            for row in rows {
                match row {
                    Ok(tariff) => {
                        if store.rate_for(&tariff.vessel_name).is_some() {
                            summary.updated += 1;
                        } else {
                            summary.added += 1;
                        }
                        if !dry_run {
                            store.set(&tariff.vessel_name, tariff.daily_rate)?;
                        }
                    }
                    Err(rejection) => summary.rejected.push(rejection),
                }
            }
        }
        TableKind::Movements => {
            return Err(Error::UnsupportedTable("movements".to_string()));
        }
    }

    info!(
        added = summary.added,
        updated = summary.updated,
        rejected = summary.rejected.len(),
        "import finished"
    );
    output::output_import_summary(output_format, &summary)
}

fn cmd_export(config: &Config, table: TableKind, output: &Path) -> Result<()> {
    let store_dir = config.store_dir()?;
    let written = match table {
        TableKind::Operations => {
            let store = OperationStore::open(store_dir)?;
            let ops = store.all();
            csv_io::export_operations_csv(&ops, output)?;
            ops.len()
        }
        TableKind::Tariffs => {
            let store = TariffStore::open(store_dir)?;
            let tariffs = store.all();
            csv_io::export_tariffs_csv(&tariffs, output)?;
            tariffs.len()
        }
        TableKind::Movements => {
            let store = OperationStore::open(store_dir)?;
            let movements = store.all_movements();
            csv_io::export_movements_csv(&movements, output)?;
            movements.len()
        }
    };

    println!("Wrote {} row(s) to {}", written, output.display());
    Ok(())
}

fn cmd_tariff(
    config: &Config,
    output_format: OutputFormat,
    set: Option<&str>,
    rate: Option<f64>,
    remove: Option<&str>,
    list: bool,
) -> Result<()> {
    let mut store = TariffStore::open(config.store_dir()?)?;

    if list {
        return output::output_tariffs(output_format, &store.all());
    }

    if let Some(vessel) = set {
        let rate = rate.ok_or_else(|| Error::InvalidValue {
            field: "--rate".to_string(),
            value: "required with --set".to_string(),
        })?;
        store.set(vessel, rate)?;
        println!("Tariff for {}: {:.2}/day", vessel.trim(), rate);
        return Ok(());
    }

    if let Some(vessel) = remove {
        if store.remove(vessel)? {
            println!("Removed tariff for {}", vessel.trim());
            return Ok(());
        }
        return Err(StoreError::NotFound(vessel.to_string()).into());
    }

    // Bare `tariff` defaults to the list.
    output::output_tariffs(output_format, &store.all())
}

#[allow(clippy::too_many_arguments)]
fn cmd_billing(
    config: &Config,
    output_format: OutputFormat,
    container_id: Option<&str>,
    vessel: Option<&str>,
    from: Option<&str>,
    to: Option<&str>,
    period: BillingPeriod,
    excel: Option<&Path>,
) -> Result<()> {
    let store_dir = config.store_dir()?;
    let store = OperationStore::open(store_dir.clone())?;
    let tariffs = TariffStore::open(store_dir)?;

    // Single-container invoice
    if let Some(raw_id) = container_id {
        let op = store
            .get(raw_id)
            .ok_or_else(|| StoreError::NotFound(raw_id.to_string()))?;
        let rate = op.vessel_name.as_deref().and_then(|v| tariffs.rate_for(v));
        let days = match (op.arrival_date, op.departure_date) {
            (Some(arrival), Some(departure)) => billing::stay_days(arrival, departure),
            _ => None,
        };
        let cost = match (rate, days) {
            (Some(r), Some(d)) => Some(d as f64 * r),
            _ => None,
        };
        let invoice = ContainerInvoice {
            container_id: op.container_id.as_str().to_string(),
            vessel: op.vessel_name.clone(),
            daily_rate: rate,
            stay_days: days,
            cost,
        };
        return output::output_invoice(output_format, &invoice);
    }

    let ops = store.all();

    // Default the range to the arrival dates on record.
    let arrivals: Vec<DateTime<Utc>> = ops.iter().filter_map(|op| op.arrival_date).collect();
    let start = match from {
        Some(s) => parse_date_arg(s)?,
        None => match arrivals.iter().min() {
            Some(&min) => min,
            None => {
                println!("No arrival dates on record, nothing to bill.");
                return Ok(());
            }
        },
    };
    let end = match to {
        Some(s) => parse_date_arg(s)?,
        None => arrivals.iter().max().copied().unwrap_or(start),
    };
    if end < start {
        return Err(Error::InvalidDate(format!(
            "range end {} is before start {}",
            end.format("%Y-%m-%d"),
            start.format("%Y-%m-%d")
        )));
    }

    let report = report::billing_by_period(&ops, start, end, period, vessel, |name| {
        tariffs.rate_for(name)
    });

    if let Some(path) = excel {
        export_billing_to_excel(&report, path)?;
        println!("Wrote Excel report to {}", path.display());
    }

    output::output_billing_report(output_format, &report)
}

fn cmd_report(
    config: &Config,
    output_format: OutputFormat,
    kind: ReportKind,
    top: usize,
) -> Result<()> {
    let store = OperationStore::open(config.store_dir()?)?;
    let ops = store.all();

    let (title, rows) = match kind {
        ReportKind::Status => ("Containers by status", report::status_distribution(&ops)),
        ReportKind::Locations => (
            "Busiest yard locations",
            report::location_distribution(&ops, top),
        ),
        ReportKind::Monthly => ("Operations per month", report::monthly_operations(&ops)),
        ReportKind::Annual => ("Operations per year", report::annual_operations(&ops)),
        ReportKind::Ports => ("Busiest ports", report::top_ports(&ops, top)),
        ReportKind::Vessels => (
            "Vessels by operation count",
            report::vessel_operation_counts(&ops, top),
        ),
    };

    output::output_count_report(output_format, title, &rows)
}

#[allow(clippy::too_many_arguments)]
fn cmd_user(
    config: &Config,
    output_format: OutputFormat,
    add: Option<&str>,
    verify: Option<&str>,
    set_password: Option<&str>,
    set_role: Option<&str>,
    remove: Option<&str>,
    password: Option<&str>,
    role: Option<Role>,
    list: bool,
) -> Result<()> {
    let mut store = UserStore::open(config.store_dir()?)?;

    if list {
        return output::output_users(output_format, &store.all_users());
    }

    let need_password = |flag: &str| {
        password.ok_or_else(|| Error::InvalidValue {
            field: "--password".to_string(),
            value: format!("required with {}", flag),
        })
    };

    if let Some(username) = add {
        let password = need_password("--add")?;
        store.add_user(username, password, role.unwrap_or_default())?;
        println!("Added user {}", username.trim());
        return Ok(());
    }

    if let Some(username) = verify {
        let password = need_password("--verify")?;
        return match store.verify(username, password)? {
            Some(role) => {
                println!("Credentials OK ({})", role);
                Ok(())
            }
            None => Err(Error::AuthFailed(username.trim().to_string())),
        };
    }

    if let Some(username) = set_password {
        let password = need_password("--set-password")?;
        store.update_user(username, Some(password), None)?;
        println!("Password updated for {}", username.trim());
        return Ok(());
    }

    if let Some(username) = set_role {
        let role = role.ok_or_else(|| Error::InvalidValue {
            field: "--role".to_string(),
            value: "required with --set-role".to_string(),
        })?;
        store.update_user(username, None, Some(role))?;
        println!("Role updated for {}", username.trim());
        return Ok(());
    }

    if let Some(username) = remove {
        if store.remove_user(username)? {
            println!("Removed user {}", username.trim());
            return Ok(());
        }
        return Err(StoreError::NotFound(username.to_string()).into());
    }

    // Bare `user` defaults to the list.
    output::output_users(output_format, &store.all_users())
}

fn cmd_log(
    config: &Config,
    output_format: OutputFormat,
    container: Option<&str>,
    actions: bool,
    limit: usize,
) -> Result<()> {
    let store_dir = config.store_dir()?;

    if actions {
        let store = UserStore::open(store_dir)?;
        return output::output_actions(output_format, &store.actions(Some(limit)));
    }

    let store = OperationStore::open(store_dir)?;
    let movements = match container {
        Some(raw_id) => {
            let op = store
                .get(raw_id)
                .ok_or_else(|| StoreError::NotFound(raw_id.to_string()))?;
            store.movements_for(&op.container_id)
        }
        None => {
            let mut all = store.all_movements();
            all.truncate(limit);
            all
        }
    };
    output::output_movements(output_format, &movements)
}

fn cmd_config(
    mut config: Config,
    show: bool,
    set_data_dir: Option<PathBuf>,
    set_output: Option<OutputFormat>,
    reset: bool,
) -> Result<()> {
    let mut changed = false;

    if reset {
        config = Config::default();
        changed = true;
    }
    if let Some(dir) = set_data_dir {
        config.data_dir = Some(dir);
        changed = true;
    }
    if let Some(format) = set_output {
        config.output_format = format;
        changed = true;
    }

    if changed {
        config.save()?;
        println!("Configuration saved.");
    }

    if show || !changed {
        print!("{}", config);
    }

    Ok(())
}
