//! CLI definition using clap

use crate::domain::model::Role;
use crate::report::BillingPeriod;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Output format for results
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Store table addressed by import/export
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TableKind {
    Operations,
    Tariffs,
    Movements,
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableKind::Operations => write!(f, "operations"),
            TableKind::Tariffs => write!(f, "tariffs"),
            TableKind::Movements => write!(f, "movements"),
        }
    }
}

/// Aggregation produced by the `report` command
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportKind {
    /// Container counts per status
    Status,
    /// Busiest yard locations
    Locations,
    /// Operation counts per month
    Monthly,
    /// Operation counts per year
    Annual,
    /// Busiest ports (arrivals + departures)
    Ports,
    /// Vessels with the most operations
    Vessels,
}

/// Record fields shared by `add` and `update`
#[derive(Args, Debug, Default)]
pub struct OperationFields {
    /// Vessel name
    #[arg(long)]
    pub vessel: Option<String>,

    /// IMO number of the vessel
    #[arg(long)]
    pub imo: Option<u32>,

    #[arg(long)]
    pub arrival_port: Option<String>,

    #[arg(long)]
    pub departure_port: Option<String>,

    /// Container length in feet (20/40/45)
    #[arg(long)]
    pub size: Option<u32>,

    /// Container type (e.g. DRY, REEFER, TANK)
    #[arg(long = "type")]
    pub container_type: Option<String>,

    /// Operation type (load, discharge, transshipment...)
    #[arg(long)]
    pub operation: Option<String>,

    /// Record timestamp (RFC 3339 or YYYY-MM-DD)
    #[arg(long)]
    pub timestamp: Option<String>,

    #[arg(long)]
    pub terminal: Option<String>,

    /// Onward transport mode (truck, rail, barge...)
    #[arg(long)]
    pub transport_mode: Option<String>,

    /// Container status (e.g. "In Yard", "Departed")
    #[arg(long)]
    pub status: Option<String>,

    /// Yard location area
    #[arg(long)]
    pub location: Option<String>,

    /// Handling equipment used
    #[arg(long)]
    pub equipment: Option<String>,

    /// Customs clearance status
    #[arg(long)]
    pub customs: Option<String>,

    /// Gross weight in kilograms
    #[arg(long)]
    pub weight: Option<u32>,

    /// Hazardous cargo flag
    #[arg(long)]
    pub hazmat: Option<bool>,

    /// Terminal arrival date
    #[arg(long)]
    pub arrival: Option<String>,

    /// Terminal departure date
    #[arg(long)]
    pub departure: Option<String>,
}

#[derive(Parser)]
#[command(name = "port-tracker")]
#[command(version)]
#[command(about = "Track shipping-container movements through a port terminal")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (json, table). Uses config value if not specified.
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a container identifier (ISO 6346 format and check digit)
    Validate {
        /// Candidate identifier, e.g. CSQU3054383
        id: String,
    },

    /// Add a port operation record
    Add {
        /// Container identifier (validated before the record is stored)
        container_id: String,

        #[command(flatten)]
        fields: OperationFields,
    },

    /// Update an existing record (only the given fields change)
    Update {
        container_id: String,

        #[command(flatten)]
        fields: OperationFields,
    },

    /// Remove a record and its movement history
    Remove { container_id: String },

    /// Show one record with its movement history
    Show { container_id: String },

    /// List records, newest first
    List {
        /// Limit number of entries shown
        #[arg(long, short = 'n', default_value = "20")]
        limit: usize,
    },

    /// Search records by field values and date range
    Search {
        /// Substring of the container identifier
        #[arg(long)]
        id: Option<String>,

        #[arg(long)]
        vessel: Option<String>,

        #[arg(long)]
        imo: Option<u32>,

        #[arg(long)]
        arrival_port: Option<String>,

        #[arg(long)]
        departure_port: Option<String>,

        #[arg(long)]
        size: Option<u32>,

        #[arg(long = "type")]
        container_type: Option<String>,

        #[arg(long)]
        operation: Option<String>,

        #[arg(long)]
        terminal: Option<String>,

        #[arg(long)]
        transport_mode: Option<String>,

        #[arg(long)]
        status: Option<String>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        equipment: Option<String>,

        #[arg(long)]
        customs: Option<String>,

        #[arg(long)]
        weight: Option<u32>,

        #[arg(long)]
        hazmat: Option<bool>,

        /// Earliest record timestamp (inclusive)
        #[arg(long)]
        start: Option<String>,

        /// Latest record timestamp (inclusive)
        #[arg(long)]
        end: Option<String>,
    },

    /// Import records from a CSV file
    Import {
        /// Path to CSV file
        file: PathBuf,

        /// Which table the file feeds
        #[arg(long, value_enum, default_value_t = TableKind::Operations)]
        table: TableKind,

        /// Parse and report only, change nothing
        #[arg(long)]
        dry_run: bool,
    },

    /// Export a table to a CSV file
    Export {
        /// Which table to export
        #[arg(long, value_enum, default_value_t = TableKind::Operations)]
        table: TableKind,

        /// Output file path
        #[arg(long, short = 'o')]
        output: PathBuf,
    },

    /// Manage per-vessel daily tariffs
    Tariff {
        /// Set the rate for this vessel (requires --rate)
        #[arg(long)]
        set: Option<String>,

        /// Daily rate used with --set
        #[arg(long)]
        rate: Option<f64>,

        /// Remove the tariff for this vessel
        #[arg(long)]
        remove: Option<String>,

        /// List all tariffs
        #[arg(long)]
        list: bool,
    },

    /// Billing: per-container cost or a period report
    Billing {
        /// Bill a single container by identifier
        container_id: Option<String>,

        /// Restrict the period report to one vessel
        #[arg(long)]
        vessel: Option<String>,

        /// Range start (defaults to earliest arrival on record)
        #[arg(long)]
        from: Option<String>,

        /// Range end (defaults to latest arrival on record)
        #[arg(long)]
        to: Option<String>,

        /// Grouping granularity
        #[arg(long, value_enum, default_value_t = BillingPeriod::Monthly)]
        period: BillingPeriod,

        /// Also write the report to an Excel workbook
        #[arg(long)]
        excel: Option<PathBuf>,
    },

    /// Operational reports
    Report {
        #[arg(value_enum)]
        kind: ReportKind,

        /// Number of rows for top-N reports
        #[arg(long, default_value = "10")]
        top: usize,
    },

    /// Manage operator accounts
    User {
        /// Add a user with this name (requires --password)
        #[arg(long)]
        add: Option<String>,

        /// Check credentials for this user (requires --password)
        #[arg(long)]
        verify: Option<String>,

        /// Update the password of this user (requires --password)
        #[arg(long)]
        set_password: Option<String>,

        /// Update the role of this user (requires --role)
        #[arg(long)]
        set_role: Option<String>,

        /// Remove this user
        #[arg(long)]
        remove: Option<String>,

        /// Password for --add / --verify / --set-password
        #[arg(long)]
        password: Option<String>,

        /// Role for --add / --set-role
        #[arg(long, value_enum)]
        role: Option<Role>,

        /// List all users
        #[arg(long)]
        list: bool,
    },

    /// Show movement history or the user action log
    Log {
        /// Movement history for one container
        #[arg(long)]
        container: Option<String>,

        /// Show the user action log instead of movements
        #[arg(long)]
        actions: bool,

        /// Limit number of entries shown
        #[arg(long, short = 'n', default_value = "20")]
        limit: usize,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Override the data directory
        #[arg(long)]
        set_data_dir: Option<PathBuf>,

        /// Set default output format
        #[arg(long)]
        set_output: Option<OutputFormat>,

        /// Reset to defaults
        #[arg(long)]
        reset: bool,
    },
}
