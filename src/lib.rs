//! Port Tracker Library
//!
//! Container identifier validation (ISO 6346) and port terminal
//! operation tracking: records, movement history, tariffs, billing
//! and reports.

pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod export;
pub mod infrastructure;
pub mod output;
pub mod report;
pub mod store;
