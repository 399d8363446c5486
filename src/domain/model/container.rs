//! Container identifier and port operation record

use crate::domain::service::check_digit;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when parsing a raw container identifier.
///
/// Both variants are expected outcomes (operator typos, dirty import rows),
/// not systemic failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContainerIdError {
    #[error("wrong format, expected 4 letters + 7 digits: {0}")]
    BadFormat(String),

    #[error("check digit should be {expected}; correct identifier is {corrected}")]
    CheckDigitMismatch { expected: u8, corrected: String },
}

/// A validated ISO 6346 container identifier (e.g. `CSQU3054383`).
///
/// Construction goes through [`ContainerId::parse`], which trims whitespace,
/// upper-cases, and verifies the check digit. Stored identifiers are treated
/// as opaque strings after that point.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerId(String);

impl ContainerId {
    /// Parse and validate a raw identifier string.
    pub fn parse(raw: &str) -> Result<Self, ContainerIdError> {
        let cleaned = raw.trim().to_ascii_uppercase();
        match check_digit::validate(&cleaned) {
            None => Err(ContainerIdError::BadFormat(cleaned)),
            Some(v) if !v.is_valid => Err(ContainerIdError::CheckDigitMismatch {
                expected: v.expected_check_digit,
                corrected: format!("{}{}", &cleaned[..10], v.expected_check_digit),
            }),
            Some(_) => Ok(Self(cleaned)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Owner/operator code (first 3 letters).
    pub fn owner_code(&self) -> &str {
        &self.0[..3]
    }

    /// Equipment category identifier (4th letter, conventionally U, J or Z).
    pub fn category_identifier(&self) -> char {
        self.0.as_bytes()[3] as char
    }

    /// Six-digit serial number.
    pub fn serial_number(&self) -> &str {
        &self.0[4..10]
    }

    pub fn check_digit(&self) -> u8 {
        self.0.as_bytes()[10] - b'0'
    }
}

impl std::fmt::Display for ContainerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One port operation record, keyed by container identifier.
///
/// Mirrors the terminal's operational sheet: vessel, ports, container
/// attributes, yard location and the arrival/departure window used for
/// billing. All free-text fields are optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortOperation {
    pub container_id: ContainerId,

    #[serde(default)]
    pub vessel_name: Option<String>,

    #[serde(default)]
    pub imo_number: Option<u32>,

    #[serde(default)]
    pub arrival_port: Option<String>,

    #[serde(default)]
    pub departure_port: Option<String>,

    /// Container length in feet (20/40/45)
    #[serde(default)]
    pub container_size: Option<u32>,

    #[serde(default)]
    pub container_type: Option<String>,

    /// Load, discharge, transshipment...
    #[serde(default)]
    pub operation_type: Option<String>,

    /// When the record was taken
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,

    #[serde(default)]
    pub terminal_name: Option<String>,

    #[serde(default)]
    pub transport_mode: Option<String>,

    #[serde(default)]
    pub container_status: Option<String>,

    #[serde(default)]
    pub location_area: Option<String>,

    #[serde(default)]
    pub handling_equipment: Option<String>,

    #[serde(default)]
    pub customs_clearance_status: Option<String>,

    #[serde(default)]
    pub weight_kg: Option<u32>,

    #[serde(default)]
    pub hazmat_flag: bool,

    /// Entered the terminal
    #[serde(default)]
    pub arrival_date: Option<DateTime<Utc>>,

    /// Left the terminal
    #[serde(default)]
    pub departure_date: Option<DateTime<Utc>>,
}

impl PortOperation {
    /// Minimal record: a validated id, everything else unset.
    pub fn new(container_id: ContainerId) -> Self {
        Self {
            container_id,
            vessel_name: None,
            imo_number: None,
            arrival_port: None,
            departure_port: None,
            container_size: None,
            container_type: None,
            operation_type: None,
            timestamp: None,
            terminal_name: None,
            transport_mode: None,
            container_status: None,
            location_area: None,
            handling_equipment: None,
            customs_clearance_status: None,
            weight_kg: None,
            hazmat_flag: false,
            arrival_date: None,
            departure_date: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_input() {
        let id = ContainerId::parse("  csqu3054383 ").unwrap();
        assert_eq!(id.as_str(), "CSQU3054383");
        assert_eq!(id.owner_code(), "CSQ");
        assert_eq!(id.category_identifier(), 'U');
        assert_eq!(id.serial_number(), "305438");
        assert_eq!(id.check_digit(), 3);
    }

    #[test]
    fn test_parse_bad_format() {
        assert!(matches!(
            ContainerId::parse("CSQU30543"),
            Err(ContainerIdError::BadFormat(_))
        ));
        assert!(matches!(
            ContainerId::parse("1234CSQU383"),
            Err(ContainerIdError::BadFormat(_))
        ));
    }

    #[test]
    fn test_parse_mismatch_carries_correction() {
        let err = ContainerId::parse("CSQU3054387").unwrap_err();
        assert_eq!(
            err,
            ContainerIdError::CheckDigitMismatch {
                expected: 3,
                corrected: "CSQU3054383".to_string(),
            }
        );
    }

    #[test]
    fn test_container_id_serde_is_transparent() {
        let id = ContainerId::parse("CSQU3054383").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"CSQU3054383\"");
        let back: ContainerId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
