//! Per-vessel daily tariffs

use serde::{Deserialize, Serialize};

/// Daily storage rate for containers carried by a vessel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VesselTariff {
    pub vessel_name: String,
    pub daily_rate: f64,
}
