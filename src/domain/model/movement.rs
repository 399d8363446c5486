//! Container movement history entries

use super::ContainerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One movement log entry, appended when an update changes a container's
/// status or yard location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementLog {
    pub container_id: ContainerId,

    #[serde(default)]
    pub operation_type: Option<String>,

    #[serde(default)]
    pub old_status: Option<String>,

    #[serde(default)]
    pub new_status: Option<String>,

    #[serde(default)]
    pub old_location: Option<String>,

    #[serde(default)]
    pub new_location: Option<String>,

    pub logged_at: DateTime<Utc>,
}
