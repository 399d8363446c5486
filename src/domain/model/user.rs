//! Operator accounts and action log entries

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Account role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Operator,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Operator => write!(f, "operator"),
        }
    }
}

/// A registered operator. Only the SHA-256 hash of the password is kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub password_hash: String,

    #[serde(default)]
    pub role: Role,
}

/// One entry in the user action log (logins, record mutations).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAction {
    pub username: String,
    pub action_type: String,
    pub description: String,
    pub action_time: DateTime<Utc>,
}
