//! Operator account store and action log

use crate::domain::model::{Role, User, UserAction};
use crate::error::{Result, StoreError};
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

/// Persistent store for operator accounts; passwords are kept as SHA-256
/// hex digests only.
pub struct UserStore {
    users_path: PathBuf,
    actions_path: PathBuf,
    users: HashMap<String, User>,
    actions: Vec<UserAction>,
}

impl UserStore {
    /// Create or load the user store
    pub fn open(store_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&store_dir)?;
        let users_path = store_dir.join("users.json");
        let actions_path = store_dir.join("actions.json");

        let users = if users_path.exists() {
            let file = File::open(&users_path)?;
            let reader = BufReader::new(file);
            serde_json::from_reader(reader).unwrap_or_default()
        } else {
            HashMap::new()
        };

        let actions = if actions_path.exists() {
            let file = File::open(&actions_path)?;
            let reader = BufReader::new(file);
            serde_json::from_reader(reader).unwrap_or_default()
        } else {
            Vec::new()
        };

        Ok(Self {
            users_path,
            actions_path,
            users,
            actions,
        })
    }

    fn save(&self) -> Result<()> {
        let file = File::create(&self.users_path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &self.users)?;

        let file = File::create(&self.actions_path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &self.actions)?;
        Ok(())
    }

    /// SHA-256 hex digest of a password
    pub fn hash_password(password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(password.as_bytes());
        let hash = hasher.finalize();
        format!("{:x}", hash)
    }

    /// Register a new user.
    pub fn add_user(&mut self, username: &str, password: &str, role: Role) -> Result<()> {
        let username = username.trim().to_string();
        if self.users.contains_key(&username) {
            return Err(StoreError::Duplicate(username).into());
        }
        self.users.insert(
            username.clone(),
            User {
                username,
                password_hash: Self::hash_password(password),
                role,
            },
        );
        self.save()?;
        Ok(())
    }

    /// Check credentials. Success and failure are both logged.
    pub fn verify(&mut self, username: &str, password: &str) -> Result<Option<Role>> {
        let hash = Self::hash_password(password);
        let matched = self
            .users
            .get(username.trim())
            .filter(|u| u.password_hash == hash)
            .map(|u| u.role);

        match matched {
            Some(role) => {
                self.log_action(username, "Login Success", "User logged in successfully")?;
                Ok(Some(role))
            }
            None => {
                self.log_action(
                    username,
                    "Login Attempt Failed",
                    &format!("Invalid credentials for user: {}", username.trim()),
                )?;
                Ok(None)
            }
        }
    }

    /// Update password and/or role of an existing user.
    pub fn update_user(
        &mut self,
        username: &str,
        password: Option<&str>,
        role: Option<Role>,
    ) -> Result<()> {
        let user = self
            .users
            .get_mut(username.trim())
            .ok_or_else(|| StoreError::NotFound(username.trim().to_string()))?;

        if let Some(password) = password {
            user.password_hash = Self::hash_password(password);
        }
        if let Some(role) = role {
            user.role = role;
        }
        self.save()?;
        Ok(())
    }

    /// Remove a user.
    pub fn remove_user(&mut self, username: &str) -> Result<bool> {
        let removed = self.users.remove(username.trim()).is_some();
        if removed {
            self.save()?;
        }
        Ok(removed)
    }

    /// All users sorted by username.
    pub fn all_users(&self) -> Vec<&User> {
        let mut users: Vec<_> = self.users.values().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        users
    }

    pub fn count(&self) -> usize {
        self.users.len()
    }

    /// Append to the action log.
    pub fn log_action(&mut self, username: &str, action_type: &str, description: &str) -> Result<()> {
        self.actions.push(UserAction {
            username: username.trim().to_string(),
            action_type: action_type.to_string(),
            description: description.to_string(),
            action_time: Utc::now(),
        });
        self.save()?;
        Ok(())
    }

    /// Action log entries, newest first.
    pub fn actions(&self, limit: Option<usize>) -> Vec<&UserAction> {
        let mut actions: Vec<_> = self.actions.iter().collect();
        actions.sort_by(|a, b| b.action_time.cmp(&a.action_time));
        match limit {
            Some(n) => actions.into_iter().take(n).collect(),
            None => actions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_password_hash_is_sha256_hex() {
        // SHA-256 of the empty string, a fixed vector
        assert_eq!(
            UserStore::hash_password(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_verify_and_action_log() {
        let dir = tempdir().unwrap();
        let mut store = UserStore::open(dir.path().to_path_buf()).unwrap();

        store.add_user("ayse", "s3cret", Role::Operator).unwrap();
        assert_eq!(store.verify("ayse", "s3cret").unwrap(), Some(Role::Operator));
        assert_eq!(store.verify("ayse", "wrong").unwrap(), None);
        assert_eq!(store.verify("nobody", "x").unwrap(), None);

        let actions = store.actions(None);
        assert_eq!(actions.len(), 3);
        assert!(actions.iter().any(|a| a.action_type == "Login Success"));
        assert_eq!(
            actions
                .iter()
                .filter(|a| a.action_type == "Login Attempt Failed")
                .count(),
            2
        );
    }

    #[test]
    fn test_duplicate_user_rejected() {
        let dir = tempdir().unwrap();
        let mut store = UserStore::open(dir.path().to_path_buf()).unwrap();
        store.add_user("admin", "pw", Role::Admin).unwrap();
        assert!(store.add_user("admin", "other", Role::Operator).is_err());
    }

    #[test]
    fn test_update_user() {
        let dir = tempdir().unwrap();
        let mut store = UserStore::open(dir.path().to_path_buf()).unwrap();
        store.add_user("ops", "first", Role::Operator).unwrap();

        store.update_user("ops", Some("second"), Some(Role::Admin)).unwrap();
        assert_eq!(store.verify("ops", "first").unwrap(), None);
        assert_eq!(store.verify("ops", "second").unwrap(), Some(Role::Admin));

        assert!(store.update_user("ghost", None, None).is_err());
    }
}
