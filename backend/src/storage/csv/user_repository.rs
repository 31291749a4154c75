//! # YAML User Directory
//!
//! Reads user profiles from `users.yaml`, keyed by uid:
//!
//! ```yaml
//! ana:
//!   first_name: Ana
//!   last_name: Ruiz
//!   email: ana@example.com
//!   is_counselor: true
//! root:
//!   first_name: Admin
//!   is_admin: true
//! ```
//!
//! Profiles are owned by user administration; the scheduler only reads them.
//! A missing file is an empty directory.

use anyhow::{Context, Result};
use log::{debug, info};
use serde::Deserialize;
use shared::UserProfile;
use std::collections::BTreeMap;
use std::fs;
use std::sync::Arc;
use tokio::sync::watch;

use super::connection::CsvConnection;
use crate::storage::traits::{CounselorDirectory, DirectorySnapshot};

/// Profile fields as stored under their uid
#[derive(Debug, Clone, Default, Deserialize)]
struct StoredProfile {
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    is_admin: bool,
    #[serde(default)]
    is_counselor: bool,
}

impl StoredProfile {
    fn into_profile(self, uid: String) -> UserProfile {
        UserProfile {
            uid,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            is_admin: self.is_admin,
            is_counselor: self.is_counselor,
        }
    }
}

/// File-backed user directory
pub struct UserRepository {
    connection: CsvConnection,
    sender: watch::Sender<DirectorySnapshot>,
}

impl UserRepository {
    pub fn new(connection: CsvConnection) -> Result<Self> {
        let profiles = load_profiles(&connection)?;
        info!("Loaded {} user profiles", profiles.len());

        let (sender, _) = watch::channel(Arc::new(profiles));
        Ok(Self { connection, sender })
    }

    /// Re-read `users.yaml` and publish it if it changed
    pub fn reload(&self) -> Result<bool> {
        let profiles = load_profiles(&self.connection)?;
        if self.sender.borrow().as_slice() == profiles.as_slice() {
            return Ok(false);
        }

        info!("User directory changed on disk, publishing {} profiles", profiles.len());
        self.sender.send_replace(Arc::new(profiles));
        Ok(true)
    }
}

impl CounselorDirectory for UserRepository {
    fn subscribe(&self) -> Result<watch::Receiver<DirectorySnapshot>> {
        Ok(self.sender.subscribe())
    }
}

fn read_stored(connection: &CsvConnection) -> Result<BTreeMap<String, StoredProfile>> {
    let path = connection.users_file_path();
    if !path.exists() {
        debug!("No user directory at {}, starting empty", path.display());
        return Ok(BTreeMap::new());
    }

    let yaml_content = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    if yaml_content.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    serde_yaml::from_str(&yaml_content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn into_profiles(stored: BTreeMap<String, StoredProfile>) -> Vec<UserProfile> {
    stored
        .into_iter()
        .map(|(uid, profile)| profile.into_profile(uid))
        .collect()
}

fn load_profiles(connection: &CsvConnection) -> Result<Vec<UserProfile>> {
    read_stored(connection).map(into_profiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{counselor_directory, resolve_actor};
    use crate::storage::csv::test_utils::TestEnvironment;
    use shared::ActorRole;

    #[test]
    fn test_missing_file_is_empty_directory() {
        let env = TestEnvironment::new().unwrap();
        let repository = UserRepository::new(env.connection.clone()).unwrap();
        assert!(repository.subscribe().unwrap().borrow().is_empty());
    }

    #[test]
    fn test_reads_profiles_keyed_by_uid() {
        let env = TestEnvironment::new().unwrap();
        fs::write(
            env.connection.users_file_path(),
            "ana:\n  first_name: Ana\n  last_name: Ruiz\n  is_counselor: true\n\
             root:\n  first_name: Admin\n  is_admin: true\n\
             u1:\n  first_name: Luis\n  email: luis@example.com\n",
        )
        .unwrap();

        let repository = UserRepository::new(env.connection.clone()).unwrap();
        let profiles = repository.subscribe().unwrap().borrow().clone();

        assert_eq!(profiles.len(), 3);
        assert_eq!(resolve_actor(&profiles, "root").unwrap().role, ActorRole::Admin);
        assert_eq!(resolve_actor(&profiles, "u1").unwrap().role, ActorRole::User);

        let counselors = counselor_directory(&profiles);
        assert_eq!(counselors.len(), 1);
        assert_eq!(counselors[0].display_name(), "Ana Ruiz");
    }

    #[test]
    fn test_reload_publishes_edits_made_elsewhere() {
        let env = TestEnvironment::new().unwrap();
        let repository = UserRepository::new(env.connection.clone()).unwrap();
        let mut receiver = repository.subscribe().unwrap();
        receiver.borrow_and_update();

        assert!(!repository.reload().unwrap());

        fs::write(env.connection.users_file_path(), "bruno:\n  first_name: Bruno\n  is_counselor: true\n").unwrap();
        assert!(repository.reload().unwrap());
        assert!(receiver.has_changed().unwrap());
        assert_eq!(counselor_directory(&receiver.borrow_and_update()).len(), 1);

        assert!(!repository.reload().unwrap());
    }
}
