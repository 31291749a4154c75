use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

pub const APPOINTMENTS_FILE: &str = "appointments.csv";
pub const USERS_FILE: &str = "users.yaml";
pub const APPOINTMENTS_HEADER: [&str; 9] = [
    "id",
    "requester_id",
    "requester_name",
    "counselor_id",
    "counselor_name",
    "date",
    "time",
    "reason",
    "status",
];

/// CsvConnection resolves the files of the data directory and makes sure they exist
#[derive(Debug, Clone)]
pub struct CsvConnection {
    base_directory: PathBuf,
}

impl CsvConnection {
    /// Create a new CSV connection with a base directory
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .with_context(|| format!("Failed to create data directory {}", base_path.display()))?;
            info!("Created data directory: {}", base_path.display());
        }

        Ok(Self {
            base_directory: base_path,
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    pub fn appointments_file_path(&self) -> PathBuf {
        self.base_directory.join(APPOINTMENTS_FILE)
    }

    pub fn users_file_path(&self) -> PathBuf {
        self.base_directory.join(USERS_FILE)
    }

    /// Ensure the appointments CSV exists with its header row
    pub fn ensure_appointments_file_exists(&self) -> Result<()> {
        let file_path = self.appointments_file_path();

        if !file_path.exists() {
            let header = format!("{}\n", APPOINTMENTS_HEADER.join(","));
            fs::write(&file_path, header)
                .with_context(|| format!("Failed to create {}", file_path.display()))?;
            info!("Created appointments file: {}", file_path.display());
        }

        Ok(())
    }
}

/// Write `contents` next to `path` and rename it into place
pub(crate) fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, contents)
        .with_context(|| format!("Failed to write {}", temp_path.display()))?;
    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to move {} into place", path.display()))?;
    Ok(())
}
