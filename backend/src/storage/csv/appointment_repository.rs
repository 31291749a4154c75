//! # CSV Appointment Repository
//!
//! Keeps every appointment in a single `appointments.csv` at the root of the
//! data directory and pushes the full collection to subscribers after each
//! change.
//!
//! ```text
//! data/
//! ├── appointments.csv   ← this module
//! └── users.yaml
//! ```

use anyhow::{Context, Result};
use async_trait::async_trait;
use csv::{ByteRecord, ReaderBuilder, StringRecord, WriterBuilder};
use log::{debug, info, warn};
use shared::{parse_date, parse_time, Appointment, AppointmentStatus, NewAppointment, TIME_FORMAT};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use uuid::Uuid;

use super::connection::{write_atomically, CsvConnection, APPOINTMENTS_HEADER};
use crate::storage::traits::{AppointmentSnapshot, AppointmentStore};

/// CSV-based appointment store
pub struct AppointmentRepository {
    connection: CsvConnection,
    sender: watch::Sender<AppointmentSnapshot>,
    // Serializes read-modify-write cycles within this process only
    write_lock: Mutex<()>,
}

impl AppointmentRepository {
    /// Open the appointments file, creating it if needed, and load the current contents
    pub fn new(connection: CsvConnection) -> Result<Self> {
        connection.ensure_appointments_file_exists()?;
        let appointments = valid_appointments(read_rows(&connection)?);
        info!(
            "Loaded {} appointments from {}",
            appointments.len(),
            connection.appointments_file_path().display()
        );

        let (sender, _) = watch::channel(Arc::new(appointments));
        Ok(Self {
            connection,
            sender,
            write_lock: Mutex::new(()),
        })
    }

    /// Re-read the file and notify subscribers if another writer changed it.
    ///
    /// Returns whether a new snapshot was published.
    pub async fn reload(&self) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let appointments = valid_appointments(read_rows(&self.connection)?);

        if self.sender.borrow().as_slice() == appointments.as_slice() {
            return Ok(false);
        }

        info!("Appointments file changed on disk, publishing {} records", appointments.len());
        self.sender.send_replace(Arc::new(appointments));
        Ok(true)
    }
}

#[async_trait]
impl AppointmentStore for AppointmentRepository {
    fn subscribe(&self) -> Result<watch::Receiver<AppointmentSnapshot>> {
        Ok(self.sender.subscribe())
    }

    async fn append(&self, record: NewAppointment) -> Result<String> {
        let _guard = self.write_lock.lock().await;

        // Start from the file, not the cached snapshot, so rows written by
        // other processes since the last reload are kept
        let mut rows = read_rows(&self.connection)?;
        let id = Uuid::new_v4().to_string();
        rows.push(StoredRow::Valid(Appointment::from_new(id.clone(), record)));

        write_rows(&self.connection, &rows)?;
        self.sender.send_replace(Arc::new(valid_appointments(rows)));

        info!("Stored appointment {}", id);
        Ok(id)
    }
}

/// A data row as found on disk. Rows this store cannot read are carried
/// through rewrites byte for byte.
enum StoredRow {
    Valid(Appointment),
    Unreadable(ByteRecord),
}

fn read_rows(connection: &CsvConnection) -> Result<Vec<StoredRow>> {
    let file_path = connection.appointments_file_path();
    let mut csv_reader = ReaderBuilder::new()
        .flexible(true)
        .from_path(&file_path)
        .with_context(|| format!("Failed to open {}", file_path.display()))?;

    let mut rows = Vec::new();
    for (index, result) in csv_reader.byte_records().enumerate() {
        let raw = result.with_context(|| format!("Failed to read row {} of {}", index + 1, file_path.display()))?;
        let parsed = StringRecord::from_byte_record(raw.clone())
            .ok()
            .and_then(|record| parse_record(&record));

        match parsed {
            Some(appointment) => rows.push(StoredRow::Valid(appointment)),
            None => {
                warn!("Skipping malformed appointment row {}: {:?}", index + 1, raw);
                rows.push(StoredRow::Unreadable(raw));
            }
        }
    }

    debug!("Read {} appointment rows", rows.len());
    Ok(rows)
}

fn valid_appointments(rows: Vec<StoredRow>) -> Vec<Appointment> {
    rows.into_iter()
        .filter_map(|row| match row {
            StoredRow::Valid(appointment) => Some(appointment),
            StoredRow::Unreadable(_) => None,
        })
        .collect()
}

fn parse_record(record: &StringRecord) -> Option<Appointment> {
    let field = |i: usize| record.get(i).unwrap_or("").to_string();

    let id = field(0);
    if id.is_empty() {
        return None;
    }

    Some(Appointment {
        id,
        requester_id: field(1),
        requester_name: field(2),
        counselor_id: field(3),
        counselor_name: field(4),
        date: parse_date(record.get(5)?)?,
        time: parse_time(record.get(6)?)?,
        reason: field(7),
        status: AppointmentStatus::from(record.get(8).unwrap_or("")),
    })
}

fn write_rows(connection: &CsvConnection, rows: &[StoredRow]) -> Result<()> {
    let mut csv_writer = WriterBuilder::new().flexible(true).from_writer(Vec::new());
    csv_writer.write_record(APPOINTMENTS_HEADER)?;

    for row in rows {
        let appointment = match row {
            StoredRow::Valid(appointment) => appointment,
            StoredRow::Unreadable(raw) => {
                csv_writer.write_byte_record(raw)?;
                continue;
            }
        };

        let date = appointment.date.to_string();
        let time = appointment.time.format(TIME_FORMAT).to_string();
        csv_writer.write_record([
            appointment.id.as_str(),
            appointment.requester_id.as_str(),
            appointment.requester_name.as_str(),
            appointment.counselor_id.as_str(),
            appointment.counselor_name.as_str(),
            date.as_str(),
            time.as_str(),
            appointment.reason.as_str(),
            appointment.status.as_str(),
        ])?;
    }

    let contents = csv_writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush appointments CSV: {}", e))?;
    write_atomically(&connection.appointments_file_path(), &contents)
}
