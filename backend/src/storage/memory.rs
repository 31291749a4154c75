//! In-process stores backed by `tokio::sync::watch`.
//!
//! Useful for tests and for embedding the scheduler next to a store client
//! that pushes snapshots on its own.

use anyhow::Result;
use async_trait::async_trait;
use log::info;
use shared::{Appointment, NewAppointment, UserProfile};
use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

use super::traits::{AppointmentSnapshot, AppointmentStore, CounselorDirectory, DirectorySnapshot};

pub struct MemoryAppointmentStore {
    sender: watch::Sender<AppointmentSnapshot>,
}

impl MemoryAppointmentStore {
    pub fn new(appointments: Vec<Appointment>) -> Self {
        let (sender, _) = watch::channel(Arc::new(appointments));
        Self { sender }
    }

    /// Replace the whole collection, as a remote client would after a sync
    pub fn replace(&self, appointments: Vec<Appointment>) {
        self.sender.send_replace(Arc::new(appointments));
    }

    pub fn snapshot(&self) -> AppointmentSnapshot {
        self.sender.borrow().clone()
    }
}

impl Default for MemoryAppointmentStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl AppointmentStore for MemoryAppointmentStore {
    fn subscribe(&self) -> Result<watch::Receiver<AppointmentSnapshot>> {
        Ok(self.sender.subscribe())
    }

    async fn append(&self, record: NewAppointment) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let appointment = Appointment::from_new(id.clone(), record);

        self.sender.send_modify(|snapshot| {
            let mut next = snapshot.as_ref().clone();
            next.push(appointment);
            *snapshot = Arc::new(next);
        });

        info!("Appended appointment {} to in-memory store", id);
        Ok(id)
    }
}

pub struct MemoryCounselorDirectory {
    sender: watch::Sender<DirectorySnapshot>,
}

impl MemoryCounselorDirectory {
    pub fn new(profiles: Vec<UserProfile>) -> Self {
        let (sender, _) = watch::channel(Arc::new(profiles));
        Self { sender }
    }

    pub fn replace(&self, profiles: Vec<UserProfile>) {
        self.sender.send_replace(Arc::new(profiles));
    }
}

impl CounselorDirectory for MemoryCounselorDirectory {
    fn subscribe(&self) -> Result<watch::Receiver<DirectorySnapshot>> {
        Ok(self.sender.subscribe())
    }
}
