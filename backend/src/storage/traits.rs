//! # Storage Traits
//!
//! Boundary between the scheduler and whatever keeps appointments and user
//! profiles. Both collections follow the same "subscribe to the whole
//! collection, get it again on every change" model: a subscription yields a
//! `watch` receiver whose current value is the latest full snapshot.

use anyhow::Result;
use async_trait::async_trait;
use shared::{Appointment, NewAppointment, UserProfile};
use std::sync::Arc;
use tokio::sync::watch;

/// Immutable view of the full appointment collection
pub type AppointmentSnapshot = Arc<Vec<Appointment>>;

/// Immutable view of every user profile in the directory
pub type DirectorySnapshot = Arc<Vec<UserProfile>>;

/// Durable collection of appointment records
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Subscribe to the appointment collection.
    ///
    /// The receiver holds the current contents immediately and is updated with
    /// the entire collection (not a diff) whenever anything changes.
    fn subscribe(&self) -> Result<watch::Receiver<AppointmentSnapshot>>;

    /// Append a new record and return the identifier the store assigned.
    ///
    /// Appends are unconditional: the store does not check for an existing
    /// appointment on the same counselor and date.
    async fn append(&self, record: NewAppointment) -> Result<String>;
}

/// Read-only source of user profiles; counselors are the ones flagged `is_counselor`
pub trait CounselorDirectory: Send + Sync {
    fn subscribe(&self) -> Result<watch::Receiver<DirectorySnapshot>>;
}
