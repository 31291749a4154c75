//! Fixtures shared by the unit tests of the domain and storage layers.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use shared::{Actor, ActorRole, Appointment, AppointmentStatus, CounselorProfile, NewAppointment, UserProfile};
use tokio::sync::watch;

use crate::storage::{AppointmentSnapshot, AppointmentStore};

pub fn date(iso: &str) -> NaiveDate {
    shared::parse_date(iso).expect("valid test date")
}

pub fn time(hh_mm: &str) -> NaiveTime {
    shared::parse_time(hh_mm).expect("valid test time")
}

pub fn new_appointment(requester_id: &str, counselor_id: &str, day: &str) -> NewAppointment {
    NewAppointment {
        requester_id: requester_id.to_string(),
        requester_name: format!("Requester {}", requester_id),
        counselor_id: counselor_id.to_string(),
        counselor_name: format!("Counselor {}", counselor_id),
        date: date(day),
        time: time("09:00"),
        reason: String::new(),
        status: AppointmentStatus::Pending,
    }
}

pub fn appointment(id: &str, requester_id: &str, counselor_id: &str, day: &str) -> Appointment {
    Appointment::from_new(id.to_string(), new_appointment(requester_id, counselor_id, day))
}

pub fn actor(uid: &str, role: ActorRole) -> Actor {
    Actor {
        uid: uid.to_string(),
        role,
        display_name: format!("User {}", uid),
    }
}

pub fn profile(uid: &str, first_name: &str, last_name: &str, is_admin: bool, is_counselor: bool) -> UserProfile {
    UserProfile {
        uid: uid.to_string(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: format!("{}@example.com", uid),
        is_admin,
        is_counselor,
    }
}

pub fn counselor(uid: &str, first_name: &str, last_name: &str) -> CounselorProfile {
    CounselorProfile::from(&profile(uid, first_name, last_name, false, true))
}

/// Store whose appends always fail
pub struct FailingStore;

#[async_trait]
impl AppointmentStore for FailingStore {
    fn subscribe(&self) -> Result<watch::Receiver<AppointmentSnapshot>> {
        let (_sender, receiver) = watch::channel(AppointmentSnapshot::default());
        Ok(receiver)
    }

    async fn append(&self, _record: NewAppointment) -> Result<String> {
        Err(anyhow!("connection refused"))
    }
}
