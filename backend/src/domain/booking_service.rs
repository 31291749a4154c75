//! Turns a validated proposal into a stored appointment.

use log::{error, info};
use shared::{Actor, Appointment, AppointmentStatus, CounselorProfile, NewAppointment};
use std::sync::Arc;

use crate::domain::availability::booked_dates;
use crate::domain::booking_validator::validate;
use crate::domain::models::{BookingError, BookingProposal};
use crate::storage::AppointmentStore;

/// Service that validates proposals and appends them to the appointment store
#[derive(Clone)]
pub struct BookingService {
    store: Arc<dyn AppointmentStore>,
}

impl BookingService {
    pub fn new(store: Arc<dyn AppointmentStore>) -> Self {
        Self { store }
    }

    /// Validate `proposal` against `appointments` and store it.
    ///
    /// `appointments` must be the most recent snapshot the caller has seen.
    /// Another client may book the same slot between that snapshot and the
    /// append; the store accepts both records and readers tolerate the pair.
    pub async fn book(
        &self,
        actor: Option<&Actor>,
        proposal: &BookingProposal,
        counselors: &[CounselorProfile],
        appointments: &[Appointment],
    ) -> Result<Appointment, BookingError> {
        let booked = booked_dates(appointments, &proposal.counselor_id);
        validate(actor, proposal, &booked)?;

        let record = build_record(actor, proposal, counselors)?;
        let id = self.store.append(record.clone()).await.map_err(|e| {
            error!("Failed to append appointment: {:#}", e);
            BookingError::StoreUnavailable(e.to_string())
        })?;

        info!(
            "Booked appointment {} with {} on {} at {}",
            id,
            record.counselor_id,
            record.date,
            record.time.format(shared::TIME_FORMAT)
        );
        Ok(Appointment::from_new(id, record))
    }
}

/// Build the stored record, copying the current display names of both parties
pub fn build_record(
    actor: Option<&Actor>,
    proposal: &BookingProposal,
    counselors: &[CounselorProfile],
) -> Result<NewAppointment, BookingError> {
    let actor = actor.ok_or(BookingError::NotAuthenticated)?;
    let (Some(date), Some(time)) = (proposal.date, proposal.time) else {
        return Err(BookingError::MissingSchedule);
    };

    // A counselor missing from the directory is still bookable, just unnamed
    let counselor_name = counselors
        .iter()
        .find(|counselor| counselor.uid == proposal.counselor_id)
        .map(CounselorProfile::display_name)
        .unwrap_or_default();

    Ok(NewAppointment {
        requester_id: actor.uid.clone(),
        requester_name: actor.display_name.clone(),
        counselor_id: proposal.counselor_id.clone(),
        counselor_name,
        date,
        time,
        reason: proposal.reason.clone(),
        status: AppointmentStatus::Pending,
    })
}
