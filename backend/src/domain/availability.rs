//! Booked-date index for a single counselor.

use chrono::NaiveDate;
use shared::Appointment;
use std::collections::BTreeSet;

/// Dates that already hold an appointment with `counselor_id`.
///
/// Derived fresh from whatever snapshot the caller holds; duplicates left by
/// concurrent bookings collapse into a single date.
pub fn booked_dates(appointments: &[Appointment], counselor_id: &str) -> BTreeSet<NaiveDate> {
    if counselor_id.trim().is_empty() {
        return BTreeSet::new();
    }

    appointments
        .iter()
        .filter(|appointment| appointment.counselor_id == counselor_id)
        .map(|appointment| appointment.date)
        .collect()
}
