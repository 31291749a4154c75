use chrono::{NaiveDate, NaiveTime};

/// Booking form contents waiting to be validated
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BookingProposal {
    pub counselor_id: String,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub reason: String,
}

/// Reasons a booking is refused or could not be stored.
///
/// Every variant is recoverable: the caller shows the message and the view
/// goes back to browsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingError {
    #[error("You must be signed in to book an appointment")]
    NotAuthenticated,
    #[error("Select a counselor")]
    NoCounselorSelected,
    #[error("Select a date and a time")]
    MissingSchedule,
    #[error("{date} is already booked with this counselor")]
    DateAlreadyBooked { counselor_id: String, date: NaiveDate },
    #[error("The appointment could not be saved: {0}")]
    StoreUnavailable(String),
}

impl BookingError {
    /// Stable identifier for clients
    pub fn code(&self) -> &'static str {
        match self {
            BookingError::NotAuthenticated => "NotAuthenticated",
            BookingError::NoCounselorSelected => "NoCounselorSelected",
            BookingError::MissingSchedule => "MissingSchedule",
            BookingError::DateAlreadyBooked { .. } => "DateAlreadyBooked",
            BookingError::StoreUnavailable(_) => "StoreUnavailable",
        }
    }
}
