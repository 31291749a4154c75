use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wall-clock format used for appointment times ("HH:MM").
pub const TIME_FORMAT: &str = "%H:%M";

/// Parse a "HH:MM" time, also accepting "HH:MM:SS" as written by some clients.
pub fn parse_time(input: &str) -> Option<NaiveTime> {
    let trimmed = input.trim();
    NaiveTime::parse_from_str(trimmed, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .ok()
}

/// Parse an ISO "YYYY-MM-DD" calendar date.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").ok()
}

/// Serde adapter that keeps appointment times as "HH:MM" on the wire and on disk
pub mod hh_mm {
    use chrono::NaiveTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(super::TIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time(&raw).ok_or_else(|| D::Error::custom(format!("invalid time '{}'", raw)))
    }
}

/// A booked appointment between a requesting user and a counselor.
///
/// Names are captured when the appointment is created and are never re-synced
/// with the user directory afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    /// Identifier assigned by the store
    pub id: String,
    pub requester_id: String,
    pub requester_name: String,
    pub counselor_id: String,
    pub counselor_name: String,
    /// Whole calendar day, no time zone
    pub date: NaiveDate,
    /// Local wall-clock time
    #[serde(with = "hh_mm")]
    pub time: NaiveTime,
    pub reason: String,
    #[serde(default)]
    pub status: AppointmentStatus,
}

impl Appointment {
    /// Attach a store-assigned identifier to a new record
    pub fn from_new(id: String, record: NewAppointment) -> Self {
        Self {
            id,
            requester_id: record.requester_id,
            requester_name: record.requester_name,
            counselor_id: record.counselor_id,
            counselor_name: record.counselor_name,
            date: record.date,
            time: record.time,
            reason: record.reason,
            status: record.status,
        }
    }
}

/// Appointment record as handed to the store, before an id exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAppointment {
    pub requester_id: String,
    pub requester_name: String,
    pub counselor_id: String,
    pub counselor_name: String,
    pub date: NaiveDate,
    #[serde(with = "hh_mm")]
    pub time: NaiveTime,
    pub reason: String,
    pub status: AppointmentStatus,
}

/// Appointment status. Only `pending` is produced here; anything else was
/// written by another workflow and is carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Unrecognized(String),
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Unrecognized(value) => value,
        }
    }
}

impl From<&str> for AppointmentStatus {
    fn from(value: &str) -> Self {
        match value.trim() {
            "" | "pending" => AppointmentStatus::Pending,
            other => AppointmentStatus::Unrecognized(other.to_string()),
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AppointmentStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AppointmentStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(AppointmentStatus::from(raw.as_str()))
    }
}

/// User profile as kept by the user directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub uid: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_counselor: bool,
}

impl UserProfile {
    pub fn display_name(&self) -> String {
        join_name(&self.first_name, &self.last_name)
    }
}

/// A user who can be booked for appointments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounselorProfile {
    pub uid: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl CounselorProfile {
    pub fn display_name(&self) -> String {
        join_name(&self.first_name, &self.last_name)
    }
}

impl From<&UserProfile> for CounselorProfile {
    fn from(profile: &UserProfile) -> Self {
        Self {
            uid: profile.uid.clone(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            email: profile.email.clone(),
        }
    }
}

fn join_name(first: &str, last: &str) -> String {
    format!("{} {}", first, last).trim().to_string()
}

/// Role of the acting user, resolved once from profile flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    Admin,
    Counselor,
    User,
}

impl ActorRole {
    /// The admin flag takes precedence over the counselor flag.
    pub fn from_flags(is_admin: bool, is_counselor: bool) -> Self {
        if is_admin {
            ActorRole::Admin
        } else if is_counselor {
            ActorRole::Counselor
        } else {
            ActorRole::User
        }
    }
}

/// Authenticated user on whose behalf the scheduler acts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub uid: String,
    pub role: ActorRole,
    pub display_name: String,
}

impl Actor {
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            uid: profile.uid.clone(),
            role: ActorRole::from_flags(profile.is_admin, profile.is_counselor),
            display_name: profile.display_name(),
        }
    }
}

/// Type of calendar cell for explicit rendering logic
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CalendarDayType {
    /// Empty padding cell before the first day of the month
    PaddingBefore,
    /// Actual day within the month
    MonthDay,
    /// Empty padding cell after the last day of the month
    PaddingAfter,
}

/// A single cell of the month grid
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarCell {
    pub day: Option<u32>,
    pub date: Option<NaiveDate>,
    pub day_type: CalendarDayType,
    pub is_booked: bool,
    pub is_selected: bool,
    pub is_today: bool,
}

/// A month laid out as week rows of seven cells
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarMonth {
    pub year: i32,
    /// 1 = January
    pub month: u32,
    pub month_name: String,
    /// Column of day 1 (0 = first column of the week)
    pub first_day_of_week: u32,
    pub weeks: Vec<Vec<CalendarCell>>,
}

/// Month currently shown by a calendar view
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarFocusDate {
    pub month: u32,
    pub year: i32,
}

impl CalendarFocusDate {
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            year: date.year(),
        }
    }
}

/// Query for a rendered calendar month
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarMonthRequest {
    pub year: i32,
    pub month: u32,
    pub counselor_id: Option<String>,
    /// ISO date to highlight as selected
    pub selected: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookedDatesRequest {
    pub counselor_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookedDatesResponse {
    pub counselor_id: String,
    pub dates: Vec<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppointmentListResponse {
    pub appointments: Vec<Appointment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CounselorListResponse {
    pub counselors: Vec<CounselorProfile>,
}

/// Booking form as submitted by a client; date and time are raw strings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateAppointmentRequest {
    #[serde(default)]
    pub counselor_id: String,
    pub date: Option<String>,
    pub time: Option<String>,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateAppointmentResponse {
    pub appointment: Appointment,
    pub success_message: String,
}

/// Initial values for a fresh booking form
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookingDefaultsResponse {
    #[serde(with = "hh_mm")]
    pub default_time: NaiveTime,
    /// "sunday" or "monday"
    pub week_start: String,
    pub today: NaiveDate,
    /// First counselor in the directory, if any
    pub counselor_id: Option<String>,
}

/// Error body returned by the HTTP layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}
