//! Scheduler controller: the state behind one booking view.
//!
//! The controller holds the month on screen, the chosen counselor and the
//! booking form, and reacts to two event sources: snapshots pushed by the
//! stores and interactions from the user. Derived data (visible appointments,
//! booked dates, the rendered month) is recomputed from the latest snapshot
//! on every read.
//!
//! ```text
//! Browsing ──select_day──▶ SelectingDate ──edit form──▶ Reviewing ──submit──▶ Submitting
//!    ▲  ▲                      │ (date booked: stay, show conflict)              │
//!    │  └──────────────────────┘                                                 │
//!    └──────────────── outcome notice (booked or rejected) ◀─────────────────────┘
//! ```

use chrono::{NaiveDate, NaiveTime};
use log::{debug, info, warn};
use shared::{Actor, Appointment, CalendarFocusDate, CalendarMonth, CounselorProfile, UserProfile};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::domain::availability::booked_dates;
use crate::domain::booking_service::BookingService;
use crate::domain::calendar::{CalendarService, WeekStart};
use crate::domain::models::{counselor_directory, BookingError, BookingProposal};
use crate::domain::visibility::visible;
use crate::storage::{AppointmentSnapshot, AppointmentStore, CounselorDirectory};

/// Per-view settings taken from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerSettings {
    pub week_start: WeekStart,
    /// Time the form resets to after a booking
    pub default_time: NaiveTime,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            week_start: WeekStart::default(),
            default_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerState {
    Browsing,
    SelectingDate(NaiveDate),
    Reviewing,
    Submitting,
}

/// Outcome surfaced to the user after an interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Booked { appointment_id: String, date: NaiveDate },
    Rejected(BookingError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingForm {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub reason: String,
}

/// User interactions the controller understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerEvent {
    PreviousMonth,
    NextMonth,
    SelectCounselor(String),
    SelectDay(u32),
    SetDate(Option<NaiveDate>),
    SetTime(Option<NaiveTime>),
    SetReason(String),
    Submit,
}

/// Everything a view needs to draw itself after an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerView {
    pub state: SchedulerState,
    pub notice: Option<Notice>,
    pub focus: CalendarFocusDate,
    pub calendar: CalendarMonth,
    pub counselors: Vec<CounselorProfile>,
    pub selected_counselor: Option<String>,
    pub form: BookingForm,
    pub appointments: Vec<Appointment>,
}

pub struct SchedulerController {
    actor: Option<Actor>,
    calendar: CalendarService,
    settings: SchedulerSettings,
    today: NaiveDate,
    focus: CalendarFocusDate,
    appointments: AppointmentSnapshot,
    counselors: Vec<CounselorProfile>,
    selected_counselor: Option<String>,
    form: BookingForm,
    state: SchedulerState,
    notice: Option<Notice>,
}

impl SchedulerController {
    /// Create a controller showing the month that contains `today`
    pub fn new(actor: Option<Actor>, today: NaiveDate, settings: SchedulerSettings) -> Self {
        Self {
            actor,
            calendar: CalendarService::new(settings.week_start),
            settings,
            today,
            focus: CalendarFocusDate::containing(today),
            appointments: AppointmentSnapshot::default(),
            counselors: Vec::new(),
            selected_counselor: None,
            form: BookingForm {
                date: None,
                time: Some(settings.default_time),
                reason: String::new(),
            },
            state: SchedulerState::Browsing,
            notice: None,
        }
    }

    // ─── Store events ────────────────────────────────────────────────────────

    /// Replace the appointment snapshot with the one just pushed by the store
    pub fn on_appointments(&mut self, snapshot: AppointmentSnapshot) {
        debug!("Received appointment snapshot with {} records", snapshot.len());
        self.appointments = snapshot;
    }

    /// Replace the counselor list from a directory push.
    ///
    /// The first counselor is selected when nothing is selected yet or the
    /// selected one is no longer listed.
    pub fn on_directory(&mut self, profiles: &[UserProfile]) {
        self.counselors = counselor_directory(profiles);

        let still_listed = self
            .selected_counselor
            .as_ref()
            .is_some_and(|uid| self.counselors.iter().any(|c| &c.uid == uid));

        if !still_listed {
            let fallback = self.counselors.first().map(|c| c.uid.clone());
            if self.selected_counselor.is_some() {
                warn!("Selected counselor left the directory, switching to {:?}", fallback);
            }
            self.selected_counselor = fallback;
        }
    }

    // ─── User events ─────────────────────────────────────────────────────────

    /// Apply one user interaction. Submissions go through `booking`.
    pub async fn handle(&mut self, event: SchedulerEvent, booking: &BookingService) {
        match event {
            SchedulerEvent::PreviousMonth => self.previous_month(),
            SchedulerEvent::NextMonth => self.next_month(),
            SchedulerEvent::SelectCounselor(uid) => self.select_counselor(&uid),
            SchedulerEvent::SelectDay(day) => {
                // A conflict is already recorded as the notice
                let _ = self.select_day(day);
            }
            SchedulerEvent::SetDate(date) => self.set_date(date),
            SchedulerEvent::SetTime(time) => self.set_time(time),
            SchedulerEvent::SetReason(reason) => self.set_reason(reason),
            SchedulerEvent::Submit => {
                let _ = self.submit(booking).await;
            }
        }
    }

    pub fn previous_month(&mut self) {
        let (month, year) = self.calendar.previous_month(self.focus.month, self.focus.year);
        self.focus = CalendarFocusDate { month, year };
        self.return_to_browsing();
    }

    pub fn next_month(&mut self) {
        let (month, year) = self.calendar.next_month(self.focus.month, self.focus.year);
        self.focus = CalendarFocusDate { month, year };
        self.return_to_browsing();
    }

    /// Switch counselor; a chosen date already taken with the new counselor is dropped
    pub fn select_counselor(&mut self, uid: &str) {
        let uid = uid.trim();
        self.selected_counselor = (!uid.is_empty()).then(|| uid.to_string());
        self.return_to_browsing();

        if let Some(date) = self.form.date {
            if self.booked_dates().contains(&date) {
                info!("Clearing {}: already booked with {}", date, uid);
                self.form.date = None;
            }
        }
    }

    /// Pick a day of the month on screen.
    ///
    /// Days outside the month are ignored (`Ok(None)`). A day already booked
    /// with the current counselor is refused in place.
    pub fn select_day(&mut self, day: u32) -> Result<Option<NaiveDate>, BookingError> {
        let Some(date) = self.calendar.iso_date(self.focus.year, self.focus.month, day) else {
            return Ok(None);
        };

        if self.booked_dates().contains(&date) {
            let conflict = BookingError::DateAlreadyBooked {
                counselor_id: self.selected_counselor.clone().unwrap_or_default(),
                date,
            };
            self.state = SchedulerState::Browsing;
            self.notice = Some(Notice::Rejected(conflict.clone()));
            return Err(conflict);
        }

        self.notice = None;
        self.form.date = Some(date);
        self.state = SchedulerState::SelectingDate(date);
        Ok(Some(date))
    }

    /// Typed date input; checked against availability only on submit
    pub fn set_date(&mut self, date: Option<NaiveDate>) {
        self.form.date = date;
        self.state = SchedulerState::Reviewing;
    }

    pub fn set_time(&mut self, time: Option<NaiveTime>) {
        self.form.time = time;
        self.state = SchedulerState::Reviewing;
    }

    pub fn set_reason(&mut self, reason: String) {
        self.form.reason = reason;
        self.state = SchedulerState::Reviewing;
    }

    /// Validate the form against the latest snapshot and store it.
    ///
    /// On success the form is reset to its defaults; on failure it is kept so
    /// the user can correct it. Either way the controller ends up browsing
    /// with a notice describing the outcome.
    pub async fn submit(&mut self, booking: &BookingService) -> Result<String, BookingError> {
        self.state = SchedulerState::Submitting;
        let proposal = self.proposal();

        let result = booking
            .book(self.actor.as_ref(), &proposal, &self.counselors, &self.appointments)
            .await;

        self.state = SchedulerState::Browsing;
        match result {
            Ok(appointment) => {
                self.notice = Some(Notice::Booked {
                    appointment_id: appointment.id.clone(),
                    date: appointment.date,
                });
                self.reset_form();
                Ok(appointment.id)
            }
            Err(rejection) => {
                info!("Booking rejected: {}", rejection);
                self.notice = Some(Notice::Rejected(rejection.clone()));
                Err(rejection)
            }
        }
    }

    // ─── Derived state ───────────────────────────────────────────────────────

    pub fn visible_appointments(&self) -> Vec<Appointment> {
        visible(&self.appointments, self.actor.as_ref())
    }

    /// Booked dates of the selected counselor, across the whole collection
    pub fn booked_dates(&self) -> BTreeSet<NaiveDate> {
        match &self.selected_counselor {
            Some(uid) => booked_dates(&self.appointments, uid),
            None => BTreeSet::new(),
        }
    }

    pub fn calendar(&self) -> CalendarMonth {
        self.calendar.render_month(
            self.focus.year,
            self.focus.month,
            &self.booked_dates(),
            self.form.date,
            self.today,
        )
    }

    pub fn view(&self) -> SchedulerView {
        SchedulerView {
            state: self.state.clone(),
            notice: self.notice.clone(),
            focus: self.focus,
            calendar: self.calendar(),
            counselors: self.counselors.clone(),
            selected_counselor: self.selected_counselor.clone(),
            form: self.form.clone(),
            appointments: self.visible_appointments(),
        }
    }

    pub fn state(&self) -> &SchedulerState {
        &self.state
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn form(&self) -> &BookingForm {
        &self.form
    }

    pub fn focus(&self) -> CalendarFocusDate {
        self.focus
    }

    pub fn counselors(&self) -> &[CounselorProfile] {
        &self.counselors
    }

    pub fn selected_counselor(&self) -> Option<&str> {
        self.selected_counselor.as_deref()
    }

    fn proposal(&self) -> BookingProposal {
        BookingProposal {
            counselor_id: self.selected_counselor.clone().unwrap_or_default(),
            date: self.form.date,
            time: self.form.time,
            reason: self.form.reason.clone(),
        }
    }

    /// Drop any in-progress review without touching the store
    fn return_to_browsing(&mut self) {
        self.state = SchedulerState::Browsing;
        self.notice = None;
    }

    fn reset_form(&mut self) {
        self.form = BookingForm {
            date: None,
            time: Some(self.settings.default_time),
            reason: String::new(),
        };
    }
}

/// Drive a controller until the user-event channel closes.
///
/// Starts from the current store contents, then handles store pushes and user
/// events as they arrive, publishing a fresh [`SchedulerView`] after each one.
/// A store or directory that stops publishing is simply no longer listened to.
pub async fn run_session(
    mut controller: SchedulerController,
    store: Arc<dyn AppointmentStore>,
    directory: Arc<dyn CounselorDirectory>,
    mut events: mpsc::Receiver<SchedulerEvent>,
    updates: mpsc::Sender<SchedulerView>,
) -> Result<SchedulerController, BookingError> {
    let unavailable = |e: anyhow::Error| BookingError::StoreUnavailable(e.to_string());
    let mut appointments_rx = store.subscribe().map_err(unavailable)?;
    let mut directory_rx = directory.subscribe().map_err(unavailable)?;
    let booking = BookingService::new(store);

    let profiles = directory_rx.borrow_and_update().clone();
    controller.on_directory(&profiles);
    let snapshot = appointments_rx.borrow_and_update().clone();
    controller.on_appointments(snapshot);

    if updates.send(controller.view()).await.is_err() {
        return Ok(controller);
    }

    let mut appointments_open = true;
    let mut directory_open = true;

    loop {
        tokio::select! {
            changed = appointments_rx.changed(), if appointments_open => {
                if changed.is_err() {
                    warn!("Appointment store closed its subscription");
                    appointments_open = false;
                    continue;
                }
                let snapshot = appointments_rx.borrow_and_update().clone();
                controller.on_appointments(snapshot);
            }
            changed = directory_rx.changed(), if directory_open => {
                if changed.is_err() {
                    warn!("User directory closed its subscription");
                    directory_open = false;
                    continue;
                }
                let profiles = directory_rx.borrow_and_update().clone();
                controller.on_directory(&profiles);
            }
            event = events.recv() => match event {
                Some(event) => controller.handle(event, &booking).await,
                None => break,
            },
        }

        if updates.send(controller.view()).await.is_err() {
            debug!("View receiver dropped, ending scheduler session");
            break;
        }
    }

    Ok(controller)
}
