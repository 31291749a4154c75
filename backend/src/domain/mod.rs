//! # Domain Module
//!
//! Business rules for counselor appointment booking. Nothing here touches the
//! file system or HTTP; storage is reached only through the traits in
//! [`crate::storage::traits`].
//!
//! ## Module Organization
//!
//! - **calendar**: Month grids, padding cells and month navigation
//! - **availability**: Dates already taken for a counselor
//! - **visibility**: Which appointments an actor may see
//! - **booking_validator**: Ordered checks a proposal must pass
//! - **booking_service**: Validates a proposal and appends it to the store
//! - **scheduler**: Per-view controller reacting to store pushes and user events
//! - **models**: Proposal, rejection reasons and actor resolution
//!
//! ## Business Rules
//!
//! - A counselor has at most one appointment per calendar date, checked
//!   against the latest snapshot before writing
//! - Admins see every appointment, counselors see those assigned to them,
//!   everyone else sees only their own requests
//! - New appointments always start out pending

pub mod availability;
pub mod booking_service;
pub mod booking_validator;
pub mod calendar;
pub mod models;
pub mod scheduler;
pub mod visibility;

#[cfg(test)]
pub mod test_support;

pub use availability::booked_dates;
pub use booking_service::BookingService;
pub use booking_validator::validate;
pub use calendar::{CalendarService, WeekStart};
pub use models::{BookingError, BookingProposal};
pub use scheduler::{
    run_session, BookingForm, Notice, SchedulerController, SchedulerEvent, SchedulerSettings, SchedulerState,
    SchedulerView,
};
pub use visibility::visible;
