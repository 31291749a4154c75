//! # REST API for the Booking Calendar
//!
//! Month grids with the selected counselor's booked days marked, and the raw
//! booked-date list for clients that draw their own calendar.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::Local;
use log::{error, info};
use shared::{parse_date, BookedDatesRequest, BookedDatesResponse, CalendarMonthRequest};
use std::collections::BTreeSet;

use super::{booking_error_response, error_response};
use crate::domain::availability::booked_dates;
use crate::AppState;

/// Create a router for calendar related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/month", get(get_calendar_month))
        .route("/booked-dates", get(get_booked_dates))
}

/// Render a month, marking the days already booked with `counselor_id`
pub async fn get_calendar_month(State(state): State<AppState>, Query(query): Query<CalendarMonthRequest>) -> Response {
    info!("GET /api/calendar/month - query: {:?}", query);

    if !(1..=12).contains(&query.month) {
        return error_response(
            StatusCode::BAD_REQUEST,
            "InvalidMonth",
            format!("Month must be between 1 and 12, got {}", query.month),
        );
    }

    let selected = match query.selected.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => None,
        Some(raw) => match parse_date(raw) {
            Some(date) => Some(date),
            None => return error_response(StatusCode::BAD_REQUEST, "InvalidDate", format!("Invalid date: {}", raw)),
        },
    };

    let booked = match query.counselor_id.as_deref() {
        None => BTreeSet::new(),
        Some(counselor_id) => match state.appointments() {
            Ok(appointments) => booked_dates(&appointments, counselor_id),
            Err(e) => {
                error!("Failed to read appointments: {}", e);
                return booking_error_response(&e);
            }
        },
    };

    let today = Local::now().date_naive();
    let calendar_month = state
        .calendar_service
        .render_month(query.year, query.month, &booked, selected, today);

    (StatusCode::OK, Json(calendar_month)).into_response()
}

/// Dates already taken with a counselor, oldest first
pub async fn get_booked_dates(State(state): State<AppState>, Query(query): Query<BookedDatesRequest>) -> Response {
    info!("GET /api/calendar/booked-dates - query: {:?}", query);

    match state.appointments() {
        Ok(appointments) => {
            let response = BookedDatesResponse {
                dates: booked_dates(&appointments, &query.counselor_id).into_iter().collect(),
                counselor_id: query.counselor_id,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to read appointments: {}", e);
            booking_error_response(&e)
        }
    }
}
