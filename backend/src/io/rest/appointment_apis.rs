//! # REST API for Appointments
//!
//! Listing is scoped to what the caller may see; booking runs the full
//! validation against the latest snapshot before appending.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::Local;
use log::{error, info, warn};
use shared::{
    parse_date, parse_time, AppointmentListResponse, BookingDefaultsResponse, CreateAppointmentRequest,
    CreateAppointmentResponse, TIME_FORMAT,
};

use super::{booking_error_response, error_response, request_actor};
use crate::domain::models::{counselor_directory, BookingProposal};
use crate::domain::visibility::visible;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/appointments", get(list_appointments).post(create_appointment))
        .route("/appointments/defaults", get(get_booking_defaults))
}

/// List the appointments visible to the caller
pub async fn list_appointments(State(state): State<AppState>, headers: HeaderMap) -> Response {
    info!("GET /api/appointments");

    let (appointments, profiles) = match (state.appointments(), state.profiles()) {
        (Ok(appointments), Ok(profiles)) => (appointments, profiles),
        (Err(e), _) | (_, Err(e)) => {
            error!("Failed to read stores: {}", e);
            return booking_error_response(&e);
        }
    };

    let actor = request_actor(&headers, &profiles);
    let response = AppointmentListResponse {
        appointments: visible(&appointments, actor.as_ref()),
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// Book an appointment for the caller
pub async fn create_appointment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateAppointmentRequest>,
) -> Response {
    info!("POST /api/appointments - request: {:?}", request);

    let (appointments, profiles) = match (state.appointments(), state.profiles()) {
        (Ok(appointments), Ok(profiles)) => (appointments, profiles),
        (Err(e), _) | (_, Err(e)) => {
            error!("Failed to read stores: {}", e);
            return booking_error_response(&e);
        }
    };

    let proposal = match to_proposal(request) {
        Ok(proposal) => proposal,
        Err(response) => return response,
    };

    let actor = request_actor(&headers, &profiles);
    let counselors = counselor_directory(&profiles);

    match state
        .booking_service
        .book(actor.as_ref(), &proposal, &counselors, &appointments)
        .await
    {
        Ok(appointment) => {
            let success_message = format!(
                "Appointment booked with {} on {} at {}",
                appointment.counselor_name,
                state.calendar_service.format_date_for_display(appointment.date),
                appointment.time.format(TIME_FORMAT)
            );
            let response = CreateAppointmentResponse {
                appointment,
                success_message,
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => {
            warn!("Booking refused: {}", e);
            booking_error_response(&e)
        }
    }
}

/// Values a client should prefill the booking form with
pub async fn get_booking_defaults(State(state): State<AppState>) -> Response {
    info!("GET /api/appointments/defaults");

    let profiles = match state.profiles() {
        Ok(profiles) => profiles,
        Err(e) => {
            error!("Failed to read user directory: {}", e);
            return booking_error_response(&e);
        }
    };

    let response = BookingDefaultsResponse {
        default_time: state.settings.default_time,
        week_start: state.settings.week_start.as_str().to_string(),
        today: Local::now().date_naive(),
        counselor_id: counselor_directory(&profiles).into_iter().next().map(|c| c.uid),
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// Parse the raw form fields. Blank date or time count as not chosen.
fn to_proposal(request: CreateAppointmentRequest) -> Result<BookingProposal, Response> {
    let date = match non_blank(request.date) {
        None => None,
        Some(raw) => Some(parse_date(&raw).ok_or_else(|| {
            error_response(StatusCode::BAD_REQUEST, "InvalidDate", format!("Invalid date: {}", raw))
        })?),
    };

    let time = match non_blank(request.time) {
        None => None,
        Some(raw) => Some(parse_time(&raw).ok_or_else(|| {
            error_response(StatusCode::BAD_REQUEST, "InvalidTime", format!("Invalid time: {}", raw))
        })?),
    };

    Ok(BookingProposal {
        counselor_id: request.counselor_id,
        date,
        time,
        reason: request.reason,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::time;
    use crate::domain::{SchedulerSettings, WeekStart};
    use crate::io::rest::test_app::{parse, send, setup_test_app};
    use crate::storage::{MemoryAppointmentStore, MemoryCounselorDirectory};
    use axum::http::Method;
    use serde_json::json;
    use shared::{AppointmentStatus, ErrorResponse};
    use std::sync::Arc;

    fn ids(response: &AppointmentListResponse) -> Vec<&str> {
        response.appointments.iter().map(|a| a.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_list_is_scoped_to_caller() {
        let app = setup_test_app();

        let (status, body) = send(&app.router, Method::GET, "/appointments", Some("u1"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&parse(&body)), vec!["a1"]);

        let (_, body) = send(&app.router, Method::GET, "/appointments", Some("bruno"), None).await;
        assert_eq!(ids(&parse(&body)), vec!["a2"]);

        let (_, body) = send(&app.router, Method::GET, "/appointments", Some("root"), None).await;
        assert_eq!(ids(&parse(&body)), vec!["a1", "a2"]);

        let (status, body) = send(&app.router, Method::GET, "/appointments", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(parse::<AppointmentListResponse>(&body).appointments.is_empty());
    }

    #[tokio::test]
    async fn test_create_appointment_books_pending() {
        let app = setup_test_app();
        let request = json!({
            "counselor_id": "ana",
            "date": "2024-03-18",
            "time": "10:30",
            "reason": "Course selection"
        });

        let (status, body) = send(&app.router, Method::POST, "/appointments", Some("u2"), Some(request)).await;
        assert_eq!(status, StatusCode::CREATED);

        let response: CreateAppointmentResponse = parse(&body);
        assert_eq!(response.appointment.requester_name, "Eva Soto");
        assert_eq!(response.appointment.counselor_name, "Ana Ruiz");
        assert_eq!(response.appointment.status, AppointmentStatus::Pending);
        assert_eq!(response.success_message, "Appointment booked with Ana Ruiz on March 18, 2024 at 10:30");
        assert_eq!(app.store.snapshot().len(), 3);
    }

    #[tokio::test]
    async fn test_create_appointment_status_codes() {
        let app = setup_test_app();
        let booking = |counselor: &str, date: &str, time: &str| {
            json!({ "counselor_id": counselor, "date": date, "time": time, "reason": "" })
        };

        let cases = [
            (None, booking("ana", "2024-03-18", "09:00"), StatusCode::UNAUTHORIZED, "NotAuthenticated"),
            (Some("ghost"), booking("ana", "2024-03-18", "09:00"), StatusCode::UNAUTHORIZED, "NotAuthenticated"),
            (Some("u2"), booking("  ", "2024-03-18", "09:00"), StatusCode::BAD_REQUEST, "NoCounselorSelected"),
            (Some("u2"), booking("ana", "", "09:00"), StatusCode::BAD_REQUEST, "MissingSchedule"),
            (Some("u2"), booking("ana", "18/03/2024", "09:00"), StatusCode::BAD_REQUEST, "InvalidDate"),
            (Some("u2"), booking("ana", "2024-03-18", "9am"), StatusCode::BAD_REQUEST, "InvalidTime"),
            (Some("u2"), booking("ana", "2024-03-15", "11:00"), StatusCode::CONFLICT, "DateAlreadyBooked"),
        ];

        for (user, request, expected_status, expected_code) in cases {
            let (status, body) = send(&app.router, Method::POST, "/appointments", user, Some(request)).await;
            assert_eq!(status, expected_status, "{}", expected_code);
            assert_eq!(parse::<ErrorResponse>(&body).code, expected_code);
        }

        assert_eq!(app.store.snapshot().len(), 2);
    }

    #[tokio::test]
    async fn test_booked_date_is_free_for_other_counselor() {
        let app = setup_test_app();
        let request = json!({ "counselor_id": "bruno", "date": "2024-03-15", "time": "09:00" });

        let (status, _) = send(&app.router, Method::POST, "/appointments", Some("u1"), Some(request)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_booking_defaults_follow_settings() {
        let app = setup_test_app();
        let (status, body) = send(&app.router, Method::GET, "/appointments/defaults", None, None).await;
        assert_eq!(status, StatusCode::OK);

        let defaults: BookingDefaultsResponse = parse(&body);
        assert_eq!(defaults.default_time, time("09:00"));
        assert_eq!(defaults.week_start, "sunday");
        assert_eq!(defaults.counselor_id.as_deref(), Some("ana"));

        let settings = SchedulerSettings {
            week_start: WeekStart::Monday,
            default_time: time("14:30"),
        };
        let state = AppState::new(
            Arc::new(MemoryAppointmentStore::default()),
            Arc::new(MemoryCounselorDirectory::new(Vec::new())),
            settings,
        );
        let router = super::router().with_state(state);

        let (_, body) = send(&router, Method::GET, "/appointments/defaults", None, None).await;
        let defaults: BookingDefaultsResponse = parse(&body);
        assert_eq!(defaults.default_time, time("14:30"));
        assert_eq!(defaults.week_start, "monday");
        assert_eq!(defaults.counselor_id, None);
    }
}
