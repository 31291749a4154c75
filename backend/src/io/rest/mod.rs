//! # REST API Interface Layer
//!
//! JSON endpoints under `/api`:
//!
//! | Method | Path                          | Handler                  |
//! |--------|-------------------------------|--------------------------|
//! | GET    | `/appointments`               | appointments visible to the caller |
//! | POST   | `/appointments`               | validate and book        |
//! | GET    | `/appointments/defaults`      | booking form defaults    |
//! | GET    | `/counselors`                 | counselor directory      |
//! | GET    | `/calendar/month`             | rendered month with booked days |
//! | GET    | `/calendar/booked-dates`      | booked dates of a counselor |
//!
//! The caller is identified by the `x-user-id` header and resolved against
//! the user directory. Authentication happens upstream of this service.

pub mod appointment_apis;
pub mod calendar_apis;
pub mod counselor_apis;

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    Router,
};
use shared::{Actor, ErrorResponse, UserProfile};

use crate::domain::models::{resolve_actor, BookingError};
use crate::AppState;

/// Header carrying the uid of the signed-in user
pub const USER_ID_HEADER: &str = "x-user-id";

/// All API routes, to be nested under `/api`
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(appointment_apis::router())
        .merge(counselor_apis::router())
        .nest("/calendar", calendar_apis::router())
}

/// Resolve the caller from the user-id header. Unknown or missing uids are anonymous.
pub(crate) fn request_actor(headers: &HeaderMap, profiles: &[UserProfile]) -> Option<Actor> {
    let uid = headers.get(USER_ID_HEADER)?.to_str().ok()?;
    resolve_actor(profiles, uid)
}

pub(crate) fn error_response(status: StatusCode, code: &str, message: impl Into<String>) -> Response {
    let body = ErrorResponse {
        code: code.to_string(),
        message: message.into(),
    };
    (status, Json(body)).into_response()
}

pub(crate) fn status_for(error: &BookingError) -> StatusCode {
    match error {
        BookingError::NotAuthenticated => StatusCode::UNAUTHORIZED,
        BookingError::NoCounselorSelected | BookingError::MissingSchedule => StatusCode::BAD_REQUEST,
        BookingError::DateAlreadyBooked { .. } => StatusCode::CONFLICT,
        BookingError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

pub(crate) fn booking_error_response(error: &BookingError) -> Response {
    error_response(status_for(error), error.code(), error.to_string())
}

#[cfg(test)]
pub(crate) mod test_app {
    use axum::{
        body::{Body, Bytes},
        http::{Method, Request},
        Router,
    };
    use serde::de::DeserializeOwned;
    use std::sync::Arc;
    use tower::util::ServiceExt; // for `oneshot`

    use super::*;
    use crate::domain::test_support::{appointment, profile};
    use crate::domain::SchedulerSettings;
    use crate::storage::{MemoryAppointmentStore, MemoryCounselorDirectory};

    pub struct TestApp {
        pub router: Router,
        pub store: Arc<MemoryAppointmentStore>,
    }

    /// u1 booked Ana on 2024-03-15, u2 booked Bruno on 2024-03-20
    pub fn setup_test_app() -> TestApp {
        let store = Arc::new(MemoryAppointmentStore::new(vec![
            appointment("a1", "u1", "ana", "2024-03-15"),
            appointment("a2", "u2", "bruno", "2024-03-20"),
        ]));
        let directory = Arc::new(MemoryCounselorDirectory::new(vec![
            profile("root", "Admin", "", true, false),
            profile("ana", "Ana", "Ruiz", false, true),
            profile("bruno", "Bruno", "Diaz", false, true),
            profile("u1", "Luis", "Perez", false, false),
            profile("u2", "Eva", "Soto", false, false),
        ]));

        let app_state = AppState::new(store.clone(), directory, SchedulerSettings::default());
        TestApp {
            router: router().with_state(app_state),
            store,
        }
    }

    pub async fn send(
        router: &Router,
        method: Method,
        uri: &str,
        user: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, Bytes) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(uid) = user {
            request = request.header(USER_ID_HEADER, uid);
        }
        let request = match body {
            Some(json) => request
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body)
    }

    pub fn parse<T: DeserializeOwned>(body: &[u8]) -> T {
        serde_json::from_slice(body).unwrap()
    }
}
