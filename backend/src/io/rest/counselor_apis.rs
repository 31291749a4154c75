use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use log::{error, info};
use shared::CounselorListResponse;

use super::booking_error_response;
use crate::domain::models::counselor_directory;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/counselors", get(list_counselors))
}

/// List everyone who can be booked, in directory order
pub async fn list_counselors(State(state): State<AppState>) -> Response {
    info!("GET /api/counselors");

    match state.profiles() {
        Ok(profiles) => {
            let response = CounselorListResponse {
                counselors: counselor_directory(&profiles),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to read user directory: {}", e);
            booking_error_response(&e)
        }
    }
}
