//! # Counselor Scheduler Backend
//!
//! Booking of counselor appointments on top of a shared appointment store.
//!
//! ```text
//! IO Layer (REST API, axum handlers)
//!     ↓
//! Domain Layer (calendar, availability, visibility, validation, scheduler)
//!     ↓
//! Storage Layer (AppointmentStore / CounselorDirectory: CSV + YAML, in-memory)
//! ```
//!
//! Stores push the full collection to subscribers over `tokio::sync::watch`;
//! every request and every scheduler session reads the latest snapshot.

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderName, HeaderValue, Method},
    Router,
};
use log::{error, info};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;

use crate::config::AppConfig;
use crate::domain::{BookingError, BookingService, CalendarService, SchedulerSettings};
use crate::io::rest::USER_ID_HEADER;
use crate::storage::{
    AppointmentRepository, AppointmentSnapshot, AppointmentStore, CounselorDirectory, CsvConnection, DirectorySnapshot,
    UserRepository,
};

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub appointment_store: Arc<dyn AppointmentStore>,
    pub directory: Arc<dyn CounselorDirectory>,
    pub booking_service: BookingService,
    pub calendar_service: CalendarService,
    pub settings: SchedulerSettings,
}

impl AppState {
    pub fn new(
        appointment_store: Arc<dyn AppointmentStore>,
        directory: Arc<dyn CounselorDirectory>,
        settings: SchedulerSettings,
    ) -> Self {
        Self {
            booking_service: BookingService::new(appointment_store.clone()),
            calendar_service: CalendarService::new(settings.week_start),
            appointment_store,
            directory,
            settings,
        }
    }

    /// Latest full appointment collection
    pub fn appointments(&self) -> Result<AppointmentSnapshot, BookingError> {
        let receiver = self
            .appointment_store
            .subscribe()
            .map_err(|e| BookingError::StoreUnavailable(e.to_string()))?;
        let snapshot = receiver.borrow().clone();
        Ok(snapshot)
    }

    /// Latest user directory
    pub fn profiles(&self) -> Result<DirectorySnapshot, BookingError> {
        let receiver = self
            .directory
            .subscribe()
            .map_err(|e| BookingError::StoreUnavailable(e.to_string()))?;
        let snapshot = receiver.borrow().clone();
        Ok(snapshot)
    }
}

/// Open the file-backed stores and build the application state
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!("Setting up data directory {}", config.data_directory.display());
    let connection = CsvConnection::new(&config.data_directory)
        .with_context(|| format!("Failed to open data directory {}", config.data_directory.display()))?;

    info!("Setting up stores");
    let appointments = Arc::new(AppointmentRepository::new(connection.clone())?);
    let users = Arc::new(UserRepository::new(connection)?);

    if let Some(interval) = config.reload_interval() {
        spawn_reload_task(appointments.clone(), users.clone(), interval);
    }

    info!("Setting up application state");
    Ok(AppState::new(appointments, users, config.scheduler_settings()))
}

/// Periodically pick up changes written to the data files by other processes
pub fn spawn_reload_task(
    appointments: Arc<AppointmentRepository>,
    users: Arc<UserRepository>,
    period: Duration,
) -> tokio::task::JoinHandle<()> {
    info!("Polling data files every {:?}", period);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            if let Err(e) = appointments.reload().await {
                error!("Appointment reload failed: {:#}", e);
            }
            if let Err(e) = users.reload() {
                error!("User directory reload failed: {:#}", e);
            }
        }
    })
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, cors_origin: &str) -> Result<Router> {
    let origin = cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin: {}", cors_origin))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            HeaderName::from_static(USER_ID_HEADER),
        ]);

    Ok(Router::new()
        .nest("/api", io::rest::router())
        .layer(cors)
        .with_state(app_state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryAppointmentStore, MemoryCounselorDirectory};
    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::util::ServiceExt; // for `oneshot`

    fn app_state() -> AppState {
        AppState::new(
            Arc::new(MemoryAppointmentStore::default()),
            Arc::new(MemoryCounselorDirectory::new(Vec::new())),
            SchedulerSettings::default(),
        )
    }

    #[tokio::test]
    async fn test_router_serves_api_with_cors() {
        let app = create_router(app_state(), "http://localhost:8080").unwrap();
        let request = Request::builder()
            .uri("/api/counselors")
            .header("origin", "http://localhost:8080")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "http://localhost:8080"
        );
    }

    #[test]
    fn test_router_rejects_invalid_origin() {
        assert!(create_router(app_state(), "http://bad\norigin").is_err());
    }

    #[tokio::test]
    async fn test_initialize_backend_creates_data_files() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = AppConfig {
            data_directory: temp_dir.path().join("data"),
            reload_interval_secs: 0,
            ..AppConfig::default()
        };

        let state = initialize_backend(&config).await.unwrap();
        assert!(state.appointments().unwrap().is_empty());
        assert!(state.profiles().unwrap().is_empty());
        assert!(config.data_directory.join("appointments.csv").exists());
    }
}
