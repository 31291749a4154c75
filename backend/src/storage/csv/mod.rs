//! File-backed stores: appointments in CSV, user profiles in YAML.

pub mod appointment_repository;
pub mod connection;
pub mod user_repository;

#[cfg(test)]
pub mod test_utils;

pub use appointment_repository::AppointmentRepository;
pub use connection::CsvConnection;
pub use user_repository::UserRepository;
