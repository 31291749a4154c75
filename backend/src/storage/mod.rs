//! # Storage Module
//!
//! Keeps appointments and user profiles behind the subscribe/append boundary
//! defined in [`traits`]. The domain layer never sees which backend is in use.
//!
//! - **csv**: `appointments.csv` and `users.yaml` in a data directory
//! - **memory**: `watch`-channel stores for tests and embedding

pub mod csv;
pub mod memory;
pub mod traits;

pub use self::csv::{AppointmentRepository, CsvConnection, UserRepository};
pub use memory::{MemoryAppointmentStore, MemoryCounselorDirectory};
pub use traits::{AppointmentSnapshot, AppointmentStore, CounselorDirectory, DirectorySnapshot};
