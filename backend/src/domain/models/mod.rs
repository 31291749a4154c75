pub mod actor;
pub mod booking;

pub use actor::{counselor_directory, resolve_actor};
pub use booking::{BookingError, BookingProposal};
