//! Core data models for the campsite booking service.
//!
//! These entities map to the `bookings` and `operators` tables via `sqlx::FromRow` / `sqlx::Type`
//! and serialize as camelCase JSON via `serde`.

pub mod booking;
pub mod operator;
pub mod package;
pub mod status;
pub mod stay;

pub use booking::{Booking, BookingDraft, BookingView, DraftError, NewBooking};
pub use operator::{Credentials, Operator, OperatorSummary, Registration};
pub use package::{FoodPreference, PackageType};
pub use status::BookingStatus;
pub use stay::{InvalidStay, StayDates, is_storable};
