//! The reservation record and the payload a guest submits to request one.

use super::{BookingStatus, FoodPreference, InvalidStay, OperatorSummary, PackageType, StayDates, is_storable};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

/// A stored reservation.
///
/// `nights` is derived from the stay dates at insert time and never accepted
/// from callers.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub package_type: PackageType,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub nights: u32,
    pub guests: u32,
    pub veg_guests: u32,
    pub non_veg_guests: u32,

    /// Legacy meal summary from older rows; see [`Booking::food_hint`].
    #[serde(skip_serializing)]
    pub food_preference: Option<FoodPreference>,

    pub customer_name: String,
    pub customer_phone: String,
    pub status: BookingStatus,

    /// Operator subject that entered the booking; `None` for public requests.
    pub added_by: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn stay(&self) -> StayDates {
        StayDates::from_stored(self.check_in, self.check_out)
    }

    /// Display hint for the meal plan. The per-guest counts win; the stored
    /// legacy value is only used when the counts say nothing.
    pub fn food_hint(&self) -> Option<FoodPreference> {
        match (self.veg_guests, self.non_veg_guests) {
            (0, 0) => self.food_preference,
            (_, 0) => Some(FoodPreference::Veg),
            (0, _) => Some(FoodPreference::NonVeg),
            _ => None,
        }
    }
}

/// Outbound JSON shape of a booking, carrying the derived `foodPreference`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingView<'a> {
    #[serde(flatten)]
    booking: &'a Booking,
    food_preference: Option<FoodPreference>,
    /// Present in listings when `addedBy` names a registered operator.
    #[serde(skip_serializing_if = "Option::is_none")]
    added_by_operator: Option<&'a OperatorSummary>,
}

impl<'a> BookingView<'a> {
    pub fn with_operator(mut self, operator: Option<&'a OperatorSummary>) -> Self {
        self.added_by_operator = operator;
        self
    }
}

impl<'a> From<&'a Booking> for BookingView<'a> {
    fn from(booking: &'a Booking) -> Self {
        Self {
            booking,
            food_preference: booking.food_hint(),
            added_by_operator: None,
        }
    }
}

/// Booking request as submitted. Every field is optional on the wire so that
/// missing values surface as validation messages instead of decode failures.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDraft {
    pub package_type: Option<PackageType>,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub guests: Option<u32>,
    pub veg_guests: Option<u32>,
    pub non_veg_guests: Option<u32>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error(transparent)]
    InvalidStay(#[from] InvalidStay),
    #[error("at least 1 guest is required")]
    NoGuests,
    #[error("{field} {date} is out of range: the year must have four digits")]
    DateOutOfRange { field: &'static str, date: NaiveDate },
    #[error("meal counts must add up to the number of guests ({guests}), got {meals}")]
    MealCountMismatch { guests: u32, meals: u64 },
}

/// A validated draft, ready to be persisted as a pending booking.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub package_type: PackageType,
    pub stay: StayDates,
    pub guests: u32,
    pub veg_guests: u32,
    pub non_veg_guests: u32,
    pub customer_name: String,
    pub customer_phone: String,
    pub added_by: Option<String>,
}

impl BookingDraft {
    /// Check required fields and the stay ordering.
    pub fn validate(self, added_by: Option<String>) -> Result<NewBooking, DraftError> {
        let package_type = self
            .package_type
            .ok_or(DraftError::Missing("package type"))?;
        let check_in = self.check_in.ok_or(DraftError::Missing("check-in date"))?;
        let check_out = self.check_out.ok_or(DraftError::Missing("check-out date"))?;
        for (field, date) in [("check-in date", check_in), ("check-out date", check_out)] {
            if !is_storable(date) {
                return Err(DraftError::DateOutOfRange { field, date });
            }
        }
        let stay = StayDates::new(check_in, check_out)?;

        let guests = self.guests.ok_or(DraftError::Missing("number of guests"))?;
        if guests < 1 {
            return Err(DraftError::NoGuests);
        }

        let veg_guests = self.veg_guests.unwrap_or(0);
        let non_veg_guests = self.non_veg_guests.unwrap_or(0);
        let meals = u64::from(veg_guests) + u64::from(non_veg_guests);
        if meals != 0 && meals != u64::from(guests) {
            return Err(DraftError::MealCountMismatch { guests, meals });
        }

        let customer_name = required_text(self.customer_name, "customer name")?;
        let customer_phone = required_text(self.customer_phone, "customer phone")?;

        Ok(NewBooking {
            package_type,
            stay,
            guests,
            veg_guests,
            non_veg_guests,
            customer_name,
            customer_phone,
            added_by,
        })
    }
}

fn required_text(value: Option<String>, field: &'static str) -> Result<String, DraftError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(DraftError::Missing(field)),
    }
}
