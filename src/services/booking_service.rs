//! BookingService: the booking lifecycle controller.
//!
//! Creation always yields a `pending` booking after an advisory capacity
//! check. Confirmation goes through the atomic admission path; cancellation
//! and deletion never look at capacity. This is the only writer of `status`.

use super::booking_store::{BookingStore, ListFilter, StoreError};
use super::capacity::{Admission, CapacityChecker, CapacityTable};
use crate::models::{Booking, BookingDraft, BookingStatus, DraftError, PackageType, StayDates};
use chrono::NaiveDate;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum BookingError {
    #[error(transparent)]
    InvalidDraft(#[from] DraftError),
    #[error("invalid status `{0}`: expected `confirmed` or `cancelled`")]
    InvalidStatus(String),
    /// Every operator target is currently reachable from every state, so this
    /// only fires once a pair is removed from the transition table.
    #[error("cannot move booking from `{from}` to `{to}`")]
    IllegalTransition {
        from: BookingStatus,
        to: BookingStatus,
    },
    #[error("invalid date filter: start date {start} is after end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error("{tier} is fully booked between {check_in} and {check_out}")]
    CapacityExceeded {
        tier: PackageType,
        check_in: NaiveDate,
        check_out: NaiveDate,
    },
    #[error("booking `{0}` not found")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl BookingError {
    fn capacity(tier: PackageType, stay: &StayDates) -> Self {
        BookingError::CapacityExceeded {
            tier,
            check_in: stay.check_in(),
            check_out: stay.check_out(),
        }
    }
}

pub type BookingResult<T> = Result<T, BookingError>;

#[derive(Clone)]
pub struct BookingService {
    store: BookingStore,
    checker: CapacityChecker,
}

impl BookingService {
    pub fn new(store: BookingStore, capacity: CapacityTable) -> Self {
        Self {
            checker: CapacityChecker::new(store.clone(), capacity),
            store,
        }
    }

    /// Validate a draft and persist it as `pending`.
    ///
    /// Refuses drafts whose tier is already saturated for the requested
    /// nights. Passing this check does not hold a slot.
    pub async fn create(&self, draft: BookingDraft, added_by: Option<String>) -> BookingResult<Booking> {
        let new = draft.validate(added_by)?;

        if !self.checker.has_capacity(new.package_type, &new.stay).await? {
            warn!(
                tier = %new.package_type,
                check_in = %new.stay.check_in(),
                check_out = %new.stay.check_out(),
                "refusing booking request: tier fully booked"
            );
            return Err(BookingError::capacity(new.package_type, &new.stay));
        }

        let booking = self.store.insert(&new).await?;
        info!(
            id = %booking.id,
            tier = %booking.package_type,
            nights = booking.nights,
            public = booking.added_by.is_none(),
            "booking request created"
        );
        Ok(booking)
    }

    pub async fn list(&self, filter: ListFilter) -> BookingResult<Vec<Booking>> {
        if let (Some(start), Some(end)) = (filter.check_in_from, filter.check_in_to) {
            if start > end {
                return Err(BookingError::InvalidRange { start, end });
            }
        }
        Ok(self.store.list(&filter).await?)
    }

    /// Apply an operator status change (`confirmed` or `cancelled`).
    pub async fn update_status(&self, id: &str, requested: &str) -> BookingResult<Booking> {
        let target = BookingStatus::parse_target(requested)
            .ok_or_else(|| BookingError::InvalidStatus(requested.to_string()))?;
        let current = self.fetch(id).await?;

        if !current.status.can_transition_to(target) {
            return Err(BookingError::IllegalTransition {
                from: current.status,
                to: target,
            });
        }

        let updated = if target.requires_admission() {
            match self.checker.admit(&current).await? {
                Admission::Admitted(booking) => booking,
                Admission::Saturated => {
                    warn!(id = %current.id, tier = %current.package_type, "confirmation refused: capacity exceeded");
                    return Err(BookingError::capacity(current.package_type, &current.stay()));
                }
                Admission::Vanished => return Err(BookingError::NotFound(id.to_string())),
            }
        } else {
            self.store
                .set_status(current.id, target)
                .await?
                .ok_or_else(|| BookingError::NotFound(id.to_string()))?
        };

        info!(id = %updated.id, from = %current.status, to = %updated.status, "booking status changed");
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> BookingResult<Uuid> {
        let uuid = parse_id(id)?;
        if !self.store.delete(uuid).await? {
            return Err(BookingError::NotFound(id.to_string()));
        }
        info!(id = %uuid, "booking deleted");
        Ok(uuid)
    }

    async fn fetch(&self, id: &str) -> BookingResult<Booking> {
        let uuid = parse_id(id)?;
        self.store
            .find(uuid)
            .await?
            .ok_or_else(|| BookingError::NotFound(id.to_string()))
    }
}

/// An id that is not a UUID cannot name any stored booking.
fn parse_id(id: &str) -> BookingResult<Uuid> {
    Uuid::parse_str(id.trim()).map_err(|_| BookingError::NotFound(id.to_string()))
}
