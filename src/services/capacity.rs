//! Admission control: does one more confirmed stay fit in a tier?

use super::booking_store::{BookingStore, StoreResult};
use crate::models::{Booking, BookingStatus, PackageType, StayDates};
use std::collections::HashMap;
use tracing::debug;

/// Concurrent-stay limit per tier. A tier without an entry is unlimited.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapacityTable {
    limits: HashMap<PackageType, u32>,
}

impl Default for CapacityTable {
    /// The site's fixed layout: tents are unlimited, 5 cottages, 3 luxury cottages.
    fn default() -> Self {
        Self::unlimited()
            .with_limit(PackageType::Cottage, 5)
            .with_limit(PackageType::LuxuryCottage, 3)
    }
}

impl CapacityTable {
    pub fn unlimited() -> Self {
        Self {
            limits: HashMap::new(),
        }
    }

    pub fn with_limit(mut self, tier: PackageType, limit: u32) -> Self {
        self.limits.insert(tier, limit);
        self
    }

    pub fn limit(&self, tier: PackageType) -> Option<u32> {
        self.limits.get(&tier).copied()
    }

    /// Pure admission decision given how many confirmed stays already overlap.
    pub fn fits(&self, tier: PackageType, overlapping: u32) -> bool {
        match self.limit(tier) {
            None => true,
            Some(limit) => overlapping < limit,
        }
    }
}

/// Outcome of an atomic confirmation attempt.
#[derive(Debug)]
pub enum Admission {
    Admitted(Booking),
    Saturated,
    /// The row disappeared before it could be confirmed.
    Vanished,
}

#[derive(Clone)]
pub struct CapacityChecker {
    store: BookingStore,
    table: CapacityTable,
}

impl CapacityChecker {
    pub fn new(store: BookingStore, table: CapacityTable) -> Self {
        Self { store, table }
    }

    /// Advisory check: would one more confirmed stay of `tier` over `stay` fit?
    ///
    /// Reserves nothing. Unlimited tiers never touch the store.
    pub async fn has_capacity(&self, tier: PackageType, stay: &StayDates) -> StoreResult<bool> {
        if self.table.limit(tier).is_none() {
            return Ok(true);
        }
        let overlapping = self.store.count_confirmed_overlapping(tier, stay).await?;
        debug!(%tier, overlapping, "capacity check");
        Ok(self.table.fits(tier, overlapping))
    }

    /// Confirm `booking` if its tier still has room for its stored dates.
    ///
    /// The count and the status write are a single conditional statement.
    pub async fn admit(&self, booking: &Booking) -> StoreResult<Admission> {
        let written = match self.table.limit(booking.package_type) {
            None => {
                self.store
                    .set_status(booking.id, BookingStatus::Confirmed)
                    .await?
            }
            Some(limit) => self.store.confirm_within_limit(booking.id, limit).await?,
        };

        if let Some(confirmed) = written {
            return Ok(Admission::Admitted(confirmed));
        }
        match self.store.find(booking.id).await? {
            Some(_) => Ok(Admission::Saturated),
            None => Ok(Admission::Vanished),
        }
    }
}
