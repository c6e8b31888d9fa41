//! src/services/booking_store.rs
//!
//! BookingStore: durable reservation records backed by SQLite. It owns the
//! canonical copy of every booking; everything else reads snapshots through it.

use crate::models::{Booking, BookingStatus, NewBooking, PackageType, StayDates};
use chrono::{NaiveDate, Utc};
use sqlx::{QueryBuilder, SqlitePool, sqlite::Sqlite};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

const BOOKING_COLUMNS: &str = "id, package_type, check_in, check_out, nights, guests, \
     veg_guests, non_veg_guests, food_preference, customer_name, customer_phone, \
     status, added_by, created_at, updated_at";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Optional inclusive bounds on `check_in` for listings.
#[derive(Clone, Debug, Default)]
pub struct ListFilter {
    pub check_in_from: Option<NaiveDate>,
    pub check_in_to: Option<NaiveDate>,
}

#[derive(Clone)]
pub struct BookingStore {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,
}

impl BookingStore {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Persist a validated booking as `pending`.
    ///
    /// `nights` is computed here from the stay dates and nowhere else.
    pub async fn insert(&self, new: &NewBooking) -> StoreResult<Booking> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO bookings (
                id, package_type, check_in, check_out, nights, guests,
                veg_guests, non_veg_guests, food_preference, customer_name,
                customer_phone, status, added_by, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, NULL, ?, ?, ?, ?, ?, ?)
            RETURNING {BOOKING_COLUMNS}"
        );
        let booking = sqlx::query_as::<_, Booking>(&sql)
            .bind(Uuid::new_v4())
            .bind(new.package_type)
            .bind(new.stay.check_in())
            .bind(new.stay.check_out())
            .bind(new.stay.nights())
            .bind(new.guests)
            .bind(new.veg_guests)
            .bind(new.non_veg_guests)
            .bind(&new.customer_name)
            .bind(&new.customer_phone)
            .bind(BookingStatus::Pending)
            .bind(new.added_by.as_deref())
            .bind(now)
            .bind(now)
            .fetch_one(&*self.db)
            .await?;
        debug!(id = %booking.id, "inserted booking row");
        Ok(booking)
    }

    pub async fn find(&self, id: Uuid) -> StoreResult<Option<Booking>> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?");
        Ok(sqlx::query_as::<_, Booking>(&sql)
            .bind(id)
            .fetch_optional(&*self.db)
            .await?)
    }

    /// Bookings ordered most-recently-created first.
    pub async fn list(&self, filter: &ListFilter) -> StoreResult<Vec<Booking>> {
        let mut builder =
            QueryBuilder::<Sqlite>::new(format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE 1 = 1"));

        if let Some(from) = filter.check_in_from {
            builder.push(" AND check_in >= ");
            builder.push_bind(from);
        }
        if let Some(to) = filter.check_in_to {
            builder.push(" AND check_in <= ");
            builder.push_bind(to);
        }
        builder.push(" ORDER BY created_at DESC");

        Ok(builder.build_query_as::<Booking>().fetch_all(&*self.db).await?)
    }

    /// Count confirmed bookings of `tier` sharing at least one night with `stay`.
    pub async fn count_confirmed_overlapping(
        &self,
        tier: PackageType,
        stay: &StayDates,
    ) -> StoreResult<u32> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM bookings
             WHERE status = ? AND package_type = ?
               AND check_in < ? AND check_out > ?",
        )
        .bind(BookingStatus::Confirmed)
        .bind(tier)
        .bind(stay.check_out())
        .bind(stay.check_in())
        .fetch_one(&*self.db)
        .await?;
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    /// Unconditionally move a booking to `status`. `None` when no row matched.
    pub async fn set_status(&self, id: Uuid, status: BookingStatus) -> StoreResult<Option<Booking>> {
        let sql = format!(
            "UPDATE bookings SET status = ?, updated_at = ? WHERE id = ? RETURNING {BOOKING_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Booking>(&sql)
            .bind(status)
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&*self.db)
            .await?)
    }

    /// Confirm a booking only if fewer than `limit` other confirmed bookings of
    /// the same tier overlap its stay.
    ///
    /// The count and the write happen in one statement, so concurrent
    /// confirmations cannot both take the last slot. `None` means no row was
    /// written: either the booking is gone or its tier is saturated.
    pub async fn confirm_within_limit(&self, id: Uuid, limit: u32) -> StoreResult<Option<Booking>> {
        let sql = format!(
            "UPDATE bookings SET status = ?, updated_at = ?
             WHERE id = ?
               AND (
                   SELECT COUNT(*) FROM bookings AS other
                   WHERE other.id <> bookings.id
                     AND other.status = ?
                     AND other.package_type = bookings.package_type
                     AND other.check_in < bookings.check_out
                     AND other.check_out > bookings.check_in
               ) < ?
             RETURNING {BOOKING_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Booking>(&sql)
            .bind(BookingStatus::Confirmed)
            .bind(Utc::now())
            .bind(id)
            .bind(BookingStatus::Confirmed)
            .bind(i64::from(limit))
            .fetch_optional(&*self.db)
            .await?)
    }

    /// Remove a booking. Returns false when nothing matched.
    pub async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Head counts over confirmed bookings, limited to stays occupying `on`.
    pub async fn confirmed_totals(&self, on: Option<NaiveDate>) -> StoreResult<OccupancyTotals> {
        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT COUNT(*) AS bookings,
                    COALESCE(SUM(guests), 0) AS guests,
                    COALESCE(SUM(veg_guests), 0) AS veg_guests,
                    COALESCE(SUM(non_veg_guests), 0) AS non_veg_guests
             FROM bookings",
        );
        push_confirmed_scope(&mut builder, on);
        Ok(builder
            .build_query_as::<OccupancyTotals>()
            .fetch_one(&*self.db)
            .await?)
    }

    /// Confirmed booking count per tier. Tiers without bookings are absent.
    pub async fn confirmed_per_tier(&self, on: Option<NaiveDate>) -> StoreResult<Vec<(PackageType, i64)>> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT package_type, COUNT(*) FROM bookings");
        push_confirmed_scope(&mut builder, on);
        builder.push(" GROUP BY package_type");
        Ok(builder
            .build_query_as::<(PackageType, i64)>()
            .fetch_all(&*self.db)
            .await?)
    }

    /// Confirmed booking count per `YYYY-MM` of creation, oldest first.
    pub async fn confirmed_per_month(&self) -> StoreResult<Vec<(String, i64)>> {
        // created_at is RFC 3339 text, so its first seven characters are the month
        Ok(sqlx::query_as::<_, (String, i64)>(
            "SELECT substr(created_at, 1, 7) AS month, COUNT(*) FROM bookings
             WHERE status = ?
             GROUP BY month
             ORDER BY month ASC",
        )
        .bind(BookingStatus::Confirmed)
        .fetch_all(&*self.db)
        .await?)
    }
}

/// Aggregate row for [`BookingStore::confirmed_totals`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, sqlx::FromRow)]
pub struct OccupancyTotals {
    pub bookings: i64,
    pub guests: i64,
    pub veg_guests: i64,
    pub non_veg_guests: i64,
}

/// `WHERE` clause selecting confirmed stays, on site the night of `on` if given.
fn push_confirmed_scope(builder: &mut QueryBuilder<'_, Sqlite>, on: Option<NaiveDate>) {
    builder.push(" WHERE status = ");
    builder.push_bind(BookingStatus::Confirmed);
    if let Some(date) = on {
        builder.push(" AND check_in <= ");
        builder.push_bind(date);
        builder.push(" AND check_out > ");
        builder.push_bind(date);
    }
}
