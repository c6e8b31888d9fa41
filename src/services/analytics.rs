//! Occupancy and popularity summaries over confirmed bookings.
//!
//! `AnalyticsService` aggregates in SQL and shapes the rows for the dashboard.
//! The pure functions over a booking slice compute the same figures in memory
//! and share the shaping helpers. Each query reads independently, so a status
//! change between two of them can show up in one but not the other.

use super::booking_store::{BookingStore, StoreResult};
use crate::models::{Booking, BookingStatus, PackageType};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_bookings: u64,
    pub total_guests: u64,
}

/// A labelled count as consumed by the dashboard charts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedCount {
    pub name: String,
    pub value: u64,
}

impl NamedCount {
    fn new(name: &str, value: u64) -> Self {
        Self {
            name: name.to_string(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyCount {
    /// `YYYY-MM` of the booking's creation time.
    pub month: String,
    pub bookings: u64,
}

/// Confirmed bookings, restricted to guests on site the night of `on` if given.
fn in_scope(bookings: &[Booking], on: Option<NaiveDate>) -> impl Iterator<Item = &Booking> {
    bookings.iter().filter(move |b| {
        b.status == BookingStatus::Confirmed && on.is_none_or(|date| b.stay().occupies(date))
    })
}

fn count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

fn food_pair(veg: u64, non_veg: u64) -> Vec<NamedCount> {
    food_pair(veg, non_veg)
}

/// Most popular first, zero tiers dropped, ties in tier declaration order.
fn rank_packages(counts: impl IntoIterator<Item = (PackageType, u64)>) -> Vec<NamedCount> {
    let mut per_tier = [0u64; PackageType::ALL.len()];
    for (tier, n) in counts {
        if let Some(slot) = PackageType::ALL.iter().position(|t| *t == tier) {
            per_tier[slot] += n;
        }
    }

    let mut ranked: Vec<NamedCount> = PackageType::ALL
        .iter()
        .zip(per_tier)
        .filter(|(_, n)| *n > 0)
        .map(|(tier, n)| NamedCount::new(tier.display_name(), n))
        .collect();
    ranked.sort_by(|a, b| b.value.cmp(&a.value));
    ranked
}

pub fn overview(bookings: &[Booking], on: Option<NaiveDate>) -> Overview {
    in_scope(bookings, on).fold(Overview::default(), |mut acc, b| {
        acc.total_bookings += 1;
        acc.total_guests += u64::from(b.guests);
        acc
    })
}

/// Always two entries, `Veg` then `Non-Veg`, zero when nothing matches.
pub fn food_distribution(bookings: &[Booking], on: Option<NaiveDate>) -> Vec<NamedCount> {
    let (veg, non_veg) = in_scope(bookings, on).fold((0u64, 0u64), |(veg, non_veg), b| {
        (veg + u64::from(b.veg_guests), non_veg + u64::from(b.non_veg_guests))
    });
    food_pair(veg, non_veg)
}

/// Booking count per tier, most popular first. Tiers with no bookings are
/// omitted; ties keep tier declaration order.
pub fn package_distribution(bookings: &[Booking], on: Option<NaiveDate>) -> Vec<NamedCount> {
    rank_packages(in_scope(bookings, on).map(|b| (b.package_type, 1)))
}

/// Confirmed bookings per creation month, oldest month first.
pub fn monthly_trend(bookings: &[Booking]) -> Vec<MonthlyCount> {
    let mut months: BTreeMap<String, u64> = BTreeMap::new();
    for b in in_scope(bookings, None) {
        *months.entry(b.created_at.format("%Y-%m").to_string()).or_insert(0) += 1;
    }
    months
        .into_iter()
        .map(|(month, bookings)| MonthlyCount { month, bookings })
        .collect()
}

#[derive(Clone)]
pub struct AnalyticsService {
    store: BookingStore,
}

impl AnalyticsService {
    pub fn new(store: BookingStore) -> Self {
        Self { store }
    }

    pub async fn overview(&self, on: Option<NaiveDate>) -> StoreResult<Overview> {
        let totals = self.store.confirmed_totals(on).await?;
        Ok(Overview {
            total_bookings: count(totals.bookings),
            total_guests: count(totals.guests),
        })
    }

    pub async fn food(&self, on: Option<NaiveDate>) -> StoreResult<Vec<NamedCount>> {
        let totals = self.store.confirmed_totals(on).await?;
        Ok(food_pair(count(totals.veg_guests), count(totals.non_veg_guests)))
    }

    pub async fn packages(&self, on: Option<NaiveDate>) -> StoreResult<Vec<NamedCount>> {
        let rows = self.store.confirmed_per_tier(on).await?;
        Ok(rank_packages(rows.into_iter().map(|(tier, n)| (tier, count(n)))))
    }

    /// Ignores any reference date: this is about when bookings were made.
    pub async fn monthly(&self) -> StoreResult<Vec<MonthlyCount>> {
        let rows = self.store.confirmed_per_month().await?;
        Ok(rows
            .into_iter()
            .map(|(month, n)| MonthlyCount {
                month,
                bookings: count(n),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    fn booking(
        tier: PackageType,
        status: BookingStatus,
        stay: ((u32, u32), (u32, u32)),
        veg: u32,
        non_veg: u32,
        created: (i32, u32),
    ) -> Booking {
        let check_in = day(stay.0.0, stay.0.1);
        let check_out = day(stay.1.0, stay.1.1);
        let created_at = Utc.with_ymd_and_hms(created.0, created.1, 15, 9, 0, 0).unwrap();
        Booking {
            id: Uuid::new_v4(),
            package_type: tier,
            check_in,
            check_out,
            nights: (check_out - check_in).num_days() as u32,
            guests: veg + non_veg,
            veg_guests: veg,
            non_veg_guests: non_veg,
            food_preference: None,
            customer_name: "Guest".into(),
            customer_phone: "0".into(),
            status,
            added_by: None,
            created_at,
            updated_at: created_at,
        }
    }

    fn fixture() -> Vec<Booking> {
        use BookingStatus::*;
        use PackageType::*;
        vec![
            booking(Cottage, Confirmed, ((1, 10), (1, 12)), 2, 1, (2025, 1)),
            booking(Cottage, Confirmed, ((1, 11), (1, 13)), 0, 2, (2024, 12)),
            booking(LuxuryCottage, Confirmed, ((1, 12), (1, 14)), 1, 1, (2025, 1)),
            booking(NormalTent, Confirmed, ((2, 1), (2, 3)), 4, 0, (2024, 11)),
            booking(LuxuryCottage, Pending, ((1, 10), (1, 12)), 5, 5, (2025, 1)),
            booking(Cottage, Cancelled, ((1, 10), (1, 12)), 3, 3, (2025, 2)),
        ]
    }

    #[test]
    fn overview_counts_confirmed_only() {
        let all = overview(&fixture(), None);
        assert_eq!(all, Overview { total_bookings: 4, total_guests: 11 });
    }

    #[test]
    fn overview_on_date_counts_guests_present_that_night() {
        let bookings = fixture();
        // Jan 11: first two cottages are on site
        assert_eq!(
            overview(&bookings, Some(day(1, 11))),
            Overview { total_bookings: 2, total_guests: 5 }
        );
        // Jan 12: first cottage departs, luxury cottage arrives
        assert_eq!(
            overview(&bookings, Some(day(1, 12))),
            Overview { total_bookings: 2, total_guests: 4 }
        );
    }

    #[test]
    fn empty_night_yields_zeros() {
        let bookings = fixture();
        let quiet = Some(day(6, 1));
        assert_eq!(overview(&bookings, quiet), Overview::default());
        assert_eq!(
            food_distribution(&bookings, quiet),
            vec![NamedCount::new("Veg", 0), NamedCount::new("Non-Veg", 0)]
        );
        assert!(package_distribution(&bookings, quiet).is_empty());
    }

    #[test]
    fn food_distribution_sums_counts() {
        assert_eq!(
            food_distribution(&fixture(), None),
            vec![NamedCount::new("Veg", 7), NamedCount::new("Non-Veg", 4)]
        );
    }

    #[test]
    fn packages_ranked_descending_with_stable_ties() {
        assert_eq!(
            package_distribution(&fixture(), None),
            vec![
                NamedCount::new("Cottage", 2),
                NamedCount::new("Normal Tent", 1),
                NamedCount::new("Luxury Cottage", 1),
            ]
        );
    }

    #[test]
    fn monthly_trend_is_chronological_regardless_of_input_order() {
        let mut bookings = fixture();
        bookings.reverse();
        assert_eq!(
            monthly_trend(&bookings),
            vec![
                MonthlyCount { month: "2024-11".into(), bookings: 1 },
                MonthlyCount { month: "2024-12".into(), bookings: 1 },
                MonthlyCount { month: "2025-01".into(), bookings: 2 },
            ]
        );
    }

    async fn seeded_service(rows: &[Booking]) -> AnalyticsService {
        let pool = std::sync::Arc::new(crate::db::memory_pool().await.unwrap());
        for b in rows {
            sqlx::query(
                "INSERT INTO bookings (
                    id, package_type, check_in, check_out, nights, guests,
                    veg_guests, non_veg_guests, food_preference, customer_name,
                    customer_phone, status, added_by, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(b.id)
            .bind(b.package_type)
            .bind(b.check_in)
            .bind(b.check_out)
            .bind(b.nights)
            .bind(b.guests)
            .bind(b.veg_guests)
            .bind(b.non_veg_guests)
            .bind(b.food_preference)
            .bind(&b.customer_name)
            .bind(&b.customer_phone)
            .bind(b.status)
            .bind(b.added_by.as_deref())
            .bind(b.created_at)
            .bind(b.updated_at)
            .execute(&*pool)
            .await
            .unwrap();
        }
        AnalyticsService::new(BookingStore::new(pool))
    }

    #[tokio::test]
    async fn sql_aggregates_match_in_memory_figures() {
        let bookings = fixture();
        let service = seeded_service(&bookings).await;

        for on in [None, Some(day(1, 11)), Some(day(1, 12)), Some(day(2, 2)), Some(day(6, 1))] {
            assert_eq!(service.overview(on).await.unwrap(), overview(&bookings, on), "{on:?}");
            assert_eq!(service.food(on).await.unwrap(), food_distribution(&bookings, on), "{on:?}");
            assert_eq!(
                service.packages(on).await.unwrap(),
                package_distribution(&bookings, on),
                "{on:?}"
            );
        }
        assert_eq!(service.monthly().await.unwrap(), monthly_trend(&bookings));
    }

    #[tokio::test]
    async fn departure_night_is_not_counted_in_sql() {
        let bookings = fixture();
        let service = seeded_service(&bookings).await;
        // Feb 3 is the tent's checkout day
        assert_eq!(service.overview(Some(day(2, 3))).await.unwrap(), Overview::default());
    }
}
