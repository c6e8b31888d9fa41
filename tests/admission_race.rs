//! Many managers confirming the same nights at once must never overfill a tier.

use campsite_bookings::{
    db,
    models::{BookingDraft, BookingStatus, PackageType},
    services::{
        booking_service::{BookingError, BookingService},
        booking_store::{BookingStore, ListFilter},
        capacity::CapacityTable,
    },
};
use chrono::NaiveDate;
use futures::future::join_all;
use std::sync::Arc;
use tempfile::tempdir;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
}

fn draft(check_in: u32, check_out: u32) -> BookingDraft {
    BookingDraft {
        package_type: Some(PackageType::LuxuryCottage),
        check_in: Some(day(check_in)),
        check_out: Some(day(check_out)),
        guests: Some(2),
        customer_name: Some("Racer".into()),
        customer_phone: Some("000".into()),
        ..BookingDraft::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_confirmations_respect_capacity() {
    let dir = tempdir().expect("tempdir");
    let url = format!("sqlite://{}", dir.path().join("race.db").display());
    let pool = Arc::new(db::connect(&url).await.expect("connect"));
    db::migrate(&pool).await.expect("migrate");

    let limit = 3;
    let store = BookingStore::new(pool);
    let service = BookingService::new(
        store.clone(),
        CapacityTable::unlimited().with_limit(PackageType::LuxuryCottage, limit),
    );

    // overlapping stays with staggered arrivals and departures
    let mut ids = Vec::new();
    for i in 0..12u32 {
        let check_in = 10 + i % 3;
        let booking = service
            .create(draft(check_in, check_in + 2), None)
            .await
            .expect("create pending");
        ids.push(booking.id.to_string());
    }

    let attempts = ids.iter().map(|id| {
        let service = service.clone();
        let id = id.clone();
        tokio::spawn(async move { service.update_status(&id, "confirmed").await })
    });
    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.expect("task panicked"))
        .collect();

    let admitted = results.iter().filter(|r| r.is_ok()).count();
    assert!(admitted >= limit as usize, "at least {limit} stays fit, got {admitted}");
    for result in &results {
        if let Err(err) = result {
            assert!(
                matches!(err, BookingError::CapacityExceeded { .. }),
                "unexpected failure: {err}"
            );
        }
    }

    let confirmed: Vec<_> = store
        .list(&ListFilter::default())
        .await
        .expect("list")
        .into_iter()
        .filter(|b| b.status == BookingStatus::Confirmed)
        .collect();
    assert_eq!(confirmed.len(), admitted);

    for night in 9..16 {
        let on_site = confirmed
            .iter()
            .filter(|b| b.stay().occupies(day(night)))
            .count();
        assert!(
            on_site <= limit as usize,
            "night {night}: {on_site} luxury cottages confirmed, limit {limit}"
        );
    }
}
