//! Half-open stay intervals measured in calendar nights.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("check-out date must be strictly after the check-in date")]
pub struct InvalidStay;

/// Dates are stored as `YYYY-MM-DD` text and compared as strings, which only
/// orders correctly for four-digit years.
pub fn is_storable(date: NaiveDate) -> bool {
    (1..=9999).contains(&date.year())
}

/// A stay `[check_in, check_out)`.
///
/// A guest leaving on day D does not occupy the night of D, so a departure and
/// an arrival on the same day never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StayDates {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl StayDates {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, InvalidStay> {
        if check_out <= check_in {
            return Err(InvalidStay);
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    /// Rebuild from a row; the table CHECK constraint already guarantees ordering.
    pub(crate) fn from_stored(check_in: NaiveDate, check_out: NaiveDate) -> Self {
        Self {
            check_in,
            check_out,
        }
    }

    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    pub fn nights(&self) -> u32 {
        let days = (self.check_out - self.check_in).num_days();
        u32::try_from(days).unwrap_or(u32::MAX)
    }

    pub fn overlaps(&self, other: &StayDates) -> bool {
        self.check_in < other.check_out && self.check_out > other.check_in
    }

    /// True when a guest of this stay is on site the night of `date`.
    pub fn occupies(&self, date: NaiveDate) -> bool {
        self.check_in <= date && self.check_out > date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    fn stay(a: (u32, u32), b: (u32, u32)) -> StayDates {
        StayDates::new(day(a.0, a.1), day(b.0, b.1)).unwrap()
    }

    #[test]
    fn rejects_zero_and_negative_nights() {
        assert_eq!(StayDates::new(day(1, 10), day(1, 10)), Err(InvalidStay));
        assert_eq!(StayDates::new(day(1, 12), day(1, 10)), Err(InvalidStay));
    }

    #[test]
    fn nights_is_day_count() {
        assert_eq!(stay((1, 10), (1, 12)).nights(), 2);
        assert_eq!(stay((1, 31), (2, 1)).nights(), 1);
        assert_eq!(stay((2, 27), (3, 2)).nights(), 3);
    }

    #[test]
    fn back_to_back_stays_do_not_overlap() {
        let first = stay((1, 10), (1, 12));
        let second = stay((1, 12), (1, 14));
        assert!(!first.overlaps(&second));
        assert!(!second.overlaps(&first));
    }

    #[test]
    fn shared_night_overlaps_both_ways() {
        let first = stay((1, 10), (1, 13));
        let second = stay((1, 12), (1, 14));
        assert!(first.overlaps(&second));
        assert!(second.overlaps(&first));

        let outer = stay((1, 1), (1, 31));
        let inner = stay((1, 5), (1, 6));
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn occupancy_excludes_departure_day() {
        let s = stay((1, 10), (1, 12));
        assert!(!s.occupies(day(1, 9)));
        assert!(s.occupies(day(1, 10)));
        assert!(s.occupies(day(1, 11)));
        assert!(!s.occupies(day(1, 12)));
    }
}
