//! Booking lifecycle states and the transitions operators may apply.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

use BookingStatus::{Cancelled, Confirmed, Pending};

/// Every legal `(from, to)` pair. Nothing leads back into `Pending`.
const ALLOWED_TRANSITIONS: &[(BookingStatus, BookingStatus)] = &[
    (Pending, Confirmed),
    (Pending, Cancelled),
    (Confirmed, Cancelled),
    (Confirmed, Confirmed),
    (Cancelled, Confirmed),
    (Cancelled, Cancelled),
];

impl BookingStatus {
    /// Targets accepted from `PATCH /bookings/{id}/status`.
    pub const OPERATOR_TARGETS: [BookingStatus; 2] = [Confirmed, Cancelled];

    pub fn as_str(&self) -> &'static str {
        match self {
            Pending => "pending",
            Confirmed => "confirmed",
            Cancelled => "cancelled",
        }
    }

    /// Parse an operator-supplied target; `pending` and unknown values yield `None`.
    pub fn parse_target(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::OPERATOR_TARGETS
            .into_iter()
            .find(|candidate| candidate.as_str() == raw)
    }

    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        ALLOWED_TRANSITIONS.contains(&(self, next))
    }

    /// Whether entering this state must pass the admission check.
    pub fn requires_admission(self) -> bool {
        self == Confirmed
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_confirm_and_cancel_are_operator_targets() {
        assert_eq!(BookingStatus::parse_target("confirmed"), Some(Confirmed));
        assert_eq!(BookingStatus::parse_target(" cancelled "), Some(Cancelled));
        assert_eq!(BookingStatus::parse_target("pending"), None);
        assert_eq!(BookingStatus::parse_target("Confirmed"), None);
        assert_eq!(BookingStatus::parse_target(""), None);
    }

    #[test]
    fn nothing_returns_to_pending() {
        for from in [Pending, Confirmed, Cancelled] {
            assert!(!from.can_transition_to(Pending), "{from} -> pending");
        }
    }

    #[test]
    fn every_state_reaches_every_operator_target() {
        for from in [Pending, Confirmed, Cancelled] {
            for to in BookingStatus::OPERATOR_TARGETS {
                assert!(from.can_transition_to(to), "{from} -> {to}");
            }
        }
    }
}
