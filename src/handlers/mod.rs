//! HTTP adapters. Handlers check the caller's role, decode input and delegate
//! to the services; they hold no booking logic of their own.

pub mod analytics_handlers;
pub mod auth_handlers;
pub mod booking_handlers;
pub mod health_handlers;

use crate::{errors::AppError, models::is_storable};
use chrono::NaiveDate;

/// Parse an optional `YYYY-MM-DD` query value. Empty counts as absent.
fn parse_date_param(name: &str, raw: Option<String>) -> Result<Option<NaiveDate>, AppError> {
    let Some(raw) = raw else { return Ok(None) };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .filter(|date| is_storable(*date))
        .map(Some)
        .ok_or_else(|| AppError::validation(format!("`{name}` must be a date formatted YYYY-MM-DD, got `{raw}`")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_params() {
        assert_eq!(parse_date_param("date", None).unwrap(), None);
        assert_eq!(parse_date_param("date", Some("  ".into())).unwrap(), None);
        assert_eq!(
            parse_date_param("date", Some("2025-01-12".into())).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 12)
        );
        for bad in ["12/01/2025", "+10000-01-01"] {
            let err = parse_date_param("date", Some(bad.into())).unwrap_err();
            assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST, "{bad}");
        }
    }
}
