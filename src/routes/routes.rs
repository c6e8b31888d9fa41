//! Defines routes for booking and analytics operations.
//!
//! ## Structure
//! - **Operator endpoints**
//!   - `POST   /auth/register` — create an operator (open until the first one exists, then owner)
//!   - `POST   /auth/login` — exchange email and password for a bearer token
//!
//! - **Booking endpoints**
//!   - `POST   /bookings` — submit a booking request (public)
//!   - `GET    /bookings` — list bookings, `?startDate=&endDate=` (manager, owner)
//!   - `PATCH  /bookings/{id}/status` — confirm or cancel (manager)
//!   - `DELETE /bookings/{id}` — delete (manager)
//!
//! - **Analytics endpoints** (owner), each but `monthly` accepting `?date=`
//!   - `GET /analytics/overview`
//!   - `GET /analytics/food`
//!   - `GET /analytics/packages`
//!   - `GET /analytics/monthly`

use crate::{
    handlers::{
        analytics_handlers::{food, monthly, overview, packages},
        auth_handlers::{login, register},
        booking_handlers::{create_booking, delete_booking, list_bookings, update_booking_status},
        health_handlers::{healthz, readyz},
    },
    state::AppState,
};
use axum::{
    Router,
    routing::{delete, get, patch, post},
};

/// Build and return the router for every endpoint.
///
/// The router carries shared state (`AppState`) to all handlers.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Operator routes
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        // Booking routes
        .route("/bookings", get(list_bookings).post(create_booking))
        .route("/bookings/{id}", delete(delete_booking))
        .route("/bookings/{id}/status", patch(update_booking_status))
        // Analytics routes
        .route("/analytics/overview", get(overview))
        .route("/analytics/food", get(food))
        .route("/analytics/packages", get(packages))
        .route("/analytics/monthly", get(monthly))
}
