//! Reservation management for a small campsite with three capacity-bounded
//! accommodation tiers, plus occupancy analytics for the owner.

pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use state::AppState;

/// The complete HTTP application with state attached.
///
/// CORS is open to any origin so the browser dashboards can call the API;
/// access is governed by bearer tokens, not cookies.
pub fn app(state: AppState) -> axum::Router {
    routes::routes::routes()
        .layer(tower_http::cors::CorsLayer::permissive())
        .with_state(state)
}
