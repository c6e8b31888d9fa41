//! Shared state handed to every handler.

use crate::{
    auth::TokenAuthority,
    services::{
        analytics::AnalyticsService, booking_service::BookingService,
        booking_store::BookingStore, capacity::CapacityTable, operators::OperatorService,
    },
};
use argon2::Params;
use axum::extract::FromRef;
use chrono::Duration;
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Kept for readiness probes.
    pub db: Arc<SqlitePool>,
    pub bookings: BookingService,
    pub analytics: AnalyticsService,
    pub operators: OperatorService,
    pub tokens: Arc<TokenAuthority>,
    /// Lifetime of tokens issued at login.
    pub token_ttl: Duration,
}

impl AppState {
    pub fn new(db: Arc<SqlitePool>, capacity: CapacityTable, tokens: TokenAuthority) -> Self {
        let store = BookingStore::new(db.clone());
        Self {
            bookings: BookingService::new(store.clone(), capacity),
            analytics: AnalyticsService::new(store),
            operators: OperatorService::new(db.clone()),
            tokens: Arc::new(tokens),
            token_ttl: Duration::days(30),
            db,
        }
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    pub fn with_password_params(mut self, params: Params) -> Self {
        self.operators = self.operators.with_params(params);
        self
    }
}

impl FromRef<AppState> for Arc<TokenAuthority> {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}
