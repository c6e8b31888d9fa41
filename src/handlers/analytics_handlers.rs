//! Owner dashboards. Every figure covers confirmed bookings only.

use super::parse_date_param;
use crate::{
    auth::{Principal, Role},
    errors::AppError,
    services::analytics::{MonthlyCount, NamedCount, Overview},
    state::AppState,
};
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use chrono::NaiveDate;
use serde::Deserialize;

/// `?date=YYYY-MM-DD` restricts a figure to guests on site that night.
#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    pub date: Option<String>,
}

fn reference_date(
    principal: &Principal,
    query: Result<Query<AnalyticsQuery>, QueryRejection>,
) -> Result<Option<NaiveDate>, AppError> {
    principal.require(&[Role::Owner])?;
    let Query(q) = query?;
    parse_date_param("date", q.date)
}

/// `GET /analytics/overview`
pub async fn overview(
    State(state): State<AppState>,
    principal: Principal,
    query: Result<Query<AnalyticsQuery>, QueryRejection>,
) -> Result<Json<Overview>, AppError> {
    let on = reference_date(&principal, query)?;
    Ok(Json(state.analytics.overview(on).await?))
}

/// `GET /analytics/food`
pub async fn food(
    State(state): State<AppState>,
    principal: Principal,
    query: Result<Query<AnalyticsQuery>, QueryRejection>,
) -> Result<Json<Vec<NamedCount>>, AppError> {
    let on = reference_date(&principal, query)?;
    Ok(Json(state.analytics.food(on).await?))
}

/// `GET /analytics/packages`
pub async fn packages(
    State(state): State<AppState>,
    principal: Principal,
    query: Result<Query<AnalyticsQuery>, QueryRejection>,
) -> Result<Json<Vec<NamedCount>>, AppError> {
    let on = reference_date(&principal, query)?;
    Ok(Json(state.analytics.packages(on).await?))
}

/// `GET /analytics/monthly`: creation volume per month; `date` is not consulted.
pub async fn monthly(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<Vec<MonthlyCount>>, AppError> {
    principal.require(&[Role::Owner])?;
    Ok(Json(state.analytics.monthly().await?))
}
