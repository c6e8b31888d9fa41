//! HTTP handlers for booking requests and their lifecycle.

use super::parse_date_param;
use crate::{
    auth::{MaybePrincipal, Principal, Role},
    errors::AppError,
    models::{BookingDraft, BookingView},
    services::booking_store::ListFilter,
    state::AppState,
};
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

/// Query params accepted by `GET /bookings`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBookingsQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Body of `PATCH /bookings/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct StatusUpdateReq {
    pub status: Option<String>,
}

/// `POST /bookings`: public booking request.
pub async fn create_booking(
    State(state): State<AppState>,
    MaybePrincipal(caller): MaybePrincipal,
    payload: Result<Json<BookingDraft>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(draft) = payload?;
    let booking = state
        .bookings
        .create(draft, caller.map(|p| p.subject))
        .await?;
    Ok((StatusCode::CREATED, Json(BookingView::from(&booking))).into_response())
}

/// `GET /bookings`: optionally bounded by `startDate` / `endDate` on check-in.
///
/// Bookings added by a registered operator carry that operator's name and email.
pub async fn list_bookings(
    State(state): State<AppState>,
    principal: Principal,
    query: Result<Query<ListBookingsQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    principal.require(&[Role::Manager, Role::Owner])?;
    let Query(q) = query?;
    let filter = ListFilter {
        check_in_from: parse_date_param("startDate", q.start_date)?,
        check_in_to: parse_date_param("endDate", q.end_date)?,
    };

    let bookings = state.bookings.list(filter).await?;
    let operators = state
        .operators
        .summaries(bookings.iter().filter_map(|b| b.added_by.as_deref()))
        .await?;
    let views: Vec<BookingView<'_>> = bookings
        .iter()
        .map(|b| {
            let operator = b.added_by.as_ref().and_then(|id| operators.get(id));
            BookingView::from(b).with_operator(operator)
        })
        .collect();
    Ok(Json(views).into_response())
}

/// `PATCH /bookings/{id}/status`: confirm or cancel.
pub async fn update_booking_status(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
    payload: Result<Json<StatusUpdateReq>, JsonRejection>,
) -> Result<Response, AppError> {
    principal.require(&[Role::Manager])?;
    let Json(req) = payload?;
    let requested = req.status.unwrap_or_default();

    let booking = state.bookings.update_status(&id, &requested).await?;
    Ok(Json(BookingView::from(&booking)).into_response())
}

/// `DELETE /bookings/{id}`
pub async fn delete_booking(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    principal.require(&[Role::Manager])?;
    let deleted = state.bookings.delete(&id).await?;
    Ok(Json(json!({
        "id": deleted,
        "message": "booking deleted successfully"
    })))
}
