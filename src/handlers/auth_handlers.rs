//! Operator sign-up and sign-in. Both answer with a bearer token.

use crate::{
    auth::{AuthError, MaybePrincipal, Role},
    errors::AppError,
    models::{Credentials, Operator, Registration},
    state::AppState,
};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use uuid::Uuid;

/// Operator profile plus a freshly signed token.
#[derive(Debug, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub token: String,
}

fn session(state: &AppState, operator: Operator) -> Result<Session, AppError> {
    let token = state
        .tokens
        .issue(&operator.id.to_string(), operator.role, state.token_ttl)?;
    Ok(Session {
        id: operator.id,
        name: operator.name,
        email: operator.email,
        role: operator.role,
        token,
    })
}

/// `POST /auth/register`
///
/// Open while no operator exists, so the first account can be created.
/// After that only an owner may add operators.
pub async fn register(
    State(state): State<AppState>,
    MaybePrincipal(caller): MaybePrincipal,
    payload: Result<Json<Registration>, JsonRejection>,
) -> Result<Response, AppError> {
    if state.operators.count().await? > 0 {
        let caller = caller.ok_or(AuthError::Missing)?;
        caller.require(&[Role::Owner])?;
    }
    let Json(registration) = payload?;

    let operator = state.operators.register(registration).await?;
    Ok((StatusCode::CREATED, Json(session(&state, operator)?)).into_response())
}

/// `POST /auth/login`
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<Session>, AppError> {
    let Json(credentials) = payload?;
    let operator = state.operators.authenticate(credentials).await?;
    Ok(Json(session(&state, operator)?))
}
