//! Site staff who sign in to manage bookings or read the dashboards.

use crate::auth::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A stored operator account.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Operator {
    pub id: Uuid,
    pub name: String,
    /// Lowercased and trimmed; unique across operators.
    pub email: String,
    /// PHC string (`$argon2id$...`).
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Operator {
    pub fn summary(&self) -> OperatorSummary {
        OperatorSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Who a booking was added by, as shown in listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct OperatorSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// `POST /auth/register` body. A missing role means `manager`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Registration {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

/// `POST /auth/login` body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    pub email: Option<String>,
    pub password: Option<String>,
}

pub(crate) fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}
