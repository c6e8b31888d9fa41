//! Operator accounts: registration, password login and the name lookup used
//! when listing who added a booking.
//!
//! Passwords are stored as argon2id PHC strings. Hashing runs on the blocking
//! pool so a login never stalls the async workers.

use crate::auth::Role;
use crate::models::operator::normalize_email;
use crate::models::{Credentials, Operator, OperatorSummary, Registration};
use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::{SaltString, rand_core::OsRng},
};
use chrono::Utc;
use sqlx::{QueryBuilder, SqlitePool, sqlite::Sqlite};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

const OPERATOR_COLUMNS: &str = "id, name, email, password_hash, role, created_at";

#[derive(Debug, Error)]
pub enum OperatorError {
    #[error("missing required field `{0}`")]
    Missing(&'static str),
    #[error("an operator with email `{0}` already exists")]
    EmailTaken(String),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type OperatorResult<T> = Result<T, OperatorError>;

#[derive(Clone)]
pub struct OperatorService {
    db: Arc<SqlitePool>,
    hasher: Argon2<'static>,
}

impl OperatorService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self {
            db,
            hasher: Argon2::default(),
        }
    }

    /// Use cheaper argon2 parameters for new hashes. Existing hashes carry
    /// their own parameters and keep verifying.
    pub fn with_params(mut self, params: Params) -> Self {
        self.hasher = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        self
    }

    pub async fn count(&self) -> OperatorResult<i64> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM operators")
            .fetch_one(&*self.db)
            .await?)
    }

    pub async fn register(&self, registration: Registration) -> OperatorResult<Operator> {
        let name = required(registration.name, "name")?;
        let email = normalize_email(&required(registration.email, "email")?);
        let password = registration
            .password
            .filter(|p| !p.is_empty())
            .ok_or(OperatorError::Missing("password"))?;
        let role = registration.role.unwrap_or(Role::Manager);

        if self.find_by_email(&email).await?.is_some() {
            return Err(OperatorError::EmailTaken(email));
        }

        let hasher = self.hasher.clone();
        let password_hash = tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            hasher
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
        })
        .await
        .map_err(|err| OperatorError::Hashing(err.to_string()))?
        .map_err(|err| OperatorError::Hashing(err.to_string()))?;

        let sql = format!(
            "INSERT INTO operators ({OPERATOR_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?)
             RETURNING {OPERATOR_COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Operator>(&sql)
            .bind(Uuid::new_v4())
            .bind(&name)
            .bind(&email)
            .bind(&password_hash)
            .bind(role)
            .bind(Utc::now())
            .fetch_one(&*self.db)
            .await;

        let operator = match inserted {
            Ok(operator) => operator,
            // lost a race with a concurrent registration for the same email
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                return Err(OperatorError::EmailTaken(email));
            }
            Err(err) => return Err(err.into()),
        };
        info!(id = %operator.id, role = %operator.role, "operator registered");
        Ok(operator)
    }

    /// Check an email and password pair. Unknown emails and wrong passwords
    /// are indistinguishable to the caller.
    pub async fn authenticate(&self, credentials: Credentials) -> OperatorResult<Operator> {
        let email = normalize_email(&credentials.email.unwrap_or_default());
        let password = credentials.password.unwrap_or_default();
        if email.is_empty() || password.is_empty() {
            return Err(OperatorError::InvalidCredentials);
        }

        let Some(operator) = self.find_by_email(&email).await? else {
            warn!("login refused: unknown operator");
            return Err(OperatorError::InvalidCredentials);
        };

        let hasher = self.hasher.clone();
        let stored = operator.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || {
            PasswordHash::new(&stored)
                .map(|parsed| hasher.verify_password(password.as_bytes(), &parsed).is_ok())
        })
        .await
        .map_err(|err| OperatorError::Hashing(err.to_string()))?
        .map_err(|err| OperatorError::Hashing(err.to_string()))?;

        if !matches {
            warn!(id = %operator.id, "login refused: wrong password");
            return Err(OperatorError::InvalidCredentials);
        }
        info!(id = %operator.id, "operator signed in");
        Ok(operator)
    }

    /// Name and email for every id in `ids` that names a stored operator.
    /// Ids that are not UUIDs (e.g. subjects of CLI-issued tokens) are skipped.
    pub async fn summaries<'a>(
        &self,
        ids: impl IntoIterator<Item = &'a str>,
    ) -> OperatorResult<HashMap<String, OperatorSummary>> {
        let mut wanted: Vec<Uuid> = ids
            .into_iter()
            .filter_map(|id| Uuid::parse_str(id).ok())
            .collect();
        wanted.sort();
        wanted.dedup();
        if wanted.is_empty() {
            return Ok(HashMap::new());
        }

        let mut builder =
            QueryBuilder::<Sqlite>::new("SELECT id, name, email FROM operators WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in wanted {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");

        let rows = builder
            .build_query_as::<OperatorSummary>()
            .fetch_all(&*self.db)
            .await?;
        Ok(rows
            .into_iter()
            .map(|summary| (summary.id.to_string(), summary))
            .collect())
    }

    async fn find_by_email(&self, email: &str) -> OperatorResult<Option<Operator>> {
        let sql = format!("SELECT {OPERATOR_COLUMNS} FROM operators WHERE email = ?");
        Ok(sqlx::query_as::<_, Operator>(&sql)
            .bind(email)
            .fetch_optional(&*self.db)
            .await?)
    }
}

fn required(value: Option<String>, field: &'static str) -> OperatorResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(OperatorError::Missing(field))
}
