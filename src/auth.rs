//! Bearer credentials and the per-route role policy.
//!
//! Tokens are `base64url(claims JSON) "." hex(HMAC-SHA256(secret, claims))`.
//! Claims carry the operator subject, a role and an expiry in unix seconds.

use axum::{extract::FromRef, http::HeaderMap, http::request::Parts};
use axum::extract::FromRequestParts;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::{convert::Infallible, fmt, sync::Arc};
use thiserror::Error;

use crate::errors::AppError;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Manager,
    Owner,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Manager => "manager",
            Role::Owner => "owner",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("not authorized, no token provided")]
    Missing,
    #[error("not authorized, malformed token")]
    Malformed,
    #[error("not authorized, token signature mismatch")]
    BadSignature,
    #[error("not authorized, token expired")]
    Expired,
    #[error("role `{role}` is not authorized to access this route")]
    Forbidden { role: Role },
    #[error("token secret must not be empty")]
    EmptySecret,
    #[error("token lifetime overflows the expiry timestamp")]
    LifetimeOutOfRange,
    #[error("encoding token claims: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Signs and verifies bearer tokens with a shared secret.
#[derive(Clone)]
pub struct TokenAuthority {
    mac: HmacSha256,
}

impl TokenAuthority {
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, AuthError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(AuthError::EmptySecret);
        }
        let mac = HmacSha256::new_from_slice(secret).map_err(|_| AuthError::EmptySecret)?;
        Ok(Self { mac })
    }

    pub fn issue(&self, subject: &str, role: Role, ttl: Duration) -> Result<String, AuthError> {
        let expires = Utc::now()
            .checked_add_signed(ttl)
            .ok_or(AuthError::LifetimeOutOfRange)?;
        let claims = Claims {
            sub: subject.to_string(),
            role,
            exp: expires.timestamp(),
        };
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?);
        let signature = hex::encode(self.sign(payload.as_bytes()).finalize().into_bytes());
        Ok(format!("{payload}.{signature}"))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let (payload, signature) = token.trim().split_once('.').ok_or(AuthError::Malformed)?;
        let signature = hex::decode(signature).map_err(|_| AuthError::Malformed)?;
        self.sign(payload.as_bytes())
            .verify_slice(&signature)
            .map_err(|_| AuthError::BadSignature)?;

        let raw = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| AuthError::Malformed)?;
        let claims: Claims = serde_json::from_slice(&raw).map_err(|_| AuthError::Malformed)?;
        if claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::Expired);
        }
        Ok(claims)
    }

    fn sign(&self, payload: &[u8]) -> HmacSha256 {
        let mut mac = self.mac.clone();
        mac.update(payload);
        mac
    }
}

/// An authenticated operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub subject: String,
    pub role: Role,
}

impl Principal {
    /// Route guard: the caller's role must be one of `allowed`.
    pub fn require(&self, allowed: &[Role]) -> Result<(), AuthError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(AuthError::Forbidden { role: self.role })
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn authenticate(headers: &HeaderMap, tokens: &TokenAuthority) -> Result<Principal, AuthError> {
    let token = bearer_token(headers).ok_or(AuthError::Missing)?;
    let claims = tokens.verify(token)?;
    Ok(Principal {
        subject: claims.sub,
        role: claims.role,
    })
}

impl<S> FromRequestParts<S> for Principal
where
    Arc<TokenAuthority>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let tokens = Arc::<TokenAuthority>::from_ref(state);
        authenticate(&parts.headers, &tokens).map_err(|err| {
            tracing::debug!("rejecting credential: {}", err);
            AppError::from(err)
        })
    }
}

/// The caller on public routes: `Some` only when a valid credential was sent.
/// Invalid credentials are treated as anonymous.
#[derive(Debug, Clone)]
pub struct MaybePrincipal(pub Option<Principal>);

impl<S> FromRequestParts<S> for MaybePrincipal
where
    Arc<TokenAuthority>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if bearer_token(&parts.headers).is_none() {
            return Ok(MaybePrincipal(None));
        }
        let tokens = Arc::<TokenAuthority>::from_ref(state);
        match authenticate(&parts.headers, &tokens) {
            Ok(principal) => Ok(MaybePrincipal(Some(principal))),
            Err(err) => {
                tracing::debug!("ignoring credential on public route: {}", err);
                Ok(MaybePrincipal(None))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authority() -> TokenAuthority {
        TokenAuthority::new("test-secret-value").unwrap()
    }

    #[test]
    fn issued_token_verifies() {
        let tokens = authority();
        let token = tokens.issue("desk-1", Role::Manager, Duration::hours(1)).unwrap();
        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, "desk-1");
        assert_eq!(claims.role, Role::Manager);
    }

    #[test]
    fn foreign_secret_and_tampering_rejected() {
        let token = authority().issue("owner", Role::Owner, Duration::hours(1)).unwrap();
        let other = TokenAuthority::new("another-secret").unwrap();
        assert!(matches!(other.verify(&token), Err(AuthError::BadSignature)));

        let (_, signature) = token.split_once('.').unwrap();
        let forged_claims = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&Claims {
                sub: "owner".into(),
                role: Role::Owner,
                exp: i64::MAX,
            })
            .unwrap(),
        );
        let forged = format!("{forged_claims}.{signature}");
        assert!(matches!(authority().verify(&forged), Err(AuthError::BadSignature)));
    }

    #[test]
    fn expired_and_malformed_rejected() {
        let tokens = authority();
        let stale = tokens.issue("desk-1", Role::Manager, Duration::hours(-1)).unwrap();
        assert!(matches!(tokens.verify(&stale), Err(AuthError::Expired)));
        assert!(matches!(tokens.verify("no-dot"), Err(AuthError::Malformed)));
        assert!(matches!(tokens.verify("abc.zz"), Err(AuthError::Malformed)));
    }

    #[test]
    fn empty_secret_refused() {
        assert!(matches!(TokenAuthority::new(""), Err(AuthError::EmptySecret)));
    }

    #[test]
    fn role_guard() {
        let manager = Principal {
            subject: "m".into(),
            role: Role::Manager,
        };
        assert!(manager.require(&[Role::Manager, Role::Owner]).is_ok());
        assert!(matches!(
            manager.require(&[Role::Owner]),
            Err(AuthError::Forbidden { role: Role::Manager })
        ));
    }

    #[test]
    fn bearer_header_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);
        headers.insert("authorization", "Bearer  abc.def ".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc.def"));
        headers.insert("authorization", "Basic abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn oversized_lifetime_is_an_error() {
        let ttl = Duration::try_days(100_000_000_000).unwrap();
        assert!(matches!(
            authority().issue("desk-1", Role::Manager, ttl),
            Err(AuthError::LifetimeOutOfRange)
        ));
    }
}
