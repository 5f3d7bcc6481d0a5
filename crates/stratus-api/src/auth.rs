//! Session extraction
//!
//! The session accessor for all protected operations: a Bearer JWT
//! (HS256) carrying the user's id, name, and email. An absent or invalid
//! token rejects the request before any side effect. Session issuance
//! (login, registration) is a separate concern and lives outside this
//! service.

use axum::{extract::FromRequestParts, http::request::Parts};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use stratus_core::AppError;
use uuid::Uuid;

use crate::error::HttpAppError;
use crate::state::AppState;

/// JWT claims for a logged-in user.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id
    pub sub: Uuid,
    pub name: String,
    pub email: String,
    /// Expiry (seconds since epoch)
    pub exp: i64,
}

/// The authenticated session, extracted per handler.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
}

impl FromRequestParts<Arc<AppState>> for SessionContext {
    type Rejection = HttpAppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| AppError::Unauthorized("Missing session token".to_string()))?;

        let data = decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(state.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| {
            tracing::debug!(error = %e, "Session token rejected");
            AppError::Unauthorized("Invalid or expired session".to_string())
        })?;

        Ok(SessionContext {
            user_id: data.claims.sub,
            name: data.claims.name,
            email: data.claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    #[test]
    fn test_claims_round_trip() {
        let claims = SessionClaims {
            sub: Uuid::new_v4(),
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            exp: chrono::Utc::now().timestamp() + 3600,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        let decoded = decode::<SessionClaims>(
            &token,
            &DecodingKey::from_secret(b"test-secret"),
            &Validation::default(),
        )
        .unwrap();

        assert_eq!(decoded.claims.sub, claims.sub);
        assert_eq!(decoded.claims.email, "test@example.com");
    }

    #[test]
    fn test_expired_token_rejected() {
        let claims = SessionClaims {
            sub: Uuid::new_v4(),
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            exp: chrono::Utc::now().timestamp() - 60,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        let result = decode::<SessionClaims>(
            &token,
            &DecodingKey::from_secret(b"test-secret"),
            &Validation::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let claims = SessionClaims {
            sub: Uuid::new_v4(),
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            exp: chrono::Utc::now().timestamp() + 3600,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        let result = decode::<SessionClaims>(
            &token,
            &DecodingKey::from_secret(b"other-secret"),
            &Validation::default(),
        );
        assert!(result.is_err());
    }
}
