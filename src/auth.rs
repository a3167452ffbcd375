// ABOUTME: Bearer-token half of the Authenticator (C9) — HS256 JWT issuance/verification
// ABOUTME: API-key verification lives in middleware/auth.rs, which calls back into the Metadata Store
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Management-plane authentication: signed, expiring, stateless bearer tokens.

use crate::errors::{AppError, AppResult, ErrorCode};
use crate::models::UserRole;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Token lifetime for management-plane bearer tokens.
const TOKEN_TTL_HOURS: i64 = 24;

/// Claims carried by a management bearer token (§4.9).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    /// Expiry, seconds since epoch.
    pub exp: i64,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
}

/// Issues and verifies HS256 bearer tokens for the management plane.
#[derive(Clone)]
pub struct AuthManager {
    secret: String,
}

impl AuthManager {
    #[must_use]
    pub fn new(secret: String) -> Self {
        Self { secret }
    }

    /// Issue a signed token for the given principal.
    ///
    /// # Errors
    ///
    /// Returns an error if token encoding fails.
    pub fn issue_token(
        &self,
        id: Uuid,
        email: &str,
        name: &str,
        role: UserRole,
    ) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            id,
            email: email.to_owned(),
            name: name.to_owned(),
            role,
            iat: now.timestamp(),
            exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::internal(format!("token signing failed: {e}")))
    }

    /// Verify and decode a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `INVALID_TOKEN` for a malformed/bad-signature token, or
    /// `TOKEN_EXPIRED` once past `exp`.
    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let result = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        );
        match result {
            Ok(data) => Ok(data.claims),
            Err(e) => match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token(format!(
                    "token validation failed: {e}"
                ))),
            },
        }
    }
}

/// Extract `(scheme, credential)` from an `Authorization` header value, accepting
/// the scheme case-insensitively and trimming surrounding whitespace (§9).
#[must_use]
pub fn split_auth_header(value: &str) -> Option<(String, String)> {
    let trimmed = value.trim();
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let scheme = parts.next()?.to_owned();
    let credential = parts.next().unwrap_or("").trim().to_owned();
    Some((scheme, credential))
}

/// Parse a `Bearer <token>` header, applying the leniency rules of §9:
/// the scheme is matched case-insensitively, a missing header is `NO_TOKEN`,
/// a non-bearer scheme is `INVALID_AUTH_FORMAT`, and an empty token after the
/// scheme is `NO_TOKEN`.
///
/// # Errors
///
/// Returns `NO_TOKEN` or `INVALID_AUTH_FORMAT` per the above.
pub fn parse_bearer_header(header: Option<&str>) -> AppResult<String> {
    let Some(value) = header else {
        return Err(AppError::no_token());
    };
    let Some((scheme, credential)) = split_auth_header(value) else {
        return Err(AppError::no_token());
    };
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AppError::new(
            ErrorCode::InvalidAuthFormat,
            "Authorization header must use the Bearer scheme",
        ));
    }
    if credential.is_empty() {
        return Err(AppError::no_token());
    }
    Ok(credential)
}

/// `requireRole`: admin may act as any role; others must match exactly (§4.9).
///
/// # Errors
///
/// Returns `FORBIDDEN` if the principal's role doesn't satisfy `required`.
pub fn require_role(actual: UserRole, required: UserRole) -> AppResult<()> {
    if actual == UserRole::Admin || actual == required {
        Ok(())
    } else {
        Err(AppError::new(
            ErrorCode::Forbidden,
            format!("role {actual} does not satisfy required role {required}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> AuthManager {
        AuthManager::new("unit-test-secret-at-least-16b".to_owned())
    }

    #[test]
    fn token_round_trips() {
        let m = manager();
        let id = Uuid::new_v4();
        let token = m
            .issue_token(id, "a@b.com", "Ada", UserRole::User)
            .expect("issue");
        let claims = m.verify_token(&token).expect("verify");
        assert_eq!(claims.id, id);
        assert_eq!(claims.email, "a@b.com");
        assert_eq!(claims.role, UserRole::User);
    }

    #[test]
    fn rejects_tampered_signature() {
        let m = manager();
        let token = m
            .issue_token(Uuid::new_v4(), "a@b.com", "Ada", UserRole::User)
            .expect("issue");
        let other = AuthManager::new("a-totally-different-secret!!".to_owned());
        assert!(other.verify_token(&token).is_err());
    }

    #[test]
    fn bearer_header_leniency() {
        assert_eq!(
            parse_bearer_header(Some("  BEARER   abc123  ")).unwrap(),
            "abc123"
        );
        assert!(matches!(
            parse_bearer_header(None).unwrap_err().code,
            ErrorCode::NoToken
        ));
        assert!(matches!(
            parse_bearer_header(Some("Basic xyz")).unwrap_err().code,
            ErrorCode::InvalidAuthFormat
        ));
        assert!(matches!(
            parse_bearer_header(Some("Bearer ")).unwrap_err().code,
            ErrorCode::NoToken
        ));
    }

    #[test]
    fn require_role_allows_admin_any_role() {
        require_role(UserRole::Admin, UserRole::User).expect("admin passes");
        require_role(UserRole::User, UserRole::User).expect("exact match passes");
        assert!(require_role(UserRole::User, UserRole::Admin).is_err());
    }

    #[test]
    fn rejects_expired_token() {
        let m = manager();
        let now = Utc::now();
        let claims = Claims {
            id: Uuid::new_v4(),
            email: "a@b.com".to_owned(),
            name: "Ada".to_owned(),
            role: UserRole::User,
            iat: (now - Duration::hours(TOKEN_TTL_HOURS + 1)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(m.secret.as_bytes()),
        )
        .expect("issue expired token");

        let err = m.verify_token(&token).unwrap_err();
        assert!(matches!(err.code, ErrorCode::TokenExpired));
    }
}
