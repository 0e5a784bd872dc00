//! Bearer-token authentication and the single role check.
//!
//! Tokens are HS256 JWTs carrying the user id and role. Handlers take
//! an [`AuthUser`] extractor and call [`require_role`] instead of
//! comparing role strings inline.

use std::time::{SystemTime, UNIX_EPOCH};

use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use database::Role;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

/// Access token lifetime in seconds (24 hours).
const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// JWT claims embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id.
    pub sub: i64,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// The authenticated caller, decoded from the bearer token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: i64,
    pub role: Role,
}

/// Issue a signed access token for a user.
pub fn issue_token(user_id: i64, role: Role, secret: &str) -> Result<String, ApiError> {
    let now = unix_timestamp();
    let claims = Claims {
        sub: user_id,
        role,
        iat: now,
        exp: now + TOKEN_TTL_SECS,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("token encode: {e}")))
}

/// Decode and verify an access token.
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, ApiError> {
    jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| ApiError::Unauthorized)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(axum::http::header::AUTHORIZATION) else {
            return Err(ApiError::Unauthorized);
        };

        let Ok(value) = value.to_str() else {
            return Err(ApiError::Unauthorized);
        };

        let token = value.strip_prefix("Bearer ").unwrap_or(value);
        let claims = decode_token(token, state.jwt_secret.expose_secret())?;

        Ok(AuthUser {
            id: claims.sub,
            role: claims.role,
        })
    }
}

/// The single authorization check: the caller must hold `role`.
pub fn require_role(user: AuthUser, role: Role) -> Result<(), ApiError> {
    if user.role == role {
        Ok(())
    } else {
        Err(ApiError::Forbidden(format!("{role} access required")))
    }
}

/// Either of two roles (researcher-or-admin site management).
pub fn require_any_role(user: AuthUser, roles: &[Role]) -> Result<(), ApiError> {
    if roles.contains(&user.role) {
        Ok(())
    } else {
        Err(ApiError::Forbidden("access denied for this role".to_string()))
    }
}

/// Hash a password with Argon2id (random salt per hash).
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("password hash: {e}")))
}

/// Verify a plaintext password against a stored PHC-format hash.
///
/// Returns `Ok(false)` on mismatch; only a malformed stored hash is an
/// error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, ApiError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| ApiError::Internal(format!("invalid stored hash: {e}")))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(ApiError::Internal(format!("password verify: {e}"))),
    }
}

fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip() {
        let token = issue_token(7, Role::Guide, "test-secret").unwrap();
        let claims = decode_token(&token, "test-secret").unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.role, Role::Guide);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token(7, Role::Admin, "secret-a").unwrap();
        assert!(matches!(
            decode_token(&token, "secret-b"),
            Err(ApiError::Unauthorized)
        ));
        assert!(matches!(
            decode_token("not-a-token", "secret-a"),
            Err(ApiError::Unauthorized)
        ));
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
        assert!(verify_password("x", "garbage").is_err());
    }

    #[test]
    fn role_checks() {
        let admin = AuthUser {
            id: 1,
            role: Role::Admin,
        };
        let guide = AuthUser {
            id: 2,
            role: Role::Guide,
        };

        assert!(require_role(admin, Role::Admin).is_ok());
        assert!(require_role(guide, Role::Admin).is_err());
        assert!(require_any_role(guide, &[Role::Admin, Role::Guide]).is_ok());
        assert!(require_any_role(guide, &[Role::Admin, Role::Researcher]).is_err());
    }
}
