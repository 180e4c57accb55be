//! Session token creation and verification.
//!
//! Tokens are HS256 JWTs carrying [`SessionClaims`]. A valid signature is not
//! enough to authenticate: [`crate::JwtAuthProvider`] also requires the
//! token's session id to be live in the session store.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use warden_config::JwtConfig;
use warden_core::Identity;

use crate::claims::SessionClaims;
use crate::error::AuthError;

/// Creates a session token for `identity` bound to session record `session_id`.
///
/// # Errors
///
/// Returns [`AuthError::TokenEncoding`] if signing fails.
pub fn create_session_token(
    identity: &Identity,
    session_id: &str,
    jwt_config: &JwtConfig,
) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();
    let exp = now.saturating_add(jwt_config.session_expiry).max(0) as usize;

    let claims = SessionClaims {
        sub: identity.id.clone(),
        email: identity.email.clone(),
        name: identity.display_name.clone(),
        sid: session_id.to_string(),
        exp,
        iat: now as usize,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )?)
}

/// Verifies signature and expiry and returns the embedded claims.
///
/// # Errors
///
/// Returns [`AuthError::InvalidToken`] for any malformed, tampered or expired token.
pub fn verify_session_token(
    token: &str,
    jwt_config: &JwtConfig,
) -> Result<SessionClaims, AuthError> {
    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AuthError::InvalidToken)
}
