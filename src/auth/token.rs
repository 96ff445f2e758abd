use crate::config::Config;
use crate::error::AppError;
use chrono::Duration;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims encoded within an issued token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the username of the authenticated user.
    pub sub: String,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

/// Issues a signed, time-limited token for `subject`.
///
/// The expiry is absolute: `now + ttl`, where `ttl` falls back to the
/// configured `token_ttl_minutes` when the caller does not override it.
/// Signing uses the process-wide secret and algorithm from `Config`.
pub fn issue_token(
    config: &Config,
    subject: &str,
    ttl: Option<Duration>,
) -> Result<String, AppError> {
    let ttl = ttl.unwrap_or_else(|| Duration::minutes(config.token_ttl_minutes));
    let expiration = chrono::Utc::now()
        .checked_add_signed(ttl)
        .ok_or_else(|| AppError::InternalServerError("Token expiry out of range".into()))?
        .timestamp() as usize;

    let claims = Claims {
        sub: subject.to_string(),
        exp: expiration,
    };

    encode(
        &Header::new(config.jwt_algorithm),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Failed to issue token: {}", e)))
}

/// Verifies a token and returns the embedded subject.
///
/// Signature and expiry are checked atomically. Every failure mode —
/// malformed payload, signature mismatch, expiry in the past — folds into
/// `None` so callers cannot distinguish an expired token from a forged one.
/// The rejection reason is logged at debug level for operators.
pub fn verify_token(config: &Config, token: &str) -> Option<String> {
    let mut validation = Validation::new(config.jwt_algorithm);
    // No clock leeway: a token past its expiry is invalid immediately.
    validation.leeway = 0;

    match decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    ) {
        Ok(data) => Some(data.claims.sub),
        Err(e) => {
            log::debug!("token rejected: {}", e);
            None
        }
    }
}
