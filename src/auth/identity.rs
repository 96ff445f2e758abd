//! Per-request identity resolution.
//!
//! Every authenticated route goes through two gates: `resolve_user` turns a
//! bearer token into a concrete user record, and `require_active` rejects
//! deactivated accounts whose tokens are still cryptographically valid. The
//! `AuthedUser` extractor applies both; handlers never skip the active check.

use actix_web::dev::Payload;
use actix_web::{http::header, web, Error as ActixError, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use sqlx::PgPool;

use crate::auth::token::verify_token;
use crate::config::Config;
use crate::error::AppError;
use crate::models::User;
use crate::store;

/// One opaque message for every resolution failure: a bad token and a user
/// deleted after issuance must be indistinguishable to the caller.
const CREDENTIALS_MSG: &str = "Could not validate credentials";

/// Resolves a token to the user record it asserts.
///
/// Fails with `Unauthorized` when the token does not verify or when no user
/// matches the embedded subject.
pub async fn resolve_user(pool: &PgPool, config: &Config, token: &str) -> Result<User, AppError> {
    let subject = verify_token(config, token)
        .ok_or_else(|| AppError::Unauthorized(CREDENTIALS_MSG.into()))?;

    store::users::find_by_username(pool, &subject)
        .await?
        .ok_or_else(|| AppError::Unauthorized(CREDENTIALS_MSG.into()))
}

/// Second gate: a deactivated account is rejected with `Forbidden` even
/// though its token verified.
pub fn require_active(user: User) -> Result<User, AppError> {
    if user.is_active {
        Ok(user)
    } else {
        Err(AppError::Forbidden("Inactive user".into()))
    }
}

/// The authenticated, active user for the current request.
///
/// Reads the bearer token from the `Authorization` header, resolves it
/// against the database, and enforces the active-account gate. Routes take
/// this as a handler argument and thread the user explicitly into store
/// calls.
#[derive(Debug)]
pub struct AuthedUser(pub User);

impl FromRequest for AuthedUser {
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let pool = req
                .app_data::<web::Data<PgPool>>()
                .ok_or_else(|| {
                    AppError::InternalServerError("Database pool not configured".into())
                })?
                .clone();
            let config = req
                .app_data::<web::Data<Config>>()
                .ok_or_else(|| AppError::InternalServerError("Config not configured".into()))?
                .clone();

            let token = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.strip_prefix("Bearer "))
                .ok_or_else(|| AppError::Unauthorized(CREDENTIALS_MSG.into()))?;

            let user = resolve_user(&pool, &config, token).await?;
            let user = require_active(user)?;
            Ok(AuthedUser(user))
        })
    }
}
