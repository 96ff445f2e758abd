//!
//! # Custom Error Handling
//!
//! Defines the `AppError` type used throughout the application. All core
//! operations return typed outcomes; this module is the single place where
//! those outcomes are translated into HTTP responses.
//!
//! `AppError` implements `actix_web::error::ResponseError` so handlers can
//! bubble failures with `?`. `From` impls cover `sqlx::Error`,
//! `validator::ValidationErrors`, and `bcrypt::BcryptError`.
//!
//! Messages stay coarse on purpose: login failures never reveal whether the
//! user exists, and storage errors respond with a generic body while the
//! detail goes to the log.

use actix_web::{error::ResponseError, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// All failure outcomes the core can produce.
#[derive(Debug)]
pub enum AppError {
    /// Missing/invalid/expired token, or failed login credentials (HTTP 401).
    Unauthorized(String),
    /// Token valid but the account is deactivated (HTTP 400).
    Forbidden(String),
    /// Duplicate email or username at registration (HTTP 400).
    Conflict(String),
    /// Todo absent or owned by somebody else (HTTP 404).
    NotFound(String),
    /// Field constraint violations (HTTP 422).
    ValidationError(String),
    /// Storage-layer failure (HTTP 500, detail logged only).
    DatabaseError(String),
    /// Any other unexpected server-side failure (HTTP 500, detail logged only).
    InternalServerError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            // Challenge header per RFC 6750 for bearer-token consumers.
            AppError::Unauthorized(msg) => HttpResponse::Unauthorized()
                .insert_header(("WWW-Authenticate", "Bearer"))
                .json(json!({ "error": msg })),
            // Deactivated accounts are a client-state problem, not an auth
            // handshake problem, so they report 400 rather than 401.
            AppError::Forbidden(msg) => HttpResponse::BadRequest().json(json!({
                "error": msg
            })),
            AppError::Conflict(msg) => HttpResponse::BadRequest().json(json!({
                "error": msg
            })),
            AppError::NotFound(msg) => HttpResponse::NotFound().json(json!({
                "error": msg
            })),
            AppError::ValidationError(msg) => HttpResponse::UnprocessableEntity().json(json!({
                "error": msg
            })),
            AppError::DatabaseError(msg) | AppError::InternalServerError(msg) => {
                log::error!("internal error: {}", msg);
                HttpResponse::InternalServerError().json(json!({
                    "error": "Internal server error"
                }))
            }
        }
    }
}

/// `sqlx::Error::RowNotFound` maps to `NotFound`; everything else is a
/// storage fault.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// Hashing faults are server-side problems; the bcrypt detail never reaches
/// the client.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}
