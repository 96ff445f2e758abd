use jsonwebtoken::Algorithm;
use std::env;

/// Process-wide configuration, loaded once at startup and treated as
/// immutable for the process lifetime. Handlers receive it via `web::Data`.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    /// Symmetric signing secret shared by token issuance and verification.
    pub jwt_secret: String,
    /// Signing algorithm, HS256 unless overridden.
    pub jwt_algorithm: Algorithm,
    /// Default lifetime of issued tokens, in minutes.
    pub token_ttl_minutes: i64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("SERVER_PORT must be a number"),
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "change-this-secret-in-production".to_string()),
            jwt_algorithm: env::var("JWT_ALGORITHM")
                .unwrap_or_else(|_| "HS256".to_string())
                .parse()
                .expect("JWT_ALGORITHM must be a supported algorithm name"),
            token_ttl_minutes: env::var("TOKEN_TTL_MINUTES")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .expect("TOKEN_TTL_MINUTES must be a number"),
        }
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}
