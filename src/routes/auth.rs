use crate::{
    auth::{hash_password, issue_token, verify_password, AuthedUser, LoginRequest,
        RegisterRequest, TokenResponse},
    config::Config,
    error::AppError,
    models::UserResponse,
    store,
};
use actix_web::{get, post, web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

/// Register a new user account.
///
/// Email uniqueness is checked before username uniqueness, so when both
/// collide the email conflict is the one reported. Responds 201 with the
/// created user, never the password hash.
#[post("/register")]
pub async fn register(
    pool: web::Data<PgPool>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    if store::users::find_by_email(&pool, &register_data.email)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Email already registered".into()));
    }

    if store::users::find_by_username(&pool, &register_data.username)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Username already taken".into()));
    }

    let hashed_password = hash_password(&register_data.password)?;
    let user = store::users::insert(
        &pool,
        &register_data.email,
        &register_data.username,
        &hashed_password,
    )
    .await?;

    log::info!("registered user {}", user.username);
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// Login with a username or email plus password, returning a bearer token.
///
/// An unknown identifier and a wrong password produce the same response so
/// the endpoint cannot be used to enumerate accounts.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let user = store::users::find_by_identifier(&pool, &login_data.username).await?;

    let user = match user {
        Some(user) if verify_password(&login_data.password, &user.hashed_password) => user,
        _ => return Err(AppError::Unauthorized("Incorrect username or password".into())),
    };

    // Subject is the username; ttl comes from configuration.
    let token = issue_token(&config, &user.username, None)?;

    Ok(HttpResponse::Ok().json(TokenResponse::bearer(token)))
}

/// Current user's profile. Requires a valid token and an active account.
#[get("/me")]
pub async fn me(user: AuthedUser) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(UserResponse::from(user.0)))
}
