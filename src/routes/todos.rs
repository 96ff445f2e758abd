use crate::{
    auth::AuthedUser,
    error::AppError,
    models::{TodoCreate, TodoListResponse, TodoQuery, TodoUpdate},
    store,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

const DEFAULT_PER_PAGE: i64 = 10;
const MAX_PER_PAGE: i64 = 100;

/// Resolves pagination parameters from the query, enforcing the 1-based page
/// and the 1-100 per_page bound.
fn paging(query: &TodoQuery) -> Result<(i64, i64), AppError> {
    let page = query.page.unwrap_or(1);
    if page < 1 {
        return Err(AppError::ValidationError("page must be at least 1".into()));
    }
    let per_page = query.per_page.unwrap_or(DEFAULT_PER_PAGE);
    if !(1..=MAX_PER_PAGE).contains(&per_page) {
        return Err(AppError::ValidationError(format!(
            "per_page must be between 1 and {}",
            MAX_PER_PAGE
        )));
    }
    Ok((page, per_page))
}

/// Lists the caller's todos with pagination, optional completion filter, and
/// optional case-insensitive search over title and description.
#[get("")]
pub async fn list_todos(
    pool: web::Data<PgPool>,
    query: web::Query<TodoQuery>,
    user: AuthedUser,
) -> Result<impl Responder, AppError> {
    let (page, per_page) = paging(&query)?;

    let (todos, total) = store::todos::list(
        &pool,
        user.0.id,
        page,
        per_page,
        query.completed,
        query.search.as_deref(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(TodoListResponse {
        todos,
        total,
        page,
        per_page,
    }))
}

/// Creates a todo owned by the caller. Completion starts out false.
#[post("")]
pub async fn create_todo(
    pool: web::Data<PgPool>,
    todo_data: web::Json<TodoCreate>,
    user: AuthedUser,
) -> Result<impl Responder, AppError> {
    todo_data.validate()?;

    let todo = store::todos::create(&pool, user.0.id, &todo_data).await?;

    Ok(HttpResponse::Created().json(todo))
}

/// Fetches one of the caller's todos. A todo owned by another user reports
/// the same 404 as a nonexistent id.
#[get("/{id}")]
pub async fn get_todo(
    pool: web::Data<PgPool>,
    todo_id: web::Path<i32>,
    user: AuthedUser,
) -> Result<impl Responder, AppError> {
    let todo = store::todos::find(&pool, user.0.id, todo_id.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Todo not found".into()))?;

    Ok(HttpResponse::Ok().json(todo))
}

/// Partially updates one of the caller's todos. Only fields present in the
/// request body are applied.
#[put("/{id}")]
pub async fn update_todo(
    pool: web::Data<PgPool>,
    todo_id: web::Path<i32>,
    todo_update: web::Json<TodoUpdate>,
    user: AuthedUser,
) -> Result<impl Responder, AppError> {
    todo_update.validate()?;
    // The double-wrapped description sits outside the validator derive.
    if let Some(Some(description)) = &todo_update.description {
        if description.chars().count() > 1000 {
            return Err(AppError::ValidationError(
                "description must be at most 1000 characters".into(),
            ));
        }
    }

    let todo = store::todos::update(&pool, user.0.id, todo_id.into_inner(), &todo_update)
        .await?
        .ok_or_else(|| AppError::NotFound("Todo not found".into()))?;

    Ok(HttpResponse::Ok().json(todo))
}

/// Deletes one of the caller's todos. Deleting the same id again is 404.
#[delete("/{id}")]
pub async fn delete_todo(
    pool: web::Data<PgPool>,
    todo_id: web::Path<i32>,
    user: AuthedUser,
) -> Result<impl Responder, AppError> {
    let deleted = store::todos::delete(&pool, user.0.id, todo_id.into_inner()).await?;

    if !deleted {
        return Err(AppError::NotFound("Todo not found".into()));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Todo deleted successfully" })))
}

/// Flips the completion flag of one of the caller's todos.
#[post("/{id}/toggle")]
pub async fn toggle_todo(
    pool: web::Data<PgPool>,
    todo_id: web::Path<i32>,
    user: AuthedUser,
) -> Result<impl Responder, AppError> {
    let todo = store::todos::toggle(&pool, user.0.id, todo_id.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Todo not found".into()))?;

    Ok(HttpResponse::Ok().json(todo))
}
