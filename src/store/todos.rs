use crate::error::AppError;
use crate::models::{Todo, TodoCreate, TodoUpdate};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

const TODO_COLUMNS: &str = "id, title, description, completed, owner_id, created_at, updated_at";

/// Lists the owner's todos with optional completion and substring filters.
///
/// Returns the requested page plus the total count of the filtered set
/// before pagination. `page` is 1-based; the caller is responsible for
/// bounding `per_page`.
pub async fn list(
    pool: &PgPool,
    owner_id: i32,
    page: i64,
    per_page: i64,
    completed: Option<bool>,
    search: Option<&str>,
) -> Result<(Vec<Todo>, i64), AppError> {
    // Conditions are appended dynamically; the owner filter is always first.
    let mut conditions = vec!["owner_id = $1".to_string()];
    let mut param_count = 2;

    if completed.is_some() {
        conditions.push(format!("completed = ${}", param_count));
        param_count += 1;
    }
    if search.is_some() {
        conditions.push(format!(
            "(title ILIKE ${} OR description ILIKE ${})",
            param_count,
            param_count + 1
        ));
        param_count += 2;
    }

    let where_clause = conditions.join(" AND ");
    let search_pattern = search.map(|s| format!("%{}%", s));

    let count_sql = format!("SELECT COUNT(*) FROM todos WHERE {}", where_clause);
    let mut count_query = sqlx::query(&count_sql).bind(owner_id);
    if let Some(completed) = completed {
        count_query = count_query.bind(completed);
    }
    if let Some(pattern) = &search_pattern {
        count_query = count_query.bind(pattern).bind(pattern);
    }
    let total: i64 = count_query
        .fetch_one(pool)
        .await
        .map(|row: PgRow| row.get(0))?;

    let rows_sql = format!(
        "SELECT {} FROM todos WHERE {} ORDER BY id LIMIT ${} OFFSET ${}",
        TODO_COLUMNS,
        where_clause,
        param_count,
        param_count + 1
    );
    let mut rows_query = sqlx::query_as::<_, Todo>(&rows_sql).bind(owner_id);
    if let Some(completed) = completed {
        rows_query = rows_query.bind(completed);
    }
    if let Some(pattern) = &search_pattern {
        rows_query = rows_query.bind(pattern).bind(pattern);
    }
    let offset = (page - 1) * per_page;
    let todos = rows_query
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    Ok((todos, total))
}

pub async fn create(pool: &PgPool, owner_id: i32, input: &TodoCreate) -> Result<Todo, AppError> {
    let todo = sqlx::query_as::<_, Todo>(&format!(
        "INSERT INTO todos (title, description, owner_id) VALUES ($1, $2, $3) RETURNING {}",
        TODO_COLUMNS
    ))
    .bind(&input.title)
    .bind(&input.description)
    .bind(owner_id)
    .fetch_one(pool)
    .await?;
    Ok(todo)
}

pub async fn find(pool: &PgPool, owner_id: i32, todo_id: i32) -> Result<Option<Todo>, AppError> {
    let todo = sqlx::query_as::<_, Todo>(&format!(
        "SELECT {} FROM todos WHERE id = $1 AND owner_id = $2",
        TODO_COLUMNS
    ))
    .bind(todo_id)
    .bind(owner_id)
    .fetch_optional(pool)
    .await?;
    Ok(todo)
}

/// Applies only the fields present in `update`, as a single statement so a
/// partial field set can never persist. An empty update reads the row back
/// unchanged.
pub async fn update(
    pool: &PgPool,
    owner_id: i32,
    todo_id: i32,
    update: &TodoUpdate,
) -> Result<Option<Todo>, AppError> {
    if update.is_empty() {
        return find(pool, owner_id, todo_id).await;
    }

    let mut sets = vec!["updated_at = now()".to_string()];
    let mut param_count = 1;

    if update.title.is_some() {
        sets.push(format!("title = ${}", param_count));
        param_count += 1;
    }
    if update.description.is_some() {
        sets.push(format!("description = ${}", param_count));
        param_count += 1;
    }
    if update.completed.is_some() {
        sets.push(format!("completed = ${}", param_count));
        param_count += 1;
    }

    let sql = format!(
        "UPDATE todos SET {} WHERE id = ${} AND owner_id = ${} RETURNING {}",
        sets.join(", "),
        param_count,
        param_count + 1,
        TODO_COLUMNS
    );

    let mut query = sqlx::query_as::<_, Todo>(&sql);
    if let Some(title) = &update.title {
        query = query.bind(title);
    }
    if let Some(description) = &update.description {
        // Inner None binds SQL NULL, clearing the column.
        query = query.bind(description.clone());
    }
    if let Some(completed) = update.completed {
        query = query.bind(completed);
    }

    let todo = query
        .bind(todo_id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;
    Ok(todo)
}

/// Removes the row if owned. Repeating the delete finds nothing and reports
/// `false` to the caller.
pub async fn delete(pool: &PgPool, owner_id: i32, todo_id: i32) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND owner_id = $2")
        .bind(todo_id)
        .bind(owner_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Flips the completion flag in place, atomically.
pub async fn toggle(pool: &PgPool, owner_id: i32, todo_id: i32) -> Result<Option<Todo>, AppError> {
    let todo = sqlx::query_as::<_, Todo>(&format!(
        "UPDATE todos SET completed = NOT completed, updated_at = now() \
         WHERE id = $1 AND owner_id = $2 RETURNING {}",
        TODO_COLUMNS
    ))
    .bind(todo_id)
    .bind(owner_id)
    .fetch_optional(pool)
    .await?;
    Ok(todo)
}
