use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A todo row as stored in the database and returned by the API.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Todo {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    /// The owning user. Set at creation, never reassigned.
    pub owner_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Input for creating a todo. Completion always starts out false.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TodoCreate {
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// Optional, at most 1000 characters.
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

/// Partial update: only fields present in the request body are applied.
///
/// `description` is double-wrapped so an explicit `"description": null`
/// (clear the field) is distinguishable from the key being absent (leave it
/// unchanged).
#[derive(Debug, Default, Deserialize, Validate)]
pub struct TodoUpdate {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "present_or_absent")]
    pub description: Option<Option<String>>,

    pub completed: Option<bool>,
}

fn present_or_absent<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl TodoUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }
}

/// Query parameters for listing todos.
#[derive(Debug, Deserialize)]
pub struct TodoQuery {
    /// Page number, 1-based. Defaults to 1.
    pub page: Option<i64>,
    /// Items per page, 1-100. Defaults to 10.
    pub per_page: Option<i64>,
    /// Filter by completion status.
    pub completed: Option<bool>,
    /// Case-insensitive substring match against title or description.
    pub search: Option<String>,
}

/// Paginated todo list response. `total` counts the filtered set before
/// pagination.
#[derive(Debug, Serialize, Deserialize)]
pub struct TodoListResponse {
    pub todos: Vec<Todo>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}
