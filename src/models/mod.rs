pub mod todo;
pub mod user;

pub use todo::{Todo, TodoCreate, TodoListResponse, TodoQuery, TodoUpdate};
pub use user::{User, UserResponse};
