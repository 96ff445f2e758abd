//! Storage layer.
//!
//! All queries take the pool and, for todo operations, the owning user's id
//! explicitly — there is no ambient session. Todo queries always carry the
//! owner filter in SQL, so a foreign id and a nonexistent id are the same
//! empty result.

pub mod todos;
pub mod users;
