//! User Management Module
//!
//! Admin-only endpoints over the `users` table:
//!
//! - `GET /api/users`
//! - `GET /api/users/{id}`
//! - `PUT /api/users/{id}` (name and role)
//! - `DELETE /api/users/{id}`

pub mod handlers;

pub use handlers::{delete_user, get_user, list_users, update_user};
