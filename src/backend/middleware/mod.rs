//! Middleware Module
//!
//! - **`auth`** - bearer-token check for protected routes, plus the
//!   `AuthUser` / `AdminUser` extractors handlers use

pub mod auth;

pub use auth::{auth_middleware, AdminUser, AuthUser, AuthenticatedUser};
