//! Authentication Module
//!
//! - **`users`** - user rows and queries
//! - **`sessions`** - JWT access tokens and server-side sessions
//! - **`handlers`** - the `/api/auth/*` endpoints
//!
//! # Authentication Flow
//!
//! 1. **Register / Login**: credentials checked, session row created, access
//!    token (15 min) and refresh token (30 days) returned
//! 2. **Authenticated call**: middleware verifies the access token and that
//!    its session still exists
//! 3. **Refresh**: refresh token exchanged for a new pair
//! 4. **Logout**: session row deleted
//!
//! Passwords are hashed with bcrypt.

pub mod users;

pub mod sessions;

pub mod handlers;

pub use handlers::{get_me, login, logout, refresh, register};
