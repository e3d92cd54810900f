//! Backend Module
//!
//! The event board API: an Axum HTTP server over SQLite. Only compiled with
//! the `ssr` feature.
//!
//! # Architecture
//!
//! - **`server`** - configuration, state, app creation
//! - **`routes`** - router assembly
//! - **`auth`** - users, sessions, JWT, `/api/auth/*`
//! - **`events`** - event CRUD and the registration roster
//! - **`users`** - admin user management
//! - **`middleware`** - bearer-token authentication
//! - **`error`** - `BackendError` and its JSON response
//!
//! ```text
//! backend/
//! ├── server/      - ServerConfig, AppState, create_app
//! ├── routes/      - create_router, api routes
//! ├── auth/        - users, sessions, handlers
//! ├── events/      - db, handlers
//! ├── users/       - admin handlers
//! ├── middleware/  - auth_middleware, AuthUser, AdminUser
//! └── error/       - BackendError
//! ```

pub mod server;

pub mod routes;

pub mod auth;

pub mod events;

pub mod users;

pub mod middleware;

pub mod error;

pub use error::BackendError;
pub use server::{create_app, AppState, ServerConfig};
