//! Eventboard - Main Library
//!
//! A community-events sign-up board: admins schedule events that need a
//! number of workers, workers register and unregister for them.
//!
//! # Module Structure
//!
//! - **`shared`** - Types shared between client and backend
//!   - Users and roles, events and the roster rule
//!   - Auth request/response bodies, error and config types
//!
//! - **`client`** - Credential lifecycle core
//!   - Credential store over durable session storage
//!   - API gateway: bearer header, 401 refresh-and-retry, forced logout
//!   - Credential provider capability and session context
//!   - Router guard
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Axum HTTP server over SQLite
//!   - JWT access tokens with rotating refresh sessions
//!   - Event CRUD and registration with a capacity guard
//!
//! - **`egui_app`** - Native desktop app (egui/eframe)
//!
//! # Feature Flags
//!
//! - **`ssr`** - Enables the backend modules and the `eventboard-server`
//!   binary (axum, sqlx, bcrypt, jsonwebtoken)
//!
//! # Usage
//!
//! ```rust,no_run
//! use eventboard::backend::{create_app, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app(ServerConfig::from_env()?).await?;
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! - `shared::error::SharedError` for validation
//! - `client::GatewayError` for every backend call made by the client
//! - `backend::error::BackendError`, rendered as `{ message, status }`

/// Shared types and data structures
pub mod shared;

/// Credential lifecycle core used by the desktop app
pub mod client;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;

/// egui native desktop app
#[cfg(not(target_arch = "wasm32"))]
pub mod egui_app;
