//! Backend Error Module
//!
//! - **`types`** - `BackendError` and its status/message mapping
//! - **`conversion`** - `IntoResponse` producing the JSON error envelope

pub mod types;

pub mod conversion;

pub use types::BackendError;

/// Result alias used by handlers and database helpers
pub type BackendResult<T> = Result<T, BackendError>;
