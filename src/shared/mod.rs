//! Shared Module
//!
//! This module contains types and data structures that are shared between
//! the native client and the backend. These types are what travels over
//! the JSON API, so both sides serialize and deserialize the same shapes.
//!
//! # Overview
//!
//! The shared module provides platform-agnostic types that can be used
//! in both server and client code:
//! - Users and roles
//! - Events, drafts, updates and the registration roster rules
//! - Request/response bodies of the auth endpoints
//! - Shared error and configuration types

/// User and role types
pub mod user;

/// Event data structures and roster rules
pub mod event;

/// API request and response bodies
pub mod api;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use user::{Role, User};
pub use event::{Event, EventDraft, EventUpdate, RegistrationAction};
pub use api::{
    AuthResponse, ErrorBody, LoginRequest, MessageResponse, RefreshRequest, RegisterRequest,
    UserUpdate,
};
pub use error::SharedError;
pub use config::{AppConfig, AppConfigBuilder, ConfigError, RefreshPolicy};
