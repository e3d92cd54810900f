//! Route Configuration Module
//!
//! - **`router`** - top-level router, layers and fallback
//! - **`api_routes`** - public and protected `/api` routes

pub mod router;

pub mod api_routes;

pub use router::create_router;
