//! egui Native Desktop App Module
//!
//! The event board's view layer: a native egui/eframe window over the
//! [`crate::client`] core.
//!
//! # Module Structure
//!
//! ```text
//! egui_app/
//! ├── mod.rs     - Module exports and documentation
//! ├── main.rs    - eframe entry point (binary)
//! ├── config.rs  - AppConfig wrapper, gateway construction
//! ├── forms.rs   - login/register/event form models
//! ├── state/     - AppState, background results channel
//! ├── views/     - navbar, auth, dashboard, event form
//! └── theme/     - colors and styles
//! ```
//!
//! Background calls run on a tokio runtime owned by [`AppState`]; their
//! results come back over a channel and are applied at the start of the
//! next frame by [`AppState::poll`].

pub mod config;
pub mod forms;
pub mod state;
pub mod theme;
pub mod views;

pub use config::Config;
pub use forms::{EventForm, LoginForm, RegisterForm};
pub use state::{AppMessage, AppState, StartupError};
