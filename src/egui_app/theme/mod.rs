//! Theme Module
//!
//! Color constants and styling helpers used by every view.
//!
//! ```rust,ignore
//! use crate::egui_app::theme::{colors, styles};
//!
//! styles::apply_global_theme(ctx);
//! styles::card_frame().show(ui, |ui| {
//!     ui.colored_label(colors::TEXT_DARK, "Beach cleanup");
//! });
//! ```

pub mod colors;
pub mod styles;
