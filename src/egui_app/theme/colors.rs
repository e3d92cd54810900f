//! Color constants for the event board UI
//!
//! Warm brown/tan palette; dark panels, light cards.

use eframe::egui::Color32;

/// Top bar background - Dark brown
pub const TOP_BAR_BG: Color32 = Color32::from_rgb(0x3E, 0x2A, 0x24);

/// Dark background for main areas
pub const BG_DARK: Color32 = Color32::from_rgb(0x2F, 0x1E, 0x1A);

/// Event card background - Off-white
pub const CARD_BG: Color32 = Color32::from_rgb(0xF7, 0xF2, 0xEC);

/// Event card border - Muted brown
pub const CARD_BORDER: Color32 = Color32::from_rgb(0xC7, 0xB2, 0x9A);

/// Input background - Light tan
pub const INPUT_BG: Color32 = Color32::from_rgb(0xE6, 0xD7, 0xC7);

/// Hovered widget background
pub const HOVER_ITEM: Color32 = Color32::from_rgb(0x5C, 0x3A, 0x2C);

/// Selection highlight
pub const SELECTION: Color32 = Color32::from_rgb(0x4A, 0x2E, 0x22);

/// Text on dark backgrounds
pub const TEXT_LIGHT: Color32 = Color32::from_rgb(0xF0, 0xE0, 0xD6);

/// Text on light backgrounds
pub const TEXT_DARK: Color32 = Color32::from_rgb(0x2F, 0x1E, 0x1A);

/// Secondary text color (muted)
pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(0x8B, 0x7B, 0x6B);

/// Role badge / icons - Light brown
pub const ICONS: Color32 = Color32::from_rgb(0xC6, 0xB2, 0x9E);

pub const SUCCESS: Color32 = Color32::from_rgb(0x4C, 0xAF, 0x50);

pub const ERROR: Color32 = Color32::from_rgb(0xE5, 0x73, 0x73);

pub const WARNING: Color32 = Color32::from_rgb(0xFF, 0xA7, 0x26);

/// Primary button background
pub const BUTTON_PRIMARY: Color32 = Color32::from_rgb(0x5C, 0x3A, 0x2C);

/// Secondary button background
pub const BUTTON_SECONDARY: Color32 = Color32::from_rgb(0xC7, 0xB2, 0x9A);

/// Destructive button background
pub const BUTTON_DANGER: Color32 = Color32::from_rgb(0x9C, 0x3B, 0x32);
