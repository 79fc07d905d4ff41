//! Color constants for the terminal user interface.

use ratatui::style::Color;

/// Header, focused borders and the status bar.
pub const ACCENT_BLUE: Color = Color::Rgb(37, 99, 235);
/// Completed rows.
pub const DONE_GREEN: Color = Color::Rgb(34, 139, 34);
/// Edit mode marker.
pub const EDIT_ORANGE: Color = Color::Rgb(249, 115, 22);
/// Delete confirmation.
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);
