pub mod filter_bar;
pub mod help_bar;
pub mod nav_bar;
pub mod quote_card;
pub mod search_input;

use memorymap_core::tagging::hex_rgb;
use ratatui::style::Color;

/// Terminal color for a `#rrggbb` palette entry. Malformed values fall
/// back to the default foreground.
pub fn hex_color(hex: &str) -> Color {
    match hex_rgb(hex) {
        Some((r, g, b)) => Color::Rgb(r, g, b),
        None => Color::Reset,
    }
}
