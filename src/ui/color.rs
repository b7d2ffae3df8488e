//! Colored console output with a global on/off switch.

use std::sync::atomic::{AtomicBool, Ordering};

pub use crossterm::style::Color;
use crossterm::style::Stylize;

static COLOR_ON: AtomicBool = AtomicBool::new(true);

/// Disable or re-enable color (the `color=off` CLI argument).
pub fn set_color(enabled: bool) {
    COLOR_ON.store(enabled, Ordering::Relaxed);
}

pub fn color_enabled() -> bool {
    COLOR_ON.load(Ordering::Relaxed)
}

/// Wrap `text` in the given color when coloring is on.
pub fn paint(color: Color, text: &str) -> String {
    if color_enabled() {
        text.with(color).to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_color_passes_text_through() {
        set_color(false);
        assert_eq!(paint(Color::Red, "plain"), "plain");
        set_color(true);
        assert_ne!(paint(Color::Red, "plain"), "plain");
    }
}
