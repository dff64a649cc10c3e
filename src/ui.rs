//! Terminal output for the kovl CLI.
//!
//! Design constraints:
//! - Only 5 semantic colors (`colors::*`)
//! - All icons must be sourced from this module (Unicode + ASCII fallback)
//! - Color only when writing to a real terminal, unless forced

use crossterm::style::{Color, Stylize};
use is_terminal::IsTerminal;

use crate::config::ColorMode;

pub mod colors {
    use super::Color;

    pub const SUCCESS: Color = Color::Green;
    pub const ERROR: Color = Color::Red;
    pub const WARNING: Color = Color::Yellow;
    pub const INFO: Color = Color::Cyan;
    pub const DIM: Color = Color::DarkGrey;
}

pub mod icons {
    pub const SUCCESS: &str = "✓";
    pub const ERROR: &str = "✗";
    pub const WARNING: &str = "⚠";
    pub const BUILD: &str = "⚙";
    pub const WATCH: &str = "⟳";
    pub const DIFF: &str = "Δ";
}

pub mod icons_ascii {
    pub const SUCCESS: &str = "[OK]";
    pub const ERROR: &str = "[FAIL]";
    pub const WARNING: &str = "[WARN]";
    pub const BUILD: &str = "[BUILD]";
    pub const WATCH: &str = "[~]";
    pub const DIFF: &str = "[DIFF]";
}

/// Styled stderr reporting for commands.
///
/// Resolved manifests go to stdout untouched; everything the human reads
/// (status, warnings, diffs) goes through here.
#[derive(Debug, Clone, Copy)]
pub struct Console {
    color: bool,
    unicode: bool,
}

impl Console {
    pub fn new(mode: ColorMode, unicode: bool) -> Self {
        let color = match mode {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => std::io::stderr().is_terminal(),
        };
        Self { color, unicode }
    }

    pub fn paint(&self, color: Color, text: &str) -> String {
        if self.color {
            format!("{}", text.with(color))
        } else {
            text.to_string()
        }
    }

    pub fn warning_icon(&self) -> &'static str {
        if self.unicode {
            icons::WARNING
        } else {
            icons_ascii::WARNING
        }
    }

    pub fn success_icon(&self) -> &'static str {
        if self.unicode {
            icons::SUCCESS
        } else {
            icons_ascii::SUCCESS
        }
    }

    pub fn error_icon(&self) -> &'static str {
        if self.unicode {
            icons::ERROR
        } else {
            icons_ascii::ERROR
        }
    }

    pub fn warn(&self, message: &str) {
        eprintln!(
            "{} {}",
            self.paint(colors::WARNING, self.warning_icon()),
            message
        );
    }

    pub fn success(&self, message: &str) {
        eprintln!(
            "{} {}",
            self.paint(colors::SUCCESS, self.success_icon()),
            message
        );
    }

    pub fn error(&self, message: &str) {
        eprintln!(
            "{} {}",
            self.paint(colors::ERROR, self.error_icon()),
            message
        );
    }

    pub fn info(&self, message: &str) {
        eprintln!("{}", self.paint(colors::DIM, message));
    }
}
