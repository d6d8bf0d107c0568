//! Terminal output renderer for settings display and status messages.
//!
//! This is the single place to tweak labels, glyphs, and colors for the CLI
//! surface. Settings output goes to stdout; warnings and errors go to stderr.

use crate::color::Rgb;
use crossterm::style::{Color, Stylize};

pub const INDENT_1: &str = "  ";
pub const LABEL_WARNING: &str = "warning:";
pub const LABEL_ERROR: &str = "error:";
pub const GLYPH_SECTION_BULLET: &str = "•";

const COLOR_SECTION_BULLET: Color = Color::DarkGrey;
const COLOR_SECTION_TITLE: Color = Color::Cyan;
const COLOR_FIELD_KEY: Color = Color::DarkGrey;
const COLOR_FIELD_VALUE: Color = Color::White;
const COLOR_WARNING: Color = Color::Yellow;
const COLOR_ERROR: Color = Color::Red;

/// Handles all terminal output formatting.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    /// Whether ANSI color/style output is enabled.
    color: bool,
}

impl Renderer {
    /// Create a renderer with optional color output.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Print a titled section header.
    pub fn section(&self, title: &str) {
        if self.color {
            println!(
                "{} {}",
                GLYPH_SECTION_BULLET.with(COLOR_SECTION_BULLET),
                title.with(COLOR_SECTION_TITLE).bold()
            );
        } else {
            println!("{title}:");
        }
    }

    /// Print a key/value line under a section.
    pub fn field(&self, key: &str, value: &str) {
        if self.color {
            println!(
                "{INDENT_1}{} {}",
                format!("{key}:").with(COLOR_FIELD_KEY),
                value.with(COLOR_FIELD_VALUE),
            );
        } else {
            println!("{INDENT_1}{key}: {value}");
        }
    }

    /// Print a key/value line where the value is a color, tinted with itself.
    pub fn swatch(&self, key: &str, color: Rgb) {
        if self.color {
            println!(
                "{INDENT_1}{} {}",
                format!("{key}:").with(COLOR_FIELD_KEY),
                color.to_string().with(Color::Rgb {
                    r: color.r,
                    g: color.g,
                    b: color.b,
                }),
            );
        } else {
            println!("{INDENT_1}{key}: {color}");
        }
    }

    /// Print a simple indented detail line.
    pub fn detail(&self, text: &str) {
        if self.color {
            println!("{INDENT_1}{}", text.with(COLOR_FIELD_VALUE));
        } else {
            println!("{INDENT_1}{text}");
        }
    }

    /// Print a raw output line, unindented and unstyled.
    pub fn out(&self, text: &str) {
        println!("{text}");
    }

    /// Print a warning (to stderr).
    pub fn warn(&self, msg: &str) {
        if self.color {
            eprintln!("{} {msg}", LABEL_WARNING.with(COLOR_WARNING).bold());
        } else {
            eprintln!("{LABEL_WARNING} {msg}");
        }
    }

    /// Print an error (to stderr).
    pub fn error(&self, msg: &str) {
        if self.color {
            eprintln!("{} {msg}", LABEL_ERROR.with(COLOR_ERROR).bold());
        } else {
            eprintln!("{LABEL_ERROR} {msg}");
        }
    }
}
