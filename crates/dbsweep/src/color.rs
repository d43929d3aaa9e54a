//! CLI color helpers.
//!
//! All functions respect `NO_COLOR`, `FORCE_COLOR`, and TTY detection via
//! `owo-colors`' `if_supports_color()`.

use owo_colors::OwoColorize;
use owo_colors::Stream::{Stderr, Stdout};

/// Call once from main.rs when `--no-color` is passed.
pub fn set_no_color() {
    // SAFETY: Called once at startup before any threads are spawned.
    unsafe { std::env::set_var("NO_COLOR", "1") };
}

// Slate (category names, site ids): #7CB4C8
const SLATE: (u8, u8, u8) = (124, 180, 200);

// Moss (rows removed): #6B8F5E
const MOSS: (u8, u8, u8) = (107, 143, 94);

// Amber (warnings, dry results): #C49A5C
const AMBER: (u8, u8, u8) = (196, 154, 92);

// Rust (failures): #B87060
const RUST: (u8, u8, u8) = (184, 112, 96);

// Text muted: #5C6370
const MUTED: (u8, u8, u8) = (92, 99, 112);

pub fn accent(text: &str) -> String {
    text.if_supports_color(Stdout, |t| t.truecolor(SLATE.0, SLATE.1, SLATE.2))
        .to_string()
}

pub fn success(text: &str) -> String {
    text.if_supports_color(Stdout, |t| t.truecolor(MOSS.0, MOSS.1, MOSS.2))
        .to_string()
}

pub fn warning(text: &str) -> String {
    text.if_supports_color(Stdout, |t| t.truecolor(AMBER.0, AMBER.1, AMBER.2))
        .to_string()
}

pub fn bold(text: &str) -> String {
    text.if_supports_color(Stdout, |t| t.bold()).to_string()
}

/// Secondary info and hints.
pub fn muted(text: &str) -> String {
    text.if_supports_color(Stdout, |t| t.truecolor(MUTED.0, MUTED.1, MUTED.2))
        .to_string()
}

/// Error styling for stderr messages.
pub fn error(text: &str) -> String {
    text.if_supports_color(Stderr, |t| t.truecolor(RUST.0, RUST.1, RUST.2))
        .to_string()
}

/// Color an affected-row count: green when rows went away, muted for zero.
pub fn count(affected: u64) -> String {
    let text = affected.to_string();
    if affected > 0 {
        success(&text)
    } else {
        muted(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helpers_keep_text() {
        // Test output is not a TTY, so no escape codes are added.
        assert!(accent("unused_relationships").contains("unused_relationships"));
        assert!(error("boom").contains("boom"));
        assert!(count(0).contains('0'));
        assert!(count(12).contains("12"));
    }
}
