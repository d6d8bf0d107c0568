//! Pageshade applies user-configurable dark and eye-care themes to pages.
//!
//! A background controller owns the persisted settings document, per-page
//! agents restyle their own document from it, and a settings panel edits it.
//! The pieces share no memory; they coordinate over typed async messages
//! plus the store itself.
//!
//! # Quick start
//!
//! ```
//! use pageshade::css::{render_override, OverrideStrategy};
//! use pageshade::settings::{Settings, ThemeMode};
//!
//! let mut settings = Settings::default();
//! settings.mode = ThemeMode::Dark;
//! let css = render_override(&settings, OverrideStrategy::default()).unwrap();
//! assert!(css.contains("#121212"));
//! ```

pub mod color;
pub mod config;
pub mod controller;
pub mod css;
pub mod error;
pub mod page;
pub mod panel;
pub mod protocol;
pub mod settings;
pub mod store;
pub mod tabs;
#[cfg(test)]
pub mod testsupport;
pub mod ui;
