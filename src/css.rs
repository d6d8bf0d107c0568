//! Override stylesheet generation.
//!
//! The generated sheet is a pure function of the settings and the chosen
//! override strategy: same inputs, byte-identical output. Every declaration
//! carries exactly one `!important` so the override outranks page styles
//! without depending on selector specificity.

use crate::settings::{Settings, ThemeProfile};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Brightness shift applied to the profile background for code blocks.
const CODE_BLOCK_SHIFT_PERCENT: i16 = -10;

/// How aggressively the generated sheet overrides page styling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverrideStrategy {
    /// Element-targeted rules only.
    Narrow,
    /// Element-targeted rules plus catch-all coverage: a `body *` color
    /// sweep, app-root containers, background-image flattening, and an
    /// inheritance safety net for anything not explicitly matched.
    #[default]
    BroadInherit,
}

impl OverrideStrategy {
    /// Parse a user-supplied strategy name.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "narrow" => Some(Self::Narrow),
            "broad-inherit" => Some(Self::BroadInherit),
            _ => None,
        }
    }

    /// Canonical kebab-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Narrow => "narrow",
            Self::BroadInherit => "broad-inherit",
        }
    }
}

impl fmt::Display for OverrideStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render the override sheet for the active mode, or `None` when the
/// override is off and no style node should exist.
pub fn render_override(settings: &Settings, strategy: OverrideStrategy) -> Option<String> {
    let theme = settings.active_profile()?;
    let sheet = match strategy {
        OverrideStrategy::Narrow => {
            let mut sheet = narrow_prelude(theme);
            sheet.push_str(&shared_rules(theme));
            sheet
        }
        OverrideStrategy::BroadInherit => {
            let mut sheet = broad_prelude(theme);
            sheet.push_str(&shared_rules(theme));
            sheet.push_str(&broad_tail(theme));
            sheet
        }
    };
    Some(sheet)
}

/// Base-element rules for the narrow strategy.
fn narrow_prelude(theme: &ThemeProfile) -> String {
    format!(
        "\
/* base elements */
body, html {{
  background-color: {background} !important;
  color: {text} !important;
}}
",
        background = theme.background_color,
        text = theme.text_color,
    )
}

/// High-priority base coverage for the broad strategy.
fn broad_prelude(theme: &ThemeProfile) -> String {
    format!(
        "\
/* base elements, widened to outrank page styles */
html, body, body * {{
  background-color: {background} !important;
  color: {text} !important;
}}

:root, body {{
  background-color: {background} !important;
  color: {text} !important;
}}

/* roots carrying inline styles */
body[style], html[style] {{
  background-color: {background} !important;
  color: {text} !important;
}}
",
        background = theme.background_color,
        text = theme.text_color,
    )
}

/// Rule catalogue shared by both strategies.
fn shared_rules(theme: &ThemeProfile) -> String {
    format!(
        "
/* text elements */
h1, h2, h3, h4, h5, h6, p, span, div, li, td, th, label, a {{
  color: {text} !important;
}}

/* links */
a {{
  color: {link} !important;
}}

a:hover {{
  color: {accent} !important;
}}

/* inputs */
input, textarea, select, button {{
  background-color: {background} !important;
  color: {text} !important;
  border-color: {accent} !important;
}}

/* buttons */
button {{
  background-color: {accent} !important;
  color: {background} !important;
}}

/* cards and panels */
.card, .panel, .box, .container {{
  background-color: {background} !important;
  border-color: {accent} !important;
}}

/* navigation */
nav, .navbar, .header, .topbar {{
  background-color: {background} !important;
  border-color: {accent} !important;
}}

/* sidebars */
.sidebar, .aside, .leftbar, .rightbar {{
  background-color: {background} !important;
  border-color: {accent} !important;
}}

/* code blocks */
pre, code {{
  background-color: {code_background} !important;
  color: {text} !important;
  border-color: {accent} !important;
}}

/* tables */
table {{
  background-color: {background} !important;
  border-color: {accent} !important;
}}

th, td {{
  border-color: {accent} !important;
}}

/* images */
img {{
  opacity: 0.9 !important;
}}

/* scrollbars */
::-webkit-scrollbar {{
  background-color: {background} !important;
}}

::-webkit-scrollbar-thumb {{
  background-color: {accent} !important;
}}

/* elements with conflicting inline styles */
[style*=\"background\"], [style*=\"color\"] {{
  background-color: {background} !important;
  color: {text} !important;
}}
",
        background = theme.background_color,
        text = theme.text_color,
        link = theme.link_color,
        accent = theme.accent_color,
        code_background = theme.background_color.shift(CODE_BLOCK_SHIFT_PERCENT),
    )
}

/// Catch-all coverage appended by the broad strategy.
fn broad_tail(theme: &ThemeProfile) -> String {
    format!(
        "
/* common app containers */
#root, #app, #content, .main-container, .site-wrapper, .wrapper {{
  background-color: {background} !important;
  color: {text} !important;
}}

/* background images */
[style*=\"background-image\"] {{
  background-color: {background} !important;
  background-blend-mode: overlay !important;
  opacity: 0.9 !important;
}}

/* iframes */
iframe {{
  background-color: {background} !important;
}}

/* inheritance safety net */
* {{
  background-color: inherit !important;
  color: inherit !important;
}}

/* re-assert the root chain the safety net inherits from */
:root, body {{
  background-color: {background} !important;
  color: {text} !important;
}}
",
        background = theme.background_color,
        text = theme.text_color,
    )
}
