//! Theme settings data model and hardcoded defaults.
//!
//! [`Settings`] is the single persisted preference set: the active mode plus
//! one color profile per theme. The inactive profile is always retained so
//! switching modes never loses prior customization. Serde names match the
//! persisted key layout (`mode`, `darkTheme`, `eyeTheme`).

use crate::color::Rgb;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which override theme (if any) is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Off,
    Dark,
    Eye,
}

impl ThemeMode {
    /// Parse a user-supplied mode name.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "off" => Some(Self::Off),
            "dark" => Some(Self::Dark),
            "eye" => Some(Self::Eye),
            _ => None,
        }
    }

    /// Canonical lowercase name, matching the persisted form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Dark => "dark",
            Self::Eye => "eye",
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One editable color slot within a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorField {
    Background,
    Text,
    Link,
    Accent,
}

impl ColorField {
    /// Parse a user-supplied field name.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "background" | "bg" => Some(Self::Background),
            "text" => Some(Self::Text),
            "link" => Some(Self::Link),
            "accent" => Some(Self::Accent),
            _ => None,
        }
    }

    /// Canonical lowercase name for display.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::Text => "text",
            Self::Link => "link",
            Self::Accent => "accent",
        }
    }
}

/// Four-color palette for one theme mode.
///
/// All four fields are always present; partial profiles never exist in
/// memory (store loading backfills missing fields with defaults).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeProfile {
    pub background_color: Rgb,
    pub text_color: Rgb,
    pub link_color: Rgb,
    pub accent_color: Rgb,
}

impl ThemeProfile {
    /// Hardcoded dark preset.
    pub const fn dark_default() -> Self {
        Self {
            background_color: Rgb::new(0x12, 0x12, 0x12),
            text_color: Rgb::new(0xe0, 0xe0, 0xe0),
            link_color: Rgb::new(0x8a, 0xb4, 0xf8),
            accent_color: Rgb::new(0xbb, 0x86, 0xfc),
        }
    }

    /// Hardcoded eye-comfort preset.
    pub const fn eye_default() -> Self {
        Self {
            background_color: Rgb::new(0xf2, 0xf2, 0xe8),
            text_color: Rgb::new(0x33, 0x33, 0x33),
            link_color: Rgb::new(0x00, 0x66, 0xcc),
            accent_color: Rgb::new(0x66, 0x99, 0xcc),
        }
    }

    /// Read one color slot.
    pub fn get(&self, field: ColorField) -> Rgb {
        match field {
            ColorField::Background => self.background_color,
            ColorField::Text => self.text_color,
            ColorField::Link => self.link_color,
            ColorField::Accent => self.accent_color,
        }
    }

    /// Overwrite one color slot.
    pub fn set(&mut self, field: ColorField, value: Rgb) {
        match field {
            ColorField::Background => self.background_color = value,
            ColorField::Text => self.text_color = value,
            ColorField::Link => self.link_color = value,
            ColorField::Accent => self.accent_color = value,
        }
    }
}

/// Complete persisted preference set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub mode: ThemeMode,
    pub dark_theme: ThemeProfile,
    pub eye_theme: ThemeProfile,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: ThemeMode::Off,
            dark_theme: ThemeProfile::dark_default(),
            eye_theme: ThemeProfile::eye_default(),
        }
    }
}

impl Settings {
    /// Profile selected by the current mode, or `None` when the override
    /// is off.
    pub fn active_profile(&self) -> Option<&ThemeProfile> {
        self.profile(self.mode)
    }

    /// Profile for a given mode (`None` for [`ThemeMode::Off`]).
    pub fn profile(&self, mode: ThemeMode) -> Option<&ThemeProfile> {
        match mode {
            ThemeMode::Off => None,
            ThemeMode::Dark => Some(&self.dark_theme),
            ThemeMode::Eye => Some(&self.eye_theme),
        }
    }

    /// Mutable profile for a given mode (`None` for [`ThemeMode::Off`]).
    pub fn profile_mut(&mut self, mode: ThemeMode) -> Option<&mut ThemeProfile> {
        match mode {
            ThemeMode::Off => None,
            ThemeMode::Dark => Some(&mut self.dark_theme),
            ThemeMode::Eye => Some(&mut self.eye_theme),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_match_documented_palette() {
        let settings = Settings::default();
        assert_eq!(settings.mode, ThemeMode::Off);
        assert_eq!(settings.dark_theme.background_color.to_string(), "#121212");
        assert_eq!(settings.dark_theme.accent_color.to_string(), "#bb86fc");
        assert_eq!(settings.eye_theme.background_color.to_string(), "#f2f2e8");
        assert_eq!(settings.eye_theme.link_color.to_string(), "#0066cc");
    }

    #[test]
    fn serialized_shape_matches_persisted_layout() {
        let value = serde_json::to_value(Settings::default()).expect("serialize");
        assert_eq!(
            value,
            json!({
                "mode": "off",
                "darkTheme": {
                    "backgroundColor": "#121212",
                    "textColor": "#e0e0e0",
                    "linkColor": "#8ab4f8",
                    "accentColor": "#bb86fc"
                },
                "eyeTheme": {
                    "backgroundColor": "#f2f2e8",
                    "textColor": "#333333",
                    "linkColor": "#0066cc",
                    "accentColor": "#6699cc"
                }
            })
        );
    }

    #[test]
    fn serde_round_trip_preserves_edits() {
        let mut settings = Settings::default();
        settings.mode = ThemeMode::Eye;
        settings.eye_theme.text_color = Rgb::new(1, 2, 3);
        let raw = serde_json::to_string(&settings).expect("serialize");
        let back: Settings = serde_json::from_str(&raw).expect("deserialize");
        assert_eq!(back, settings);
    }

    #[test]
    fn mode_parse_accepts_canonical_names() {
        assert_eq!(ThemeMode::parse("off"), Some(ThemeMode::Off));
        assert_eq!(ThemeMode::parse(" Dark "), Some(ThemeMode::Dark));
        assert_eq!(ThemeMode::parse("eye"), Some(ThemeMode::Eye));
        assert_eq!(ThemeMode::parse("none"), None);
    }

    #[test]
    fn active_profile_follows_mode() {
        let mut settings = Settings::default();
        assert!(settings.active_profile().is_none());
        settings.mode = ThemeMode::Dark;
        assert_eq!(
            settings.active_profile().expect("dark profile"),
            &ThemeProfile::dark_default()
        );
        settings.mode = ThemeMode::Eye;
        assert_eq!(
            settings.active_profile().expect("eye profile"),
            &ThemeProfile::eye_default()
        );
    }

    #[test]
    fn color_field_get_set_round_trip() {
        let mut profile = ThemeProfile::dark_default();
        for field in [
            ColorField::Background,
            ColorField::Text,
            ColorField::Link,
            ColorField::Accent,
        ] {
            profile.set(field, Rgb::new(9, 9, 9));
            assert_eq!(profile.get(field), Rgb::new(9, 9, 9));
        }
    }
}
