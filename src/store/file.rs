//! Filesystem-backed settings store.
//!
//! Settings live in a single versioned JSON document. Writes are strict and
//! atomic; reads are lenient, backfilling missing or malformed fields from
//! defaults so one bad value never takes the whole theme system down.

use crate::color::Rgb;
use crate::error::StoreError;
use crate::settings::{Settings, ThemeMode, ThemeProfile};
use crate::store::SettingsStore;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// On-disk schema version for the settings document.
const SETTINGS_FILE_VERSION: u32 = 1;

/// Settings store persisting to one JSON file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

/// On-disk payload shape: version metadata plus the flattened settings keys.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PersistedSettings {
    version: u32,
    updated_at_millis: u64,
    #[serde(flatten)]
    settings: Settings,
}

impl FileStore {
    /// Create a store backed by the given file path.
    ///
    /// Parent directories are created on first save, not here.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SettingsStore for FileStore {
    async fn load(&self) -> Result<Settings, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Settings::default());
            }
            Err(e) => return Err(StoreError::Io(e)),
        };
        let doc: Value = match serde_json::from_str(&raw) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(
                    "settings file {} is not valid json ({e}); using defaults",
                    self.path.display()
                );
                return Ok(Settings::default());
            }
        };
        Ok(merge_with_defaults(&doc))
    }

    async fn save(&self, settings: &Settings) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let payload = PersistedSettings {
            version: SETTINGS_FILE_VERSION,
            updated_at_millis: now_unix_millis(),
            settings: settings.clone(),
        };
        let json = serde_json::to_vec_pretty(&payload)?;
        // Write to a sibling temporary file first so partial writes do not
        // corrupt the last known-good settings document.
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json)?;
        // Rename is atomic on most filesystems, making this "all or nothing".
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    async fn initialized(&self) -> Result<bool, StoreError> {
        Ok(self.path.exists())
    }
}

/// Build a complete settings value from a loose document, field by field.
fn merge_with_defaults(doc: &Value) -> Settings {
    if let Some(version) = doc.get("version").and_then(Value::as_u64) {
        if version > u64::from(SETTINGS_FILE_VERSION) {
            warn!(
                "settings document version {version} is newer than supported \
                 {SETTINGS_FILE_VERSION}; unknown fields are ignored"
            );
        }
    }
    let defaults = Settings::default();
    Settings {
        mode: merge_mode(doc.get("mode"), defaults.mode),
        dark_theme: merge_profile(doc.get("darkTheme"), ThemeProfile::dark_default(), "darkTheme"),
        eye_theme: merge_profile(doc.get("eyeTheme"), ThemeProfile::eye_default(), "eyeTheme"),
    }
}

fn merge_mode(value: Option<&Value>, default: ThemeMode) -> ThemeMode {
    let Some(value) = value else {
        return default;
    };
    match value.as_str() {
        // Documents written by the original extension used `none` for the
        // disabled state.
        Some("none") => {
            debug!("legacy mode `none` mapped to `off`");
            ThemeMode::Off
        }
        Some(raw) => match ThemeMode::parse(raw) {
            Some(mode) => mode,
            None => {
                warn!("unknown theme mode `{raw}`; falling back to `{default}`");
                default
            }
        },
        None => {
            warn!("theme mode is not a string; falling back to `{default}`");
            default
        }
    }
}

fn merge_profile(value: Option<&Value>, defaults: ThemeProfile, key: &str) -> ThemeProfile {
    let Some(value) = value else {
        return defaults;
    };
    ThemeProfile {
        background_color: merge_color(
            value.get("backgroundColor"),
            defaults.background_color,
            key,
            "backgroundColor",
        ),
        text_color: merge_color(value.get("textColor"), defaults.text_color, key, "textColor"),
        link_color: merge_color(value.get("linkColor"), defaults.link_color, key, "linkColor"),
        accent_color: merge_color(
            value.get("accentColor"),
            defaults.accent_color,
            key,
            "accentColor",
        ),
    }
}

fn merge_color(value: Option<&Value>, default: Rgb, profile: &str, field: &str) -> Rgb {
    let Some(value) = value else {
        return default;
    };
    match value.as_str().map(Rgb::parse) {
        Some(Ok(color)) => color,
        _ => {
            warn!("{profile}.{field} is not a valid color; falling back to {default}");
            default
        }
    }
}

/// Current Unix timestamp in milliseconds.
fn now_unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
