//! Configuration loading.
//!
//! Source order implements the precedence contract:
//! explicit path > local `./pageshade.toml` > global
//! `~/.config/pageshade/pageshade.toml` > built-in defaults.

use crate::css::OverrideStrategy;
use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Raw deserialized shape of `pageshade.toml`.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub store: StoreFileConfig,
    pub theme: ThemeFileConfig,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct StoreFileConfig {
    /// Path of the settings JSON document.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ThemeFileConfig {
    /// Override strategy name: `narrow` or `broad-inherit`.
    pub strategy: Option<String>,
}

/// Fully resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub store_path: PathBuf,
    pub strategy: OverrideStrategy,
}

/// Non-fatal findings collected while loading config.
#[derive(Debug, Default, Clone)]
pub struct ConfigDiagnostics {
    pub warnings: Vec<String>,
}

/// Resolved config plus the diagnostics produced while resolving it.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub diagnostics: ConfigDiagnostics,
}

/// Load configuration from disk.
///
/// `path_override` is an explicit config file path (from --config flag).
/// Returns the resolved config plus any non-fatal diagnostics.
pub fn load_config(path_override: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    load_config_from_sources(
        path_override,
        |path| std::fs::read_to_string(path),
        config_root_dir,
    )
}

fn load_config_from_sources<FRead, FRoot>(
    path_override: Option<&Path>,
    read_file: FRead,
    config_root: FRoot,
) -> Result<LoadedConfig, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FRoot: Fn() -> Option<PathBuf>,
{
    let text = read_config_text(path_override, &read_file, &config_root)?;
    let parsed: FileConfig = toml::from_str(&text)?;
    let mut diagnostics = ConfigDiagnostics::default();

    let strategy = match parsed.theme.strategy.as_deref() {
        None => OverrideStrategy::default(),
        Some(raw) => match OverrideStrategy::parse(raw) {
            Some(strategy) => strategy,
            None => {
                let fallback = OverrideStrategy::default();
                diagnostics.warnings.push(format!(
                    "unknown override strategy `{raw}`; using `{fallback}`"
                ));
                fallback
            }
        },
    };
    let store_path = parsed
        .store
        .path
        .or_else(|| config_root().map(default_store_path_under))
        .unwrap_or_else(|| PathBuf::from("pageshade-settings.json"));

    Ok(LoadedConfig {
        config: Config {
            store_path,
            strategy,
        },
        diagnostics,
    })
}

/// Read config text from the highest-precedence available source.
fn read_config_text<FRead, FRoot>(
    path_override: Option<&Path>,
    read_file: &FRead,
    config_root: &FRoot,
) -> Result<String, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FRoot: Fn() -> Option<PathBuf>,
{
    // 1) Explicit override path from CLI takes absolute precedence. A missing
    //    explicit file is an error, not a fallthrough.
    if let Some(path) = path_override {
        return Ok(read_file(path)?);
    }
    // 2) Local config next to the working directory.
    if let Ok(text) = read_file(Path::new("pageshade.toml")) {
        return Ok(text);
    }
    // 3) Global per-user config.
    if let Some(dir) = config_root() {
        let global = dir.join("pageshade").join("pageshade.toml");
        if let Ok(text) = read_file(&global) {
            return Ok(text);
        }
    }
    // 4) Nothing found; empty text parses into defaults.
    Ok(String::new())
}

fn default_store_path_under(root: PathBuf) -> PathBuf {
    root.join("pageshade").join("settings.json")
}

/// Resolve the base config directory from env/home conventions.
pub fn config_root_dir() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("XDG_CONFIG_HOME") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }
    dirs::home_dir()
        .map(|home| home.join(".config"))
        .or_else(dirs::config_dir)
}
