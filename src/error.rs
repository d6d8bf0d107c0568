//! Unified error types for the theming engine.

use crate::tabs::TabId;
use std::fmt;

// ---------------------------------------------------------------------------
// ColorParseError
// ---------------------------------------------------------------------------

/// A color value failed to parse as `#rrggbb`.
///
/// Carries the rejected input so user-facing messages can echo it back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorParseError {
    /// The input that failed to parse.
    pub input: String,
}

impl ColorParseError {
    /// Build an error for the given rejected input.
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid hex color `{}` (expected #rrggbb)", self.input)
    }
}

impl std::error::Error for ColorParseError {}

// ---------------------------------------------------------------------------
// StoreError
// ---------------------------------------------------------------------------

/// Errors from reading or writing the persisted settings store.
#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Json(serde_json::Error),
    /// The store backend refused or timed out.
    Unavailable(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Json(e) => write!(f, "json: {e}"),
            Self::Unavailable(msg) => write!(f, "store unavailable: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

// ---------------------------------------------------------------------------
// ProtocolError
// ---------------------------------------------------------------------------

/// Errors in cross-component message passing.
#[derive(Debug)]
pub enum ProtocolError {
    /// The controller task is no longer running.
    ControllerGone,
    /// The reply channel closed before a response arrived.
    ReplyDropped,
    /// A directive targeted a tab with no live page agent.
    NoReceiver(TabId),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ControllerGone => write!(f, "controller channel closed"),
            Self::ReplyDropped => write!(f, "reply channel dropped before response"),
            Self::NoReceiver(tab) => write!(f, "no page agent registered for {tab}"),
        }
    }
}

impl std::error::Error for ProtocolError {}

// ---------------------------------------------------------------------------
// RequestError
// ---------------------------------------------------------------------------

/// Failure of a controller round-trip: either the transport broke or the
/// controller reached the store and the store operation failed.
#[derive(Debug)]
pub enum RequestError {
    Protocol(ProtocolError),
    Store(StoreError),
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Protocol(e) => write!(f, "protocol: {e}"),
            Self::Store(e) => write!(f, "store: {e}"),
        }
    }
}

impl std::error::Error for RequestError {}

impl From<ProtocolError> for RequestError {
    fn from(e: ProtocolError) -> Self {
        Self::Protocol(e)
    }
}

impl From<StoreError> for RequestError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors when loading or parsing configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Toml(e) => write!(f, "toml: {e}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

// ---------------------------------------------------------------------------
// CliError
// ---------------------------------------------------------------------------

/// Top-level error type for CLI command handlers.
#[derive(Debug)]
pub enum CliError {
    Config(ConfigError),
    Store(StoreError),
    Color(ColorParseError),
    Request(RequestError),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Store(e) => write!(f, "store: {e}"),
            Self::Color(e) => write!(f, "color: {e}"),
            Self::Request(e) => write!(f, "request: {e}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl From<ColorParseError> for CliError {
    fn from(e: ColorParseError) -> Self {
        Self::Color(e)
    }
}

impl From<RequestError> for CliError {
    fn from(e: RequestError) -> Self {
        Self::Request(e)
    }
}
