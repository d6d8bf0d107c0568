//! Message contracts between the controller, page agents, and the panel.
//!
//! Requests that expect an answer embed a oneshot reply sender, so "keep the
//! reply channel open until the store call completes" is enforced by the
//! types: the only way to answer is to send on the channel, and dropping it
//! surfaces to the requester as a recv error. [`WireMessage`] mirrors the
//! same protocol as serializable records for logging and inspection.

use crate::error::StoreError;
use crate::settings::Settings;
use crate::tabs::TabId;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

/// Requests handled by the controller actor.
#[derive(Debug)]
pub enum ControllerRequest {
    /// Read the full settings, merged with defaults.
    GetSettings {
        reply: oneshot::Sender<Settings>,
    },
    /// Persist a complete settings object wholesale.
    UpdateSettings {
        settings: Settings,
        reply: oneshot::Sender<Result<(), StoreError>>,
    },
}

impl ControllerRequest {
    /// Wire-level name of this request.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::GetSettings { .. } => "getSettings",
            Self::UpdateSettings { .. } => "updateSettings",
        }
    }
}

/// Fire-and-forget instruction delivered to one page agent.
///
/// No reply ever flows back; a directive to a dead tab is dropped by the
/// router and reported to the sender as an error to log, not to retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageDirective {
    /// Re-fetch settings from the controller and re-render.
    ApplyTheme,
    /// Adopt the pushed settings directly, skipping the fetch round-trip.
    UpdateTheme(Settings),
}

impl PageDirective {
    /// Wire-level name of this directive.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ApplyTheme => "applyTheme",
            Self::UpdateTheme(_) => "updateTheme",
        }
    }
}

/// Host platform lifecycle notifications consumed by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// Fired once at extension install.
    Installed,
    /// A tab finished loading and its page is ready for styling.
    TabLoaded { tab: TabId },
}

/// Serializable mirror of the cross-component messages.
///
/// The tag and payload names are the stable wire shape; the protocol trace
/// in `simulate` prints these records verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum WireMessage {
    /// Page agent asks the controller for current settings.
    GetSettings,
    /// Panel persists a full settings object through the controller.
    UpdateSettings(Settings),
    /// Controller tells one page agent to re-fetch and re-render.
    ApplyTheme,
    /// Panel pushes just-saved settings straight to one page agent.
    UpdateTheme(Settings),
}
