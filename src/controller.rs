//! Background controller actor.
//!
//! The controller is the only component that touches the settings store. Other
//! components reach it through [`ControllerHandle`] by message passing; replies
//! travel back over per-request oneshot channels. Host lifecycle notifications
//! share the request channel so their ordering relative to requests is
//! preserved.

use crate::error::{ProtocolError, RequestError};
use crate::protocol::{ControllerRequest, HostEvent, PageDirective};
use crate::settings::Settings;
use crate::store::SettingsStore;
use crate::tabs::TabRouter;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

/// Everything the controller actor can be asked to do.
enum ControllerCommand {
    Request(ControllerRequest),
    Host(HostEvent),
}

/// Handle for sending requests and host events to a spawned controller actor.
#[derive(Clone)]
pub struct ControllerHandle {
    commands: mpsc::Sender<ControllerCommand>,
}

impl ControllerHandle {
    /// Fetch the current settings.
    ///
    /// Store failures never surface here: the controller answers with defaults
    /// so callers always have something renderable.
    pub async fn get_settings(&self) -> Result<Settings, ProtocolError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(ControllerCommand::Request(ControllerRequest::GetSettings {
                reply,
            }))
            .await
            .map_err(|_| ProtocolError::ControllerGone)?;
        rx.await.map_err(|_| ProtocolError::ReplyDropped)
    }

    /// Persist new settings, waiting for write confirmation.
    pub async fn update_settings(&self, settings: Settings) -> Result<(), RequestError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(ControllerCommand::Request(
                ControllerRequest::UpdateSettings { settings, reply },
            ))
            .await
            .map_err(|_| ProtocolError::ControllerGone)?;
        rx.await.map_err(|_| ProtocolError::ReplyDropped)??;
        Ok(())
    }

    /// Deliver a host lifecycle event. Fire-and-forget once enqueued.
    pub async fn notify(&self, event: HostEvent) -> Result<(), ProtocolError> {
        self.commands
            .send(ControllerCommand::Host(event))
            .await
            .map_err(|_| ProtocolError::ControllerGone)
    }
}

/// Spawn a controller actor over the given store and tab router.
///
/// The actor runs until every handle clone is dropped.
pub fn spawn_controller(store: Arc<dyn SettingsStore>, router: TabRouter) -> ControllerHandle {
    let (command_tx, mut command_rx) = mpsc::channel::<ControllerCommand>(64);

    tokio::spawn(async move {
        while let Some(command) = command_rx.recv().await {
            match command {
                ControllerCommand::Request(request) => {
                    handle_request(request, store.as_ref()).await;
                }
                ControllerCommand::Host(event) => {
                    handle_host_event(event, store.as_ref(), &router).await;
                }
            }
        }
        debug!("controller stopped");
    });

    ControllerHandle {
        commands: command_tx,
    }
}

async fn handle_request(request: ControllerRequest, store: &dyn SettingsStore) {
    debug!("handling {}", request.kind());
    match request {
        ControllerRequest::GetSettings { reply } => {
            let settings = match store.load().await {
                Ok(settings) => settings,
                Err(e) => {
                    warn!("settings load failed ({e}); serving defaults");
                    Settings::default()
                }
            };
            let _ = reply.send(settings);
        }
        ControllerRequest::UpdateSettings { settings, reply } => {
            let result = store.save(&settings).await;
            if let Err(e) = &result {
                warn!("settings save failed: {e}");
            }
            let _ = reply.send(result);
        }
    }
}

async fn handle_host_event(event: HostEvent, store: &dyn SettingsStore, router: &TabRouter) {
    match event {
        HostEvent::Installed => seed_defaults_if_missing(store).await,
        HostEvent::TabLoaded { tab } => {
            if let Err(e) = router.send(tab, PageDirective::ApplyTheme) {
                debug!("{e}; skipping theme refresh");
            }
        }
    }
}

/// Write default settings on first install, leaving existing data untouched.
async fn seed_defaults_if_missing(store: &dyn SettingsStore) {
    match store.initialized().await {
        Ok(true) => debug!("settings already present; skipping seed"),
        Ok(false) => match store.save(&Settings::default()).await {
            Ok(()) => debug!("seeded default settings"),
            Err(e) => warn!("could not seed default settings: {e}"),
        },
        Err(e) => warn!("could not check settings store ({e}); skipping seed"),
    }
}
