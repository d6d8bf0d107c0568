//! Persisted settings storage.
//!
//! The store is the single shared collaborator between the controller, the
//! panel, and (indirectly) every page agent. Writers always persist the
//! whole [`Settings`] object, so readers can never observe a partially
//! updated value.

use crate::error::StoreError;
use crate::settings::Settings;
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::oneshot;

mod file;

pub use file::FileStore;

/// Durable, asynchronous source of truth for theme settings.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Read the full settings, merged with defaults.
    ///
    /// Missing or malformed persisted fields fall back to their defaults,
    /// so the result is always a complete, valid value.
    async fn load(&self) -> Result<Settings, StoreError>;

    /// Persist a complete settings object wholesale.
    async fn save(&self, settings: &Settings) -> Result<(), StoreError>;

    /// Whether any settings document has ever been persisted.
    async fn initialized(&self) -> Result<bool, StoreError>;
}

/// In-memory store used by tests and the storeless simulator.
///
/// Supports one-shot fault injection and a load gate so protocol tests can
/// order store completions deterministically.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    settings: Option<Settings>,
    fail_next_load: bool,
    fail_next_save: bool,
    load_gate: Option<oneshot::Receiver<()>>,
}

impl MemoryStore {
    /// Create an empty store (no persisted document yet).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with a persisted value.
    pub fn with_settings(settings: Settings) -> Self {
        let store = Self::new();
        store.state().settings = Some(settings);
        store
    }

    /// Make the next `load` fail with [`StoreError::Unavailable`].
    pub fn fail_next_load(&self) {
        self.state().fail_next_load = true;
    }

    /// Make the next `save` fail with [`StoreError::Unavailable`].
    pub fn fail_next_save(&self) {
        self.state().fail_next_save = true;
    }

    /// Hold the next `load` until the returned sender fires or drops.
    pub fn hold_next_load(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.state().load_gate = Some(rx);
        tx
    }

    /// Current persisted value, without default merging.
    pub fn snapshot(&self) -> Option<Settings> {
        self.state().settings.clone()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn load(&self) -> Result<Settings, StoreError> {
        let gate = self.state().load_gate.take();
        if let Some(gate) = gate {
            // Released (or dropped) by the test that armed it.
            let _ = gate.await;
        }
        let mut state = self.state();
        if state.fail_next_load {
            state.fail_next_load = false;
            return Err(StoreError::Unavailable("injected load failure".into()));
        }
        Ok(state.settings.clone().unwrap_or_default())
    }

    async fn save(&self, settings: &Settings) -> Result<(), StoreError> {
        let mut state = self.state();
        if state.fail_next_save {
            state.fail_next_save = false;
            return Err(StoreError::Unavailable("injected save failure".into()));
        }
        state.settings = Some(settings.clone());
        Ok(())
    }

    async fn initialized(&self) -> Result<bool, StoreError> {
        Ok(self.state().settings.is_some())
    }
}
