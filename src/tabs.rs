//! Tab registry and directive routing.
//!
//! [`TabRouter`] stands in for the host platform's per-tab messaging surface
//! and active-tab query: the controller and the panel address page agents by
//! [`TabId`] without holding references to agent internals.

use crate::error::ProtocolError;
use crate::protocol::PageDirective;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

/// Identifier for one browser tab / page context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TabId(pub u32);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tab {}", self.0)
    }
}

/// Routes fire-and-forget directives to per-tab page agents.
///
/// Cloning shares the same registry, so the controller's fan-out and the
/// panel's active-tab push see one consistent view of the page population.
#[derive(Clone, Default)]
pub struct TabRouter {
    inner: Arc<Mutex<RouterState>>,
}

#[derive(Default)]
struct RouterState {
    pages: HashMap<TabId, mpsc::UnboundedSender<PageDirective>>,
    active: Option<TabId>,
}

impl TabRouter {
    /// Create an empty registry with no active tab.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a page agent for `tab`, returning its directive receiver.
    ///
    /// Re-registering replaces the previous entry: a navigation created a
    /// fresh page context and the old channel is closed.
    pub fn register(&self, tab: TabId) -> mpsc::UnboundedReceiver<PageDirective> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.state().pages.insert(tab, tx);
        rx
    }

    /// Drop the registration for `tab`, closing its directive channel.
    pub fn deregister(&self, tab: TabId) {
        let mut state = self.state();
        state.pages.remove(&tab);
        if state.active == Some(tab) {
            state.active = None;
        }
    }

    /// Mark `tab` as the active (focused) tab.
    pub fn set_active(&self, tab: TabId) {
        self.state().active = Some(tab);
    }

    /// Currently active tab, if any.
    pub fn active(&self) -> Option<TabId> {
        self.state().active
    }

    /// Deliver one directive to the agent registered for `tab`.
    pub fn send(&self, tab: TabId, directive: PageDirective) -> Result<(), ProtocolError> {
        let mut state = self.state();
        let Some(sender) = state.pages.get(&tab) else {
            return Err(ProtocolError::NoReceiver(tab));
        };
        if sender.send(directive).is_err() {
            // The agent task ended without deregistering; forget the entry.
            state.pages.remove(&tab);
            return Err(ProtocolError::NoReceiver(tab));
        }
        Ok(())
    }

    /// Registered tabs in ascending id order.
    pub fn tabs(&self) -> Vec<TabId> {
        let mut tabs: Vec<TabId> = self.state().pages.keys().copied().collect();
        tabs.sort();
        tabs
    }

    fn state(&self) -> MutexGuard<'_, RouterState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
