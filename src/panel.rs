//! Settings panel session.
//!
//! Protocol-facing model of the settings surface: a read-modify-write cycle
//! over a draft copy of the settings. Opening reads the store directly; saving
//! goes through the controller so the write is confirmed before the panel
//! reports success, then pushes the saved settings to the active page for an
//! instant preview.

use crate::color::Rgb;
use crate::controller::ControllerHandle;
use crate::error::{ProtocolError, RequestError, StoreError};
use crate::protocol::PageDirective;
use crate::settings::{ColorField, Settings, ThemeMode};
use crate::store::SettingsStore;
use crate::tabs::TabRouter;
use tracing::{debug, warn};

/// One opened panel, holding an editable draft of the settings.
pub struct PanelSession {
    controller: ControllerHandle,
    router: TabRouter,
    draft: Settings,
}

impl PanelSession {
    /// Open a panel, populating the draft from the store.
    pub async fn open(
        store: &dyn SettingsStore,
        controller: ControllerHandle,
        router: TabRouter,
    ) -> Result<Self, StoreError> {
        let draft = store.load().await?;
        Ok(Self {
            controller,
            router,
            draft,
        })
    }

    /// Current draft. Edits are invisible to other components until saved.
    pub fn draft(&self) -> &Settings {
        &self.draft
    }

    /// Select the active mode in the draft.
    pub fn set_mode(&mut self, mode: ThemeMode) {
        self.draft.mode = mode;
    }

    /// Edit one color of one theme profile in the draft.
    ///
    /// Both profiles stay editable regardless of the active mode, so tuning a
    /// theme never requires switching to it first. Returns false when the
    /// given mode has no profile to edit.
    pub fn set_color(&mut self, profile: ThemeMode, field: ColorField, color: Rgb) -> bool {
        match self.draft.profile_mut(profile) {
            Some(theme) => {
                theme.set(field, color);
                true
            }
            None => {
                debug!("mode `{profile}` has no editable colors");
                false
            }
        }
    }

    /// Persist the draft, then push it to the active page.
    ///
    /// Success is only reported once the write is confirmed. The push is
    /// fire-and-forget: a missing or dead active page is logged and ignored.
    pub async fn save(&mut self) -> Result<(), RequestError> {
        self.controller.update_settings(self.draft.clone()).await?;
        self.push_to_active_page();
        Ok(())
    }

    /// Replace the draft with hardcoded defaults and persist.
    pub async fn reset(&mut self) -> Result<(), RequestError> {
        self.draft = Settings::default();
        self.save().await
    }

    fn push_to_active_page(&self) {
        let Some(tab) = self.router.active() else {
            debug!("no active page; skipping theme push");
            return;
        };
        match self
            .router
            .send(tab, PageDirective::UpdateTheme(self.draft.clone()))
        {
            Ok(()) => debug!("pushed saved theme to {tab}"),
            Err(ProtocolError::NoReceiver(tab)) => {
                warn!("active page {tab} is gone; theme will apply on next load");
            }
            Err(e) => warn!("theme push failed: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::spawn_controller;
    use crate::store::MemoryStore;
    use crate::tabs::TabId;
    use crate::testsupport::settings_with_mode;
    use std::sync::Arc;
    use tokio::sync::mpsc::error::TryRecvError;

    struct Fixture {
        store: Arc<MemoryStore>,
        controller: ControllerHandle,
        router: TabRouter,
    }

    fn fixture(store: MemoryStore) -> Fixture {
        let store = Arc::new(store);
        let router = TabRouter::default();
        let controller = spawn_controller(store.clone(), router.clone());
        Fixture {
            store,
            controller,
            router,
        }
    }

    async fn open_panel(f: &Fixture) -> PanelSession {
        PanelSession::open(f.store.as_ref(), f.controller.clone(), f.router.clone())
            .await
            .expect("open panel")
    }

    #[tokio::test]
    async fn open_populates_draft_from_store() {
        let f = fixture(MemoryStore::with_settings(settings_with_mode(
            ThemeMode::Eye,
        )));
        let panel = open_panel(&f).await;
        assert_eq!(panel.draft().mode, ThemeMode::Eye);
    }

    #[tokio::test]
    async fn edits_stay_local_until_saved() {
        let f = fixture(MemoryStore::new());
        let mut panel = open_panel(&f).await;
        panel.set_mode(ThemeMode::Dark);
        panel.set_color(
            ThemeMode::Dark,
            ColorField::Background,
            Rgb::new(0x10, 0x10, 0x10),
        );
        assert_eq!(f.store.snapshot(), None);
        assert_eq!(panel.draft().mode, ThemeMode::Dark);
    }

    #[tokio::test]
    async fn save_persists_and_pushes_to_active_page() {
        let f = fixture(MemoryStore::new());
        let tab = TabId(5);
        let mut directives = f.router.register(tab);
        f.router.set_active(tab);

        let mut panel = open_panel(&f).await;
        panel.set_mode(ThemeMode::Dark);
        panel.save().await.expect("save");

        assert_eq!(
            f.store.snapshot().map(|s| s.mode),
            Some(ThemeMode::Dark)
        );
        assert_eq!(
            directives.try_recv(),
            Ok(PageDirective::UpdateTheme(settings_with_mode(
                ThemeMode::Dark
            )))
        );
    }

    #[tokio::test]
    async fn save_without_active_page_still_persists() {
        let f = fixture(MemoryStore::new());
        let mut panel = open_panel(&f).await;
        panel.set_mode(ThemeMode::Eye);
        panel.save().await.expect("save");
        assert_eq!(f.store.snapshot().map(|s| s.mode), Some(ThemeMode::Eye));
    }

    #[tokio::test]
    async fn failed_save_reports_failure_and_pushes_nothing() {
        let f = fixture(MemoryStore::new());
        let tab = TabId(2);
        let mut directives = f.router.register(tab);
        f.router.set_active(tab);
        f.store.fail_next_save();

        let mut panel = open_panel(&f).await;
        panel.set_mode(ThemeMode::Dark);
        let err = panel.save().await.expect_err("save should fail");
        assert!(matches!(err, RequestError::Store(_)));
        assert_eq!(f.store.snapshot(), None);
        assert_eq!(directives.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn reset_restores_defaults_and_persists() {
        let f = fixture(MemoryStore::with_settings(settings_with_mode(
            ThemeMode::Dark,
        )));
        let mut panel = open_panel(&f).await;
        panel.reset().await.expect("reset");
        assert_eq!(panel.draft(), &Settings::default());
        assert_eq!(f.store.snapshot(), Some(Settings::default()));
    }

    #[tokio::test]
    async fn off_mode_has_no_editable_colors() {
        let f = fixture(MemoryStore::new());
        let mut panel = open_panel(&f).await;
        let before = panel.draft().clone();
        let changed = panel.set_color(
            ThemeMode::Off,
            ColorField::Accent,
            Rgb::new(0xff, 0x00, 0x00),
        );
        assert!(!changed);
        assert_eq!(panel.draft(), &before);
    }

    #[tokio::test]
    async fn inactive_profile_stays_editable_and_retained() {
        let f = fixture(MemoryStore::new());
        let mut panel = open_panel(&f).await;
        panel.set_mode(ThemeMode::Dark);
        let edited = Rgb::new(0x11, 0x22, 0x33);
        assert!(panel.set_color(ThemeMode::Eye, ColorField::Link, edited));
        panel.save().await.expect("save");

        // Switching modes later must not lose the eye profile customization.
        let saved = f.store.snapshot().expect("saved settings");
        assert_eq!(saved.mode, ThemeMode::Dark);
        assert_eq!(saved.eye_theme.link_color, edited);
    }
}
