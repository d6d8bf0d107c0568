//! End-to-end message-flow scenarios.
//!
//! Each test wires the full stack over an in-memory store: a controller,
//! page agents behind the tab router, and a panel session, then drives it
//! the way the browser host would.

use pageshade::color::Rgb;
use pageshade::controller::{spawn_controller, ControllerHandle};
use pageshade::css::OverrideStrategy;
use pageshade::page::{spawn_page_agent, MemoryDom, PageEvent, PageEventStream, STYLE_NODE_ID};
use pageshade::panel::PanelSession;
use pageshade::protocol::HostEvent;
use pageshade::settings::{ColorField, Settings, ThemeMode};
use pageshade::store::MemoryStore;
use pageshade::tabs::{TabId, TabRouter};
use std::sync::Arc;

struct Rig {
    store: Arc<MemoryStore>,
    router: TabRouter,
    controller: ControllerHandle,
}

fn rig() -> Rig {
    let store = Arc::new(MemoryStore::new());
    let router = TabRouter::default();
    let controller = spawn_controller(store.clone(), router.clone());
    Rig {
        store,
        router,
        controller,
    }
}

struct Page {
    dom: MemoryDom,
    events: PageEventStream,
}

/// Spawn a page agent and wait for its first theme application.
async fn open_page(rig: &Rig, tab: TabId) -> Page {
    let dom = MemoryDom::new();
    let mut events = spawn_page_agent(
        tab,
        rig.controller.clone(),
        &rig.router,
        Box::new(dom.clone()),
        OverrideStrategy::default(),
    );
    next_applied(&mut events).await.expect("first application");
    Page { dom, events }
}

async fn next_applied(events: &mut PageEventStream) -> Option<ThemeMode> {
    loop {
        match events.recv().await? {
            PageEvent::Applied { mode, .. } => return Some(mode),
            PageEvent::StaleReplyDiscarded { .. } => continue,
        }
    }
}

async fn open_panel(rig: &Rig) -> PanelSession {
    PanelSession::open(
        rig.store.as_ref(),
        rig.controller.clone(),
        rig.router.clone(),
    )
    .await
    .expect("panel open")
}

#[tokio::test]
async fn fresh_install_serves_defaults_and_styles_nothing() {
    let rig = rig();
    rig.controller
        .notify(HostEvent::Installed)
        .await
        .expect("notify");
    let settings = rig.controller.get_settings().await.expect("get settings");
    assert_eq!(settings, Settings::default());

    let page = open_page(&rig, TabId(1)).await;
    assert_eq!(page.dom.node_count(), 0);
}

#[tokio::test]
async fn saving_dark_mode_restyles_the_active_page() {
    let rig = rig();
    let mut page = open_page(&rig, TabId(7)).await;
    rig.router.set_active(TabId(7));

    let mut panel = open_panel(&rig).await;
    panel.set_mode(ThemeMode::Dark);
    panel.save().await.expect("save");

    assert_eq!(next_applied(&mut page.events).await, Some(ThemeMode::Dark));
    assert_eq!(page.dom.node_count(), 1);
    let css = page.dom.style_css(STYLE_NODE_ID).expect("style node");
    assert!(css.contains("#121212"));
    assert!(css.contains("!important"));
}

#[tokio::test]
async fn background_pages_catch_up_on_reload() {
    let rig = rig();
    let mut front = open_page(&rig, TabId(1)).await;
    let mut back = open_page(&rig, TabId(2)).await;
    rig.router.set_active(TabId(1));

    let mut panel = open_panel(&rig).await;
    panel.set_mode(ThemeMode::Eye);
    panel.save().await.expect("save");
    assert_eq!(next_applied(&mut front.events).await, Some(ThemeMode::Eye));
    assert_eq!(back.dom.node_count(), 0);

    rig.controller
        .notify(HostEvent::TabLoaded { tab: TabId(2) })
        .await
        .expect("notify");
    assert_eq!(next_applied(&mut back.events).await, Some(ThemeMode::Eye));
    let css = back.dom.style_css(STYLE_NODE_ID).expect("style node");
    assert!(css.contains("#f2f2e8"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn simultaneously_loading_pages_apply_identical_styling() {
    let rig = rig();
    let mut dark = Settings::default();
    dark.mode = ThemeMode::Dark;
    rig.controller
        .update_settings(dark)
        .await
        .expect("update settings");

    // Spawn both agents before awaiting either, so their settings fetches
    // are in flight at the same time.
    let first_dom = MemoryDom::new();
    let mut first_events = spawn_page_agent(
        TabId(1),
        rig.controller.clone(),
        &rig.router,
        Box::new(first_dom.clone()),
        OverrideStrategy::default(),
    );
    let second_dom = MemoryDom::new();
    let mut second_events = spawn_page_agent(
        TabId(2),
        rig.controller.clone(),
        &rig.router,
        Box::new(second_dom.clone()),
        OverrideStrategy::default(),
    );

    assert_eq!(next_applied(&mut first_events).await, Some(ThemeMode::Dark));
    assert_eq!(next_applied(&mut second_events).await, Some(ThemeMode::Dark));
    assert_eq!(first_dom.node_count(), 1);
    assert_eq!(second_dom.node_count(), 1);
    let css = first_dom.style_css(STYLE_NODE_ID).expect("style node");
    assert_eq!(second_dom.style_css(STYLE_NODE_ID), Some(css));
}

#[tokio::test]
async fn switching_modes_keeps_edited_colors() {
    let rig = rig();
    let mut panel = open_panel(&rig).await;
    let custom = Rgb::parse("#fafaf0").expect("color");
    panel.set_mode(ThemeMode::Eye);
    assert!(panel.set_color(ThemeMode::Eye, ColorField::Background, custom));
    panel.save().await.expect("save");

    panel.set_mode(ThemeMode::Dark);
    panel.save().await.expect("save");

    let settings = rig.controller.get_settings().await.expect("get settings");
    assert_eq!(settings.mode, ThemeMode::Dark);
    assert_eq!(settings.eye_theme.background_color, custom);
}

#[tokio::test]
async fn update_round_trips_through_the_controller() {
    let rig = rig();
    let mut wanted = Settings::default();
    wanted.mode = ThemeMode::Dark;
    wanted.dark_theme.accent_color = Rgb::parse("#ff8800").expect("color");

    rig.controller
        .update_settings(wanted.clone())
        .await
        .expect("update settings");
    let loaded = rig.controller.get_settings().await.expect("get settings");
    assert_eq!(loaded, wanted);
}

#[tokio::test]
async fn failed_save_leaves_pages_untouched() {
    let rig = rig();
    let page = open_page(&rig, TabId(3)).await;
    rig.router.set_active(TabId(3));

    let mut panel = open_panel(&rig).await;
    panel.set_mode(ThemeMode::Dark);
    rig.store.fail_next_save();
    assert!(panel.save().await.is_err());

    assert_eq!(page.dom.node_count(), 0);
    assert_eq!(rig.store.snapshot(), None);
}

#[tokio::test]
async fn saving_with_a_closed_active_tab_still_persists() {
    let rig = rig();
    let _page = open_page(&rig, TabId(4)).await;
    rig.router.set_active(TabId(4));
    rig.router.deregister(TabId(4));

    let mut panel = open_panel(&rig).await;
    panel.set_mode(ThemeMode::Dark);
    panel.save().await.expect("save");

    let settings = rig.controller.get_settings().await.expect("get settings");
    assert_eq!(settings.mode, ThemeMode::Dark);
}
