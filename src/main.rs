//! CLI entry point for pageshade.

mod cli;

use clap::Parser;
use pageshade::color::Rgb;
use pageshade::config::{load_config, Config};
use pageshade::controller::spawn_controller;
use pageshade::css::{render_override, OverrideStrategy};
use pageshade::error::{CliError, RequestError, StoreError};
use pageshade::page::{spawn_page_agent, MemoryDom, PageEvent, PageEventStream};
use pageshade::panel::PanelSession;
use pageshade::protocol::{HostEvent, WireMessage};
use pageshade::settings::{ColorField, ThemeMode, ThemeProfile};
use pageshade::store::{FileStore, MemoryStore, SettingsStore};
use pageshade::tabs::{TabId, TabRouter};
use pageshade::ui::Renderer;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

#[tokio::main]
async fn main() {
    init_tracing();
    let args = cli::Args::parse();
    let renderer = Renderer::new(!args.no_color);

    let loaded = match load_config(args.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    for warning in &loaded.diagnostics.warnings {
        renderer.warn(warning);
    }
    let config = loaded.config;

    let result = match args.command {
        cli::Command::Show { json } => run_show(&renderer, &config, json).await,
        cli::Command::SetMode { mode } => run_set_mode(&renderer, &config, &mode).await,
        cli::Command::SetColor {
            profile,
            field,
            value,
        } => run_set_color(&renderer, &config, &profile, &field, &value).await,
        cli::Command::Reset => run_reset(&renderer, &config).await,
        cli::Command::Render { mode, strategy } => {
            run_render(&renderer, &config, mode.as_deref(), strategy.as_deref()).await
        }
        cli::Command::Simulate { tabs, strategy } => {
            run_simulate(&renderer, &config, tabs, strategy.as_deref()).await
        }
    };
    if let Err(e) = result {
        renderer.error(&e.to_string());
        std::process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("pageshade=warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Build the store/router/controller stack and open a panel session over it.
async fn open_panel(config: &Config) -> Result<PanelSession, CliError> {
    let store: Arc<dyn SettingsStore> = Arc::new(FileStore::new(config.store_path.clone()));
    let router = TabRouter::default();
    let controller = spawn_controller(Arc::clone(&store), router.clone());
    Ok(PanelSession::open(store.as_ref(), controller, router).await?)
}

async fn run_show(renderer: &Renderer, config: &Config, json: bool) -> Result<(), CliError> {
    let store = FileStore::new(config.store_path.clone());
    let settings = store.load().await?;
    if json {
        let text = serde_json::to_string_pretty(&settings).map_err(StoreError::from)?;
        renderer.out(&text);
        return Ok(());
    }
    renderer.section("settings");
    renderer.field("mode", settings.mode.as_str());
    renderer.field("store", &config.store_path.display().to_string());
    render_profile(renderer, "dark theme", &settings.dark_theme);
    render_profile(renderer, "eye theme", &settings.eye_theme);
    Ok(())
}

fn render_profile(renderer: &Renderer, title: &str, profile: &ThemeProfile) {
    renderer.section(title);
    renderer.swatch("background", profile.background_color);
    renderer.swatch("text", profile.text_color);
    renderer.swatch("link", profile.link_color);
    renderer.swatch("accent", profile.accent_color);
}

async fn run_set_mode(renderer: &Renderer, config: &Config, raw: &str) -> Result<(), CliError> {
    let mode = parse_mode_arg(renderer, raw);
    let mut panel = open_panel(config).await?;
    panel.set_mode(mode);
    panel.save().await?;
    renderer.section("saved");
    renderer.field("mode", mode.as_str());
    Ok(())
}

async fn run_set_color(
    renderer: &Renderer,
    config: &Config,
    raw_profile: &str,
    raw_field: &str,
    raw_value: &str,
) -> Result<(), CliError> {
    let profile = parse_mode_arg(renderer, raw_profile);
    let field = parse_field_arg(renderer, raw_field);
    let color = Rgb::parse(raw_value)?;
    let mut panel = open_panel(config).await?;
    if !panel.set_color(profile, field, color) {
        renderer.error(&format!(
            "mode `{}` has no editable colors (choose dark or eye)",
            profile.as_str()
        ));
        std::process::exit(2);
    }
    panel.save().await?;
    renderer.section("saved");
    renderer.field(
        &format!("{}.{}", profile.as_str(), field.as_str()),
        &color.to_string(),
    );
    Ok(())
}

async fn run_reset(renderer: &Renderer, config: &Config) -> Result<(), CliError> {
    let mut panel = open_panel(config).await?;
    panel.reset().await?;
    renderer.section("reset");
    renderer.field("mode", panel.draft().mode.as_str());
    Ok(())
}

async fn run_render(
    renderer: &Renderer,
    config: &Config,
    mode_arg: Option<&str>,
    strategy_arg: Option<&str>,
) -> Result<(), CliError> {
    let store = FileStore::new(config.store_path.clone());
    let mut settings = store.load().await?;
    if let Some(raw) = mode_arg {
        settings.mode = parse_mode_arg(renderer, raw);
    }
    let strategy = resolve_strategy(renderer, config, strategy_arg);
    match render_override(&settings, strategy) {
        Some(css) => renderer.out(&css),
        None => renderer.warn("mode is off; no override stylesheet to render"),
    }
    Ok(())
}

/// One simulated open page: its tab id, fake document, and event stream.
struct SimPage {
    tab: TabId,
    dom: MemoryDom,
    events: PageEventStream,
}

async fn run_simulate(
    renderer: &Renderer,
    config: &Config,
    tabs: u32,
    strategy_arg: Option<&str>,
) -> Result<(), CliError> {
    if tabs == 0 {
        renderer.warn("nothing to simulate with --tabs 0");
        return Ok(());
    }
    let strategy = resolve_strategy(renderer, config, strategy_arg);

    let store = Arc::new(MemoryStore::new());
    let router = TabRouter::default();
    let controller = spawn_controller(store.clone(), router.clone());

    renderer.section("install");
    controller
        .notify(HostEvent::Installed)
        .await
        .map_err(RequestError::from)?;
    let seeded = controller
        .get_settings()
        .await
        .map_err(RequestError::from)?;
    renderer.field("store", "in-memory");
    renderer.field("seeded mode", seeded.mode.as_str());

    renderer.section("pages");
    trace_wire(renderer, &WireMessage::GetSettings);
    trace_wire(renderer, &WireMessage::ApplyTheme);
    let mut pages = Vec::new();
    for n in 1..=tabs {
        let tab = TabId(n);
        let dom = MemoryDom::new();
        let events = spawn_page_agent(
            tab,
            controller.clone(),
            &router,
            Box::new(dom.clone()),
            strategy,
        );
        pages.push(SimPage { tab, dom, events });
    }
    router.set_active(TabId(1));
    for page in &mut pages {
        controller
            .notify(HostEvent::TabLoaded { tab: page.tab })
            .await
            .map_err(RequestError::from)?;
        // The document-ready fetch races the load-complete refetch, so one
        // or two applications arrive depending on which reply lands first.
        let Some(mode) = settle_applied(&mut page.events).await else {
            renderer.warn(&format!("{} stopped before applying a theme", page.tab));
            continue;
        };
        renderer.field(
            &page.tab.to_string(),
            &format!("{mode} applied, {} style node(s)", page.dom.node_count()),
        );
    }

    renderer.section("panel");
    let mut panel = PanelSession::open(store.as_ref(), controller.clone(), router.clone()).await?;
    panel.set_mode(ThemeMode::Dark);
    trace_wire(renderer, &WireMessage::UpdateSettings(panel.draft().clone()));
    trace_wire(renderer, &WireMessage::UpdateTheme(panel.draft().clone()));
    panel.save().await?;
    let active = &mut pages[0];
    if let Some(mode) = next_applied(&mut active.events).await {
        renderer.field(
            &format!("{} (active)", active.tab),
            &format!(
                "{mode} pushed instantly, {} style node(s)",
                active.dom.node_count()
            ),
        );
    }

    renderer.section("reload");
    for page in pages.iter_mut().skip(1) {
        controller
            .notify(HostEvent::TabLoaded { tab: page.tab })
            .await
            .map_err(RequestError::from)?;
        let Some(mode) = next_applied(&mut page.events).await else {
            renderer.warn(&format!("{} stopped before applying a theme", page.tab));
            continue;
        };
        renderer.field(
            &page.tab.to_string(),
            &format!("{mode} applied, {} style node(s)", page.dom.node_count()),
        );
    }
    Ok(())
}

/// Quiet window after an application before a page is considered settled.
const SETTLE_WINDOW: Duration = Duration::from_millis(100);

/// Wait for the next theme application on a page, skipping other events.
async fn next_applied(events: &mut PageEventStream) -> Option<ThemeMode> {
    loop {
        match events.recv().await? {
            PageEvent::Applied { mode, .. } => return Some(mode),
            PageEvent::StaleReplyDiscarded { .. } => continue,
        }
    }
}

/// Wait for at least one application, then drain any further ones that land
/// within [`SETTLE_WINDOW`], reporting the newest.
async fn settle_applied(events: &mut PageEventStream) -> Option<ThemeMode> {
    let mut mode = next_applied(events).await?;
    while let Ok(Some(next)) = timeout(SETTLE_WINDOW, next_applied(events)).await {
        mode = next;
    }
    Some(mode)
}

fn trace_wire(renderer: &Renderer, message: &WireMessage) {
    if let Ok(line) = serde_json::to_string(message) {
        renderer.detail(&format!("wire: {line}"));
    }
}

fn resolve_strategy(
    renderer: &Renderer,
    config: &Config,
    strategy_arg: Option<&str>,
) -> OverrideStrategy {
    match strategy_arg {
        Some(raw) => parse_strategy_arg(renderer, raw),
        None => config.strategy,
    }
}

fn parse_mode_arg(renderer: &Renderer, raw: &str) -> ThemeMode {
    match ThemeMode::parse(raw) {
        Some(mode) => mode,
        None => {
            renderer.error(&format!("unknown mode `{raw}` (expected off, dark, or eye)"));
            std::process::exit(2);
        }
    }
}

fn parse_field_arg(renderer: &Renderer, raw: &str) -> ColorField {
    match ColorField::parse(raw) {
        Some(field) => field,
        None => {
            renderer.error(&format!(
                "unknown color field `{raw}` (expected background, text, link, or accent)"
            ));
            std::process::exit(2);
        }
    }
}

fn parse_strategy_arg(renderer: &Renderer, raw: &str) -> OverrideStrategy {
    match OverrideStrategy::parse(raw) {
        Some(strategy) => strategy,
        None => {
            renderer.error(&format!(
                "unknown override strategy `{raw}` (expected narrow or broad-inherit)"
            ));
            std::process::exit(2);
        }
    }
}
