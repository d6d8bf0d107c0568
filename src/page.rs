//! Per-page theming agent.
//!
//! One agent runs per open page. It owns the page's single style override
//! node, reacts to directives routed to its tab, and fetches settings from the
//! controller when told the theme may have changed. Fetches run as background
//! tasks so a slow store never blocks directive handling; a monotonic sequence
//! number decides whether a fetch result is still current when it lands.

use crate::controller::ControllerHandle;
use crate::css::{render_override, OverrideStrategy};
use crate::protocol::PageDirective;
use crate::settings::{Settings, ThemeMode};
use crate::tabs::{TabId, TabRouter};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tracing::debug;

/// Element id of the managed style node. Fixed so repeated applications always
/// target the same node instead of accumulating copies.
pub const STYLE_NODE_ID: &str = "pageshade-style-override";

/// Minimal mutation surface an agent needs from a page document.
pub trait PageDom: Send {
    /// Insert a style node with the given id and CSS text.
    fn attach_style(&mut self, id: &str, css: &str);
    /// Remove the style node with the given id, if present.
    fn detach_style(&mut self, id: &str);
}

/// A style node recorded by [`MemoryDom`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleNode {
    pub id: String,
    pub css: String,
}

/// In-memory document standing in for a real page.
///
/// Attach appends unconditionally, so stacked duplicate nodes stay visible to
/// assertions instead of being papered over.
#[derive(Debug, Clone, Default)]
pub struct MemoryDom {
    nodes: Arc<Mutex<Vec<StyleNode>>>,
}

impl MemoryDom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of style nodes currently attached.
    pub fn node_count(&self) -> usize {
        self.state().len()
    }

    /// CSS text of the node with the given id, if attached.
    pub fn style_css(&self, id: &str) -> Option<String> {
        self.state()
            .iter()
            .find(|node| node.id == id)
            .map(|node| node.css.clone())
    }

    /// All attached nodes, in attachment order.
    pub fn nodes(&self) -> Vec<StyleNode> {
        self.state().clone()
    }

    fn state(&self) -> MutexGuard<'_, Vec<StyleNode>> {
        self.nodes.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl PageDom for MemoryDom {
    fn attach_style(&mut self, id: &str, css: &str) {
        self.state().push(StyleNode {
            id: id.to_string(),
            css: css.to_string(),
        });
    }

    fn detach_style(&mut self, id: &str) {
        self.state().retain(|node| node.id != id);
    }
}

/// Observable agent activity, emitted in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    /// A theme (or its removal, for `Off`) was applied to the page.
    Applied { seq: u64, mode: ThemeMode },
    /// A settings fetch finished after a newer theme had already been applied.
    StaleReplyDiscarded { seq: u64 },
}

/// Event stream receiver returned by [`spawn_page_agent`].
pub type PageEventStream = mpsc::UnboundedReceiver<PageEvent>;

/// Completed settings fetch routed back to the agent loop.
struct FetchDone {
    seq: u64,
    settings: Settings,
}

/// Spawn an agent for one page and register it with the router.
///
/// Spawning corresponds to the page's document becoming ready: the agent
/// immediately fetches settings and applies whatever theme is configured.
pub fn spawn_page_agent(
    tab: TabId,
    controller: ControllerHandle,
    router: &TabRouter,
    dom: Box<dyn PageDom>,
    strategy: OverrideStrategy,
) -> PageEventStream {
    let directives = router.register(tab);
    let (event_tx, event_rx) = mpsc::unbounded_channel::<PageEvent>();
    let (fetch_done_tx, fetch_done_rx) = mpsc::unbounded_channel::<FetchDone>();

    let agent = PageAgent {
        tab,
        controller,
        dom,
        strategy,
        next_seq: 1,
        applied_seq: 0,
        event_tx,
        fetch_done_tx,
    };
    tokio::spawn(agent.run(directives, fetch_done_rx));

    event_rx
}

struct PageAgent {
    tab: TabId,
    controller: ControllerHandle,
    dom: Box<dyn PageDom>,
    strategy: OverrideStrategy,
    /// Sequence number the next theme application will take.
    next_seq: u64,
    /// Sequence number of the most recently applied theme.
    applied_seq: u64,
    event_tx: mpsc::UnboundedSender<PageEvent>,
    fetch_done_tx: mpsc::UnboundedSender<FetchDone>,
}

impl PageAgent {
    async fn run(
        mut self,
        mut directives: mpsc::UnboundedReceiver<PageDirective>,
        mut fetch_done: mpsc::UnboundedReceiver<FetchDone>,
    ) {
        self.begin_fetch();
        loop {
            tokio::select! {
                directive = directives.recv() => {
                    let Some(directive) = directive else { break };
                    debug!("{} received {}", self.tab, directive.kind());
                    match directive {
                        PageDirective::ApplyTheme => self.begin_fetch(),
                        PageDirective::UpdateTheme(settings) => self.apply_pushed(settings),
                    }
                }
                Some(done) = fetch_done.recv() => self.finish_fetch(done),
            }
        }
        debug!("page agent for {} stopped", self.tab);
    }

    /// Ask the controller for settings without blocking the agent loop.
    fn begin_fetch(&mut self) {
        let seq = self.next_seq;
        self.next_seq += 1;
        let controller = self.controller.clone();
        let done_tx = self.fetch_done_tx.clone();
        let tab = self.tab;
        tokio::spawn(async move {
            match controller.get_settings().await {
                Ok(settings) => {
                    let _ = done_tx.send(FetchDone { seq, settings });
                }
                Err(e) => debug!("settings fetch for {tab} failed: {e}"),
            }
        });
    }

    /// Apply settings pushed directly to this page, outrunning any fetch that
    /// is still in flight.
    fn apply_pushed(&mut self, settings: Settings) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.applied_seq = seq;
        self.apply(&settings, seq);
    }

    fn finish_fetch(&mut self, done: FetchDone) {
        if done.seq <= self.applied_seq {
            debug!(
                "discarding stale settings reply {} for {} (applied {})",
                done.seq, self.tab, self.applied_seq
            );
            self.emit(PageEvent::StaleReplyDiscarded { seq: done.seq });
            return;
        }
        self.applied_seq = done.seq;
        let settings = done.settings;
        self.apply(&settings, done.seq);
    }

    fn apply(&mut self, settings: &Settings, seq: u64) {
        // Detach first so re-application replaces the node instead of
        // stacking a second one.
        self.dom.detach_style(STYLE_NODE_ID);
        if let Some(css) = render_override(settings, self.strategy) {
            self.dom.attach_style(STYLE_NODE_ID, &css);
        }
        debug!("applied {} theme to {}", settings.mode, self.tab);
        self.emit(PageEvent::Applied {
            seq,
            mode: settings.mode,
        });
    }

    fn emit(&self, event: PageEvent) {
        let _ = self.event_tx.send(event);
    }
}
