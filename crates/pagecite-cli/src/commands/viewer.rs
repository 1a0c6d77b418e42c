//! Page display for the REPL: open a citation, page, zoom.

use crate::error::Result;
use crate::layer::{LayerStore, TerminalLayer, TerminalViewport, DEFAULT_VIEWPORT_HEIGHT};
use crate::output::Formatter;
use pagecite_domain::{PageView, TextLayerStatus, ViewerState, Viewport};
use pagecite_session::{ChatSession, HighlightDriver, HighlightOutcome};
use tokio::sync::watch;

/// What the REPL needs to put a page on screen.
pub struct PageDisplay {
    store: Option<LayerStore>,
    driver: HighlightDriver<usize>,
}

/// One page after loading and highlighting.
#[derive(Debug)]
pub struct RenderedPage {
    /// The view that was rendered
    pub view: PageView,
    /// Loaded text layer, empty if loading failed
    pub layer: TerminalLayer,
    /// Viewport, scrolled to the highlight if there is one
    pub viewport: TerminalViewport,
    /// What the highlight attempt produced
    pub outcome: HighlightOutcome,
}

impl PageDisplay {
    /// Create a display reading dumps from `store`, if configured.
    pub fn new(store: Option<LayerStore>, driver: HighlightDriver<usize>) -> Self {
        Self { store, driver }
    }

    /// Whether a text-layer directory is configured.
    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    /// Load the viewer's current page and highlight the selected snippet if
    /// this is the cited page.
    ///
    /// Returns `None` without a store or an open document. Learning the page
    /// count from the store may clamp the viewer's page.
    pub async fn render(&mut self, viewer: &mut ViewerState) -> Option<RenderedPage> {
        let store = self.store.as_ref()?;
        let document = viewer.view()?.document;

        if let Some(pages) = store.page_count(&document) {
            viewer.on_document_loaded(pages);
        }
        let view = viewer.view()?;
        let snippet = viewer.active_snippet().unwrap_or_default().to_string();

        let (status_tx, mut status_rx) = watch::channel(TextLayerStatus::Rendered(view.clone()));
        let mut layer = match store.load(&view) {
            Ok(layer) => {
                status_tx.send_replace(TextLayerStatus::Ready(view.clone()));
                layer
            }
            Err(e) => {
                status_tx.send_replace(TextLayerStatus::Failed(view.clone(), e));
                TerminalLayer::empty()
            }
        };
        let mut viewport = TerminalViewport::new(DEFAULT_VIEWPORT_HEIGHT);

        let outcome = self
            .driver
            .run(&mut layer, &mut viewport, &mut status_rx, &view, &snippet)
            .await;

        Some(RenderedPage {
            view,
            layer,
            viewport,
            outcome,
        })
    }
}

/// Open citation `id` of the latest answer and show its page.
pub async fn open_citation(
    id: u32,
    session: &mut ChatSession,
    display: &mut PageDisplay,
    formatter: &Formatter,
) -> Result<()> {
    let citation = session.open_citation(id)?;
    println!("{}", formatter.info(&format!("Opening {}", citation)));
    show_page(session, display, formatter).await
}

/// Render the viewer's current page and print it.
pub async fn show_page(
    session: &mut ChatSession,
    display: &mut PageDisplay,
    formatter: &Formatter,
) -> Result<()> {
    if !display.has_store() {
        println!(
            "{}",
            formatter.warning("No text_layer_dir configured for this profile; pages cannot be shown")
        );
        return Ok(());
    }

    let Some(page) = display.render(session.viewer_mut()).await else {
        println!("{}", formatter.warning("No document open. Use 'open <n>' first."));
        return Ok(());
    };
    let highlight_requested = session.viewer().active_snippet().is_some();

    println!("{}", formatter.page_header(&page.view, session.viewer().total_pages()));
    match &page.outcome {
        HighlightOutcome::RenderFailed(e) => {
            println!("{}", formatter.error(&format!("Could not render page: {}", e)));
            return Ok(());
        }
        HighlightOutcome::NotFound if highlight_requested => {
            println!("{}", formatter.info("Cited passage not found on this page"));
        }
        HighlightOutcome::TimedOut | HighlightOutcome::Superseded => {
            println!("{}", formatter.warning("Page was not ready; showing it without highlight"));
        }
        HighlightOutcome::Highlighted { .. } | HighlightOutcome::NotFound => {}
    }

    let lines = page
        .layer
        .lines_in(page.viewport.scroll_top(), page.viewport.height());
    println!("{}", formatter.page_lines(&lines));

    Ok(())
}
