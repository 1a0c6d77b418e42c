//! Highlight driver - waits for the text layer, then runs the locator

use pagecite_domain::{
    MatchResult, PageView, RenderError, SnippetLocator, TextLayer, TextLayerStatus, Viewport,
};
use tokio::sync::watch;
use tokio::time::{sleep, timeout, Duration};

/// Delay between "text layer ready" and searching it
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 700;

/// How long to wait for the text layer before giving up
pub const DEFAULT_READY_TIMEOUT_MS: u64 = 5000;

/// Timing of one highlight attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightTiming {
    /// Pause after the ready signal, letting the collaborator finish layout
    pub settle_delay: Duration,
    /// Upper bound on the wait for the ready signal
    pub ready_timeout: Duration,
}

impl Default for HighlightTiming {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
            ready_timeout: Duration::from_millis(DEFAULT_READY_TIMEOUT_MS),
        }
    }
}

/// Result of one highlight attempt
#[derive(Debug, Clone, PartialEq)]
pub enum HighlightOutcome {
    /// Snippet found, highlighted and scrolled to
    Highlighted {
        /// The match
        result: MatchResult,
        /// Scroll offset requested from the viewport, if the anchor had bounds
        scroll_top: Option<f64>,
    },
    /// Empty snippet, or no tier matched on this page
    NotFound,
    /// Text layer never became ready for the view
    TimedOut,
    /// The collaborator failed to render the view
    RenderFailed(RenderError),
    /// A different view became ready while settling
    Superseded,
}

impl HighlightOutcome {
    /// Whether something is highlighted now
    pub fn is_highlighted(&self) -> bool {
        matches!(self, HighlightOutcome::Highlighted { .. })
    }
}

/// Drives a [`SnippetLocator`] from the collaborator's render signals
///
/// The collaborator publishes its [`TextLayerStatus`] on a watch channel.
/// Cancellation failures (the collaborator abandoning stale renders) are not
/// treated as failures; the driver keeps waiting for the view to come ready.
#[derive(Debug)]
pub struct HighlightDriver<H> {
    locator: SnippetLocator<H>,
    timing: HighlightTiming,
}

impl<H: Clone> HighlightDriver<H> {
    /// Create a driver with default timing and highlight style
    pub fn new() -> Self {
        Self::with_timing(HighlightTiming::default())
    }

    /// Create a driver with custom timing
    pub fn with_timing(timing: HighlightTiming) -> Self {
        Self {
            locator: SnippetLocator::new(),
            timing,
        }
    }

    /// Highlight `snippet` on `view` once its text layer is ready
    ///
    /// The previous generation is cleared immediately, before any waiting.
    /// With an empty snippet nothing is waited for, but a render failure
    /// already published for `view` is still reported.
    pub async fn run<L, V>(
        &mut self,
        layer: &mut L,
        viewport: &mut V,
        status: &mut watch::Receiver<TextLayerStatus>,
        view: &PageView,
        snippet: &str,
    ) -> HighlightOutcome
    where
        L: TextLayer<Handle = H>,
        V: Viewport,
    {
        self.locator.clear(layer);
        if snippet.trim().is_empty() {
            let failure = status
                .borrow()
                .failure_for(view)
                .filter(|e| !e.is_cancellation())
                .cloned();
            return match failure {
                Some(e) => {
                    tracing::warn!("Rendering page {} failed: {}", view.page, e);
                    HighlightOutcome::RenderFailed(e)
                }
                None => HighlightOutcome::NotFound,
            };
        }

        if let Some(outcome) = self.wait_ready(status, view).await {
            return outcome;
        }

        sleep(self.timing.settle_delay).await;

        if !status.borrow().is_ready_for(view) {
            tracing::debug!("View changed while settling, skipping highlight");
            return HighlightOutcome::Superseded;
        }

        match self.locator.reveal(layer, viewport, snippet) {
            Some((result, scroll_top)) => {
                tracing::debug!(
                    "Highlighted {} fragment(s) via {:?} on page {}",
                    result.fragments.len(),
                    result.tier,
                    view.page
                );
                HighlightOutcome::Highlighted { result, scroll_top }
            }
            None => {
                tracing::info!("Snippet not found on page {}", view.page);
                HighlightOutcome::NotFound
            }
        }
    }

    /// `None` once the view is ready; otherwise the outcome to return
    async fn wait_ready(
        &self,
        status: &mut watch::Receiver<TextLayerStatus>,
        view: &PageView,
    ) -> Option<HighlightOutcome> {
        let waited = timeout(
            self.timing.ready_timeout,
            status.wait_for(|s| match s.failure_for(view) {
                Some(e) if e.is_cancellation() => {
                    tracing::trace!("Ignoring cancelled render: {}", e);
                    false
                }
                Some(_) => true,
                None => s.is_ready_for(view),
            }),
        )
        .await;

        match waited {
            Err(_) => {
                tracing::warn!(
                    "Text layer for page {} not ready after {:?}",
                    view.page,
                    self.timing.ready_timeout
                );
                Some(HighlightOutcome::TimedOut)
            }
            Ok(Err(_)) => {
                tracing::debug!("Render status channel closed");
                Some(HighlightOutcome::TimedOut)
            }
            Ok(Ok(current)) => {
                let failure = current.failure_for(view).cloned();
                drop(current);
                failure.map(|e| {
                    tracing::warn!("Rendering page {} failed: {}", view.page, e);
                    HighlightOutcome::RenderFailed(e)
                })
            }
        }
    }
}

impl<H: Clone> Default for HighlightDriver<H> {
    fn default() -> Self {
        Self::new()
    }
}
