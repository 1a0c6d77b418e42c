//! Chat session - conversation plus the single live answer stream

use crate::SessionError;
use pagecite_domain::{Applied, Citation, Conversation, ViewerState};
use pagecite_sdk::{ChatStream, PageciteClient, UploadReceipt};
use std::path::Path;
use tracing::{debug, info, warn};

/// A chat against one backend
///
/// Holds the transcript, the viewer selection and the live answer stream, if
/// any. Everything is mutated from the task that owns the session.
pub struct ChatSession {
    client: PageciteClient,
    conversation: Conversation,
    viewer: ViewerState,
    stream: Option<ChatStream>,
}

impl ChatSession {
    /// Create a session with a closed viewer at default zoom
    pub fn new(client: PageciteClient) -> Self {
        Self::with_viewer(client, ViewerState::default())
    }

    /// Create a session with an explicit viewer state
    pub fn with_viewer(client: PageciteClient, viewer: ViewerState) -> Self {
        Self {
            client,
            conversation: Conversation::new(),
            viewer,
            stream: None,
        }
    }

    /// Backend client
    pub fn client(&self) -> &PageciteClient {
        &self.client
    }

    /// Transcript and stream state
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Viewer state
    pub fn viewer(&self) -> &ViewerState {
        &self.viewer
    }

    /// Mutable viewer state (paging, zoom)
    pub fn viewer_mut(&mut self) -> &mut ViewerState {
        &mut self.viewer
    }

    /// Whether an answer stream is open
    pub fn has_live_stream(&self) -> bool {
        self.stream.is_some()
    }

    /// Start a new turn and open its answer stream
    ///
    /// Returns `Ok(false)` for a blank query. Any stream still open from the
    /// previous turn is dropped first. If the stream cannot be opened the new
    /// turn is finished empty and the error is returned for display.
    pub async fn submit(&mut self, query: &str) -> Result<bool, SessionError> {
        if !self.conversation.submit(query) {
            return Ok(false);
        }
        if self.stream.take().is_some() {
            debug!("Closed previous answer stream");
        }

        match self.client.open_stream(query).await {
            Ok(stream) => {
                self.stream = Some(stream);
                Ok(true)
            }
            Err(e) => {
                warn!("Failed to open answer stream: {}", e);
                self.conversation.on_transport_error();
                Err(e.into())
            }
        }
    }

    /// Wait for the next change to the current turn
    ///
    /// Returns `None` when no stream is open. The call that finishes the turn
    /// (by `done`, transport error or idle timeout) returns
    /// `Some(Applied::Finished)`. Malformed single events are logged and skipped.
    pub async fn next_update(&mut self) -> Option<Applied> {
        loop {
            let stream = self.stream.as_mut()?;

            match stream.next_event().await {
                Some(Ok(event)) => {
                    let applied = self.conversation.apply(event);
                    debug!(?applied, "Applied stream event");
                    if applied == Applied::Finished {
                        info!("Answer stream finished");
                        self.stream = None;
                    }
                    return Some(applied);
                }
                Some(Err(e)) if e.ends_stream() => {
                    warn!("Answer stream ended early: {}", e);
                    self.stream = None;
                    return Some(self.conversation.on_transport_error());
                }
                Some(Err(e)) => {
                    warn!("Skipping malformed stream event: {}", e);
                }
                None => {
                    self.stream = None;
                    return Some(self.conversation.on_transport_error());
                }
            }
        }
    }

    /// Pump the stream until the turn finishes, reporting every change
    pub async fn run_to_completion<F>(&mut self, mut on_update: F)
    where
        F: FnMut(&Applied),
    {
        while let Some(applied) = self.next_update().await {
            on_update(&applied);
            if applied == Applied::Finished {
                break;
            }
        }
    }

    /// Submit `query` and pump its stream to completion
    pub async fn ask<F>(&mut self, query: &str, on_update: F) -> Result<bool, SessionError>
    where
        F: FnMut(&Applied),
    {
        if !self.submit(query).await? {
            return Ok(false);
        }
        self.run_to_completion(on_update).await;
        Ok(true)
    }

    /// Abandon the live stream, keeping whatever the turn holds so far
    pub fn cancel(&mut self) {
        if self.stream.take().is_some() {
            info!("Answer stream abandoned");
            self.conversation.on_transport_error();
        }
    }

    /// Open the viewer on citation `id` of the latest answer
    pub fn open_citation(&mut self, id: u32) -> Result<Citation, SessionError> {
        let citation = self
            .conversation
            .transcript()
            .last_assistant()
            .and_then(|turn| turn.citation(id))
            .cloned()
            .ok_or(SessionError::NoSuchCitation(id))?;

        self.viewer.open_citation(&citation);
        Ok(citation)
    }

    /// Upload a PDF; open streams are unaffected
    pub async fn upload(&self, path: &Path) -> Result<UploadReceipt, SessionError> {
        Ok(self.client.upload_pdf(path).await?)
    }

    /// Clear server documents, then the local transcript and viewer
    ///
    /// Local state is only cleared once the server confirmed the reset.
    pub async fn reset(&mut self) -> Result<(), SessionError> {
        self.client.reset().await?;
        self.stream = None;
        self.conversation.reset();
        self.viewer.reset();
        Ok(())
    }
}
