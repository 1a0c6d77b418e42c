//! Server-sent answer stream.

use crate::error::SdkError;
use crate::wire::{CitationPayload, ToolPayload};
use bytes::Bytes;
use eventsource_stream::{EventStreamError, Eventsource};
use futures::{Stream, StreamExt, TryStreamExt};
use pagecite_domain::StreamEvent;
use std::fmt;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, trace};

type SseStream =
    Pin<Box<dyn Stream<Item = Result<eventsource_stream::Event, EventStreamError<String>>> + Send>>;

/// A live answer stream
///
/// Dropping the stream closes the underlying connection; there is no other
/// way to cancel an answer.
pub struct ChatStream {
    events: SseStream,
    idle_timeout: Duration,
    finished: bool,
}

impl fmt::Debug for ChatStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatStream")
            .field("idle_timeout", &self.idle_timeout)
            .field("finished", &self.finished)
            .finish()
    }
}

impl ChatStream {
    /// Wrap a raw SSE byte stream
    pub fn from_byte_stream<S, B, E>(bytes: S, idle_timeout: Duration) -> Self
    where
        S: Stream<Item = Result<B, E>> + Send + 'static,
        B: AsRef<[u8]> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let events = bytes.map_err(|e| e.to_string()).eventsource();
        Self {
            events: Box::pin(events),
            idle_timeout,
            finished: false,
        }
    }

    pub(crate) fn from_response(response: reqwest::Response, idle_timeout: Duration) -> Self {
        Self::from_byte_stream::<_, Bytes, _>(response.bytes_stream(), idle_timeout)
    }

    /// Whether the stream has ended (by `done`, error, or timeout)
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Wait for the next decoded event
    ///
    /// Returns `None` once the stream has finished. A transport error, an idle
    /// timeout, or the connection closing before `done` is returned once as an
    /// error and finishes the stream. A malformed payload is returned as
    /// [`SdkError::DecodeError`] and the stream stays usable.
    pub async fn next_event(&mut self) -> Option<Result<StreamEvent, SdkError>> {
        if self.finished {
            return None;
        }

        loop {
            let sse = match timeout(self.idle_timeout, self.events.next()).await {
                Ok(Some(Ok(sse))) => sse,
                Ok(Some(Err(e))) => {
                    debug!("SSE error: {e}");
                    return Some(Err(self.finish(SdkError::StreamError(e.to_string()))));
                }
                Ok(None) => {
                    return Some(Err(
                        self.finish(SdkError::StreamError("stream closed before done".to_string()))
                    ));
                }
                Err(_) => {
                    return Some(Err(self.finish(SdkError::IdleTimeout(self.idle_timeout))));
                }
            };

            trace!(event = %sse.event, "SSE event");
            match decode_event(&sse.event, &sse.data) {
                Ok(Some(StreamEvent::Done)) => {
                    self.finished = true;
                    return Some(Ok(StreamEvent::Done));
                }
                Ok(Some(event)) => return Some(Ok(event)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }

    fn finish(&mut self, error: SdkError) -> SdkError {
        self.finished = true;
        error
    }
}

/// Decode one SSE event into a stream event
///
/// Unknown event names (including the default `message`) yield `Ok(None)`.
pub fn decode_event(event: &str, data: &str) -> Result<Option<StreamEvent>, SdkError> {
    let decoded = match event {
        "tool" => StreamEvent::Tool(parse::<ToolPayload>(event, data)?.into()),
        "text" => StreamEvent::Text(data.to_string()),
        "citation" => StreamEvent::Citation(parse::<CitationPayload>(event, data)?.into()),
        "done" => StreamEvent::Done,
        other => {
            debug!("Ignoring unknown stream event '{}'", other);
            return Ok(None);
        }
    };
    Ok(Some(decoded))
}

fn parse<T: serde::de::DeserializeOwned>(event: &str, data: &str) -> Result<T, SdkError> {
    serde_json::from_str(data).map_err(|e| SdkError::DecodeError {
        event: event.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use pagecite_domain::{Citation, ToolEvent};

    fn chat_stream(chunks: Vec<&'static str>) -> ChatStream {
        let items: Vec<Result<Bytes, std::io::Error>> =
            chunks.into_iter().map(|c| Ok(Bytes::from(c))).collect();
        ChatStream::from_byte_stream(stream::iter(items), Duration::from_secs(5))
    }

    #[test]
    fn test_decode_known_events() {
        assert_eq!(
            decode_event("text", "The contract").unwrap(),
            Some(StreamEvent::Text("The contract".to_string()))
        );
        assert_eq!(decode_event("done", "{}").unwrap(), Some(StreamEvent::Done));
        assert_eq!(
            decode_event("tool", r#"{"name":"semantic_search","message":"Searching..."}"#).unwrap(),
            Some(StreamEvent::Tool(ToolEvent::new("semantic_search", "Searching...")))
        );
        assert_eq!(decode_event("message", "hello").unwrap(), None);
    }

    #[test]
    fn test_decode_malformed_citation() {
        // Unescaped quote inside the snippet
        let data = r#"{"id": 1, "document": "a.pdf", "page": 2, "snippet": "the "term""}"#;
        let err = decode_event("citation", data).unwrap_err();
        assert!(matches!(err, SdkError::DecodeError { ref event, .. } if event == "citation"));
    }

    #[tokio::test]
    async fn test_events_across_chunk_boundaries() {
        let mut stream = chat_stream(vec![
            "event: tool\ndata: {\"name\":\"semantic_search\",\"message\":\"Searching\"}\n\n",
            "event: text\nda",
            "ta: The\n\nevent: citation\ndata: {\"id\":1,\"document\":\"a.pdf\",\"page\":3,\"snippet\":\"s\"}\n\n",
            "event: done\ndata: {}\n\n",
        ]);

        let mut events = Vec::new();
        while let Some(event) = stream.next_event().await {
            events.push(event.unwrap());
        }

        assert_eq!(
            events,
            vec![
                StreamEvent::Tool(ToolEvent::new("semantic_search", "Searching")),
                StreamEvent::Text("The".to_string()),
                StreamEvent::Citation(Citation::new(1, "a.pdf", 3, "s")),
                StreamEvent::Done,
            ]
        );
        assert!(stream.is_finished());
    }

    #[tokio::test]
    async fn test_multiline_text_data_is_joined() {
        let mut stream = chat_stream(vec!["event: text\ndata: line one\ndata: line two\n\n"]);
        assert_eq!(
            stream.next_event().await.unwrap().unwrap(),
            StreamEvent::Text("line one\nline two".to_string())
        );
    }

    #[tokio::test]
    async fn test_close_without_done_is_stream_error() {
        let mut stream = chat_stream(vec!["event: text\ndata: partial\n\n"]);
        assert!(stream.next_event().await.unwrap().is_ok());

        let err = stream.next_event().await.unwrap().unwrap_err();
        assert!(matches!(err, SdkError::StreamError(_)));
        assert!(stream.next_event().await.is_none());
    }

    #[tokio::test]
    async fn test_malformed_event_does_not_end_stream() {
        let mut stream = chat_stream(vec![
            "event: citation\ndata: not json\n\n",
            "event: text\ndata: still here\n\n",
            "event: done\ndata: {}\n\n",
        ]);

        assert!(matches!(
            stream.next_event().await.unwrap(),
            Err(SdkError::DecodeError { .. })
        ));
        assert_eq!(
            stream.next_event().await.unwrap().unwrap(),
            StreamEvent::Text("still here".to_string())
        );
        assert_eq!(stream.next_event().await.unwrap().unwrap(), StreamEvent::Done);
    }

    #[tokio::test]
    async fn test_idle_timeout() {
        let silent = stream::pending::<Result<Bytes, std::io::Error>>();
        let mut stream = ChatStream::from_byte_stream(silent, Duration::from_millis(20));

        let err = stream.next_event().await.unwrap().unwrap_err();
        assert!(matches!(err, SdkError::IdleTimeout(_)));
        assert!(stream.is_finished());
    }
}
