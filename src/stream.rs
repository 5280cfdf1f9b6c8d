//! Streamed delivery protocol
//!
//! The pipeline's progress and result travel as newline-delimited compact
//! JSON records over a chunked response body:
//!
//! ```text
//! {"status":"processing"}
//! {"status":"processing"}
//! {"textContent":"Hello World"}
//! ```
//!
//! Zero or more `processing` records precede exactly one terminal record
//! (`textContent` on success, `error` on failure), after which the body is
//! closed. The `processing` records are a keep-alive heartbeat against
//! external response deadlines, not a progress report - the pipeline performs
//! a single real unit of work between the first heartbeat and the terminal
//! record.
//!
//! On the receiving side, message boundaries do not align with network chunk
//! boundaries. [`StreamDecoder`] buffers bytes, treats the newline separator
//! as the sole framing authority, and swallows parse failures on segments
//! that are not yet complete.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tokio::time::{interval, Interval};
use tracing::{debug, warn};

use crate::error::ScrapeError;
use crate::normalize::ExtractedText;

/// Caller-facing failure message; the technical cause rides in `details`
const GENERIC_FAILURE: &str = "An error occurred during scraping";

// ============================================================================
// Wire Messages
// ============================================================================

/// Marker value for heartbeat records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    /// Work is ongoing
    Processing,
}

/// One record of the newline-delimited stream
///
/// Serialized shape is dictated by the wire protocol, hence the untagged
/// union: `{"status":"processing"}`, `{"textContent":...}` or
/// `{"error":...,"details":...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StreamMessage {
    /// Liveness signal; no payload, never terminal
    Processing {
        /// Always `processing`
        status: ProcessingStatus,
    },
    /// Terminal success payload
    Result {
        /// Extracted page text
        #[serde(rename = "textContent")]
        text_content: String,
    },
    /// Terminal error payload
    Failure {
        /// Short human-readable message
        error: String,
        /// Technical detail for diagnostics
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<String>,
    },
}

impl StreamMessage {
    /// Heartbeat record
    pub fn processing() -> Self {
        StreamMessage::Processing {
            status: ProcessingStatus::Processing,
        }
    }

    /// Terminal success record
    pub fn result(text_content: impl Into<String>) -> Self {
        StreamMessage::Result {
            text_content: text_content.into(),
        }
    }

    /// Terminal error record
    pub fn failure(details: Option<String>) -> Self {
        StreamMessage::Failure {
            error: GENERIC_FAILURE.to_string(),
            details,
        }
    }

    /// Whether this record ends the request
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StreamMessage::Processing { .. })
    }
}

/// Serialize a record as compact JSON followed by the newline separator
///
/// A record is never split across the separator; the returned buffer is one
/// complete frame.
pub fn encode_line(message: &StreamMessage) -> Bytes {
    let mut buf = match serde_json::to_vec(message) {
        Ok(buf) => buf,
        Err(e) => {
            warn!("Failed to serialize stream record: {}", e);
            format!(r#"{{"error":"{}"}}"#, GENERIC_FAILURE).into_bytes()
        }
    };
    buf.push(b'\n');
    Bytes::from(buf)
}

// ============================================================================
// Resolved Content
// ============================================================================

/// The externally visible unit the rest of the system consumes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteContent {
    /// Originating URL
    pub url: String,
    /// Extracted text; empty means "no content yet"
    pub content: String,
}

impl SiteContent {
    /// Sentinel state before any content has arrived
    pub fn pending(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content: String::new(),
        }
    }

    /// Whether content has been resolved
    pub fn is_ready(&self) -> bool {
        !self.content.is_empty()
    }
}

// ============================================================================
// Delivery Stream (server side)
// ============================================================================

/// Response-body stream for streaming delivery mode
///
/// Yields `processing` heartbeat frames while the pipeline runs, then the
/// terminal frame, then ends. The first heartbeat fires immediately on the
/// first poll, so slow upstream fetches cannot starve callers (or proxies)
/// holding a fixed response deadline.
pub struct DeliveryStream {
    /// Pipeline outcome; taken once the terminal record is emitted
    outcome: Option<oneshot::Receiver<Result<ExtractedText, ScrapeError>>>,
    /// Heartbeat timer
    heartbeat: Interval,
    /// Terminal record has been emitted
    finished: bool,
}

impl DeliveryStream {
    /// Create a stream around a pending pipeline outcome
    pub fn new(
        outcome: oneshot::Receiver<Result<ExtractedText, ScrapeError>>,
        heartbeat_interval: Duration,
    ) -> Self {
        Self {
            outcome: Some(outcome),
            heartbeat: interval(heartbeat_interval),
            finished: false,
        }
    }

    fn terminal_frame(result: Result<Result<ExtractedText, ScrapeError>, oneshot::error::RecvError>) -> Bytes {
        let message = match result {
            Ok(Ok(extracted)) => StreamMessage::result(extracted.text),
            Ok(Err(err)) => StreamMessage::failure(Some(err.to_string())),
            Err(_) => StreamMessage::failure(Some("pipeline task ended unexpectedly".to_string())),
        };
        encode_line(&message)
    }
}

impl Stream for DeliveryStream {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if this.finished {
            return Poll::Ready(None);
        }

        // The terminal record takes priority over a due heartbeat.
        if let Some(rx) = this.outcome.as_mut() {
            if let Poll::Ready(result) = Pin::new(rx).poll(cx) {
                this.outcome = None;
                this.finished = true;
                return Poll::Ready(Some(Ok(Self::terminal_frame(result))));
            }
        }

        if this.heartbeat.poll_tick(cx).is_ready() {
            debug!("Emitting processing heartbeat");
            return Poll::Ready(Some(Ok(encode_line(&StreamMessage::processing()))));
        }

        Poll::Pending
    }
}

// ============================================================================
// Stream Decoder (client side)
// ============================================================================

/// Reassembles complete records from a byte stream of arbitrary chunking
///
/// Chunk boundaries may fall anywhere - inside a JSON object, inside a UTF-8
/// sequence - so the buffer is raw bytes and only newline-terminated segments
/// are parsed authoritatively. A segment that fails to parse is treated as
/// not-yet-a-complete-message and dropped silently; this is the designed
/// buffering strategy, not error suppression.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    buffer: Vec<u8>,
    terminal: Option<StreamMessage>,
}

impl StreamDecoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one received chunk, returning every record completed by it
    ///
    /// Once a terminal record has been seen, further input is ignored - the
    /// server closes the body right after the terminal record, so anything
    /// else is noise.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<StreamMessage> {
        let mut messages = Vec::new();

        if self.terminal.is_some() {
            return messages;
        }

        self.buffer.extend_from_slice(chunk);

        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let segment: Vec<u8> = self.buffer.drain(..=pos).collect();
            let segment = &segment[..segment.len() - 1];

            match serde_json::from_slice::<StreamMessage>(segment) {
                Ok(message) => {
                    let terminal = message.is_terminal();
                    messages.push(message.clone());
                    if terminal {
                        self.terminal = Some(message);
                        self.buffer.clear();
                        break;
                    }
                }
                Err(_) => {
                    // Incomplete or fragmented segment; the newline framing
                    // will produce the authoritative copy later.
                }
            }
        }

        messages
    }

    /// Flush the residual buffer once the stream has closed
    ///
    /// Mid-stream, only newline-terminated segments are authoritative. After
    /// the body closes no further bytes can complete the tail, so a final
    /// parse attempt is made on it - this is what resolves an atomic-mode
    /// body, whose single record carries no trailing separator.
    pub fn finish(&mut self) -> Option<StreamMessage> {
        if self.terminal.is_some() || self.buffer.is_empty() {
            return None;
        }

        let residual = std::mem::take(&mut self.buffer);
        match serde_json::from_slice::<StreamMessage>(&residual) {
            Ok(message) => {
                if message.is_terminal() {
                    self.terminal = Some(message.clone());
                }
                Some(message)
            }
            Err(_) => None,
        }
    }

    /// Whether a terminal record has been seen
    pub fn is_resolved(&self) -> bool {
        self.terminal.is_some()
    }

    /// Resolve the decoded stream into the caller-visible outcome
    ///
    /// A missing terminal record (stream closed early) is a
    /// [`ScrapeError::Decode`], distinguishable from a server-reported
    /// [`ScrapeError::Remote`] failure.
    pub fn resolve(self, url: &str) -> Result<SiteContent, ScrapeError> {
        match self.terminal {
            Some(StreamMessage::Result { text_content }) => Ok(SiteContent {
                url: url.to_string(),
                content: text_content,
            }),
            Some(StreamMessage::Failure { error, .. }) => Err(ScrapeError::Remote(error)),
            _ => Err(ScrapeError::Decode),
        }
    }
}
