//! Contract between the relay core and the streaming model backend.
//!
//! The backend is an opaque capability: open a streamed invocation, get
//! back a live sequence of provider events. The relay never knows the
//! sequence length in advance and treats any transport fault as the end
//! of the sequence.

use std::pin::Pin;

use async_trait::async_trait;
use futures::stream::Stream;
use thiserror::Error;

use crate::relay::transduce::ProviderEvent;
use crate::relay::translate::ProviderPayload;

/// Provider events as they arrive off the wire. Never materialized.
pub type EventStream =
    Pin<Box<dyn Stream<Item = Result<ProviderEvent, BackendStreamError>> + Send>>;

/// The event stream failed after the invocation was opened.
#[derive(Error, Debug)]
pub enum BackendStreamError {
    /// The underlying connection/transport failed mid-stream.
    #[error("stream transport error: {0}")]
    Transport(String),

    /// A chunk arrived that could not be decoded as a provider event.
    #[error("undecodable stream chunk: {0}")]
    Decode(String),

    /// No event arrived within the configured idle deadline.
    #[error("no event from backend within {0} seconds")]
    Idle(u64),

    /// The stream ended before a `message_stop` event.
    #[error("event stream ended before message_stop")]
    Truncated,
}

/// The streamed invocation could not be opened at all.
#[derive(Error, Debug)]
pub enum InvokeError {
    #[error("failed to serialize request body: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("backend throttled the request: {0}")]
    Throttled(String),

    #[error("backend invocation failed: {0}")]
    Invoke(String),
}

/// A streaming model backend.
///
/// One long-lived, stateless, thread-safe handle is shared across
/// concurrent requests; each call owns its returned event stream
/// exclusively.
#[async_trait]
pub trait StreamingBackend: Send + Sync {
    /// Open a streamed invocation of `model_id` with the given payload.
    async fn invoke_streaming(
        &self,
        model_id: &str,
        payload: &ProviderPayload,
    ) -> Result<EventStream, InvokeError>;
}
