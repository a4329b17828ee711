//! Event-stream transducer: folds provider events into text fragments.
//!
//! Dispatch per event type:
//! - `content_block_delta` → emit the delta text (empty string when absent)
//! - `message_stop` → emit a single `"\n"` terminator and finish
//! - anything else → ignored
//!
//! A fault before `message_stop` becomes the final stream item; fragments
//! already emitted stay delivered.

use futures::stream::Stream;
use futures::StreamExt;
use serde::Deserialize;

use crate::relay::backend::BackendStreamError;

/// One streaming event from the provider, tagged by `type`.
///
/// Everything the relay does not dispatch on (`message_start`, `ping`,
/// `content_block_start`, ...) deserializes to [`ProviderEvent::Other`]
/// and contributes no output.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ProviderEvent {
    #[serde(rename = "content_block_delta")]
    ContentBlockDelta {
        #[serde(default)]
        delta: Delta,
    },
    #[serde(rename = "message_stop")]
    MessageStop,
    #[serde(other)]
    Other,
}

/// Incremental text carried by a `content_block_delta` event.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Delta {
    #[serde(default)]
    pub text: Option<String>,
}

/// Fold a provider event stream into an ordered stream of text fragments.
///
/// The output ends with a `"\n"` terminator after `message_stop`; events
/// past the terminator are not consumed. If the source errors, or ends
/// without a `message_stop`, the last item is an `Err` and no terminator
/// is emitted.
pub fn transduce<S>(events: S) -> impl Stream<Item = Result<String, BackendStreamError>>
where
    S: Stream<Item = Result<ProviderEvent, BackendStreamError>>,
{
    async_stream::stream! {
        futures::pin_mut!(events);

        while let Some(item) = events.next().await {
            match item {
                Ok(ProviderEvent::ContentBlockDelta { delta }) => {
                    yield Ok(delta.text.unwrap_or_default());
                }
                Ok(ProviderEvent::MessageStop) => {
                    yield Ok("\n".to_string());
                    return;
                }
                Ok(ProviderEvent::Other) => {}
                Err(e) => {
                    yield Err(e);
                    return;
                }
            }
        }

        yield Err(BackendStreamError::Truncated);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn delta(text: &str) -> ProviderEvent {
        ProviderEvent::ContentBlockDelta {
            delta: Delta {
                text: Some(text.to_string()),
            },
        }
    }

    async fn collect<S>(events: S) -> Vec<Result<String, BackendStreamError>>
    where
        S: Stream<Item = Result<ProviderEvent, BackendStreamError>>,
    {
        transduce(events).collect().await
    }

    #[tokio::test]
    async fn test_deltas_then_stop_yield_fragments_and_terminator() {
        let events = stream::iter(vec![
            Ok(delta("Hello")),
            Ok(delta(" world")),
            Ok(ProviderEvent::MessageStop),
        ]);

        let out: Vec<String> = collect(events).await.into_iter().map(Result::unwrap).collect();
        assert_eq!(out, vec!["Hello", " world", "\n"]);
    }

    #[tokio::test]
    async fn test_unrecognized_events_contribute_nothing() {
        let events = stream::iter(vec![
            Ok(delta("a")),
            Ok(ProviderEvent::Other),
            Ok(delta("b")),
            Ok(ProviderEvent::MessageStop),
        ]);

        let out: Vec<String> = collect(events).await.into_iter().map(Result::unwrap).collect();
        assert_eq!(out, vec!["a", "b", "\n"]);
    }

    #[tokio::test]
    async fn test_missing_delta_text_becomes_empty_fragment() {
        let events = stream::iter(vec![
            Ok(ProviderEvent::ContentBlockDelta {
                delta: Delta { text: None },
            }),
            Ok(ProviderEvent::MessageStop),
        ]);

        let out: Vec<String> = collect(events).await.into_iter().map(Result::unwrap).collect();
        assert_eq!(out, vec!["", "\n"]);
    }

    #[tokio::test]
    async fn test_transport_fault_keeps_earlier_fragments() {
        let events = stream::iter(vec![
            Ok(delta("partial")),
            Err(BackendStreamError::Transport("connection reset".to_string())),
        ]);

        let out = collect(events).await;
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].as_deref().unwrap(), "partial");
        assert!(matches!(out[1], Err(BackendStreamError::Transport(_))));
    }

    #[tokio::test]
    async fn test_exhaustion_without_stop_is_truncated() {
        let events = stream::iter(vec![Ok(delta("cut off"))]);

        let out = collect(events).await;
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].as_deref().unwrap(), "cut off");
        assert!(matches!(out[1], Err(BackendStreamError::Truncated)));
    }

    #[tokio::test]
    async fn test_stop_is_terminal() {
        let events = stream::iter(vec![
            Ok(ProviderEvent::MessageStop),
            Ok(delta("after stop")),
        ]);

        let out: Vec<String> = collect(events).await.into_iter().map(Result::unwrap).collect();
        assert_eq!(out, vec!["\n"]);
    }

    #[test]
    fn test_event_deserialization() {
        let event: ProviderEvent = serde_json::from_str(
            r#"{"type": "content_block_delta", "index": 0,
                "delta": {"type": "text_delta", "text": "Hi"}}"#,
        )
        .unwrap();
        match event {
            ProviderEvent::ContentBlockDelta { delta } => {
                assert_eq!(delta.text.as_deref(), Some("Hi"));
            }
            other => panic!("wrong variant: {other:?}"),
        }

        let event: ProviderEvent = serde_json::from_str(r#"{"type": "ping"}"#).unwrap();
        assert!(matches!(event, ProviderEvent::Other));

        // Bedrock appends invocation metrics to the final event.
        let event: ProviderEvent = serde_json::from_str(
            r#"{"type": "message_stop",
                "amazon-bedrock-invocationMetrics": {"outputTokenCount": 2}}"#,
        )
        .unwrap();
        assert!(matches!(event, ProviderEvent::MessageStop));
    }

    #[test]
    fn test_delta_without_payload_deserializes_empty() {
        let event: ProviderEvent =
            serde_json::from_str(r#"{"type": "content_block_delta"}"#).unwrap();
        match event {
            ProviderEvent::ContentBlockDelta { delta } => assert!(delta.text.is_none()),
            other => panic!("wrong variant: {other:?}"),
        }
    }
}
