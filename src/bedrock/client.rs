//! Bedrock runtime client wrapper.
//!
//! Authentication is handled entirely by the AWS credential chain; no
//! key material is configured here. `InvokeModelWithResponseStream`
//! responses arrive as AWS EventStream chunks whose payload bytes are
//! Anthropic-format JSON events; this module adapts them into the
//! relay's provider event stream.

use async_trait::async_trait;
use aws_sdk_bedrockruntime::primitives::event_stream::EventReceiver;
use aws_sdk_bedrockruntime::primitives::Blob;
use aws_sdk_bedrockruntime::types::error::ResponseStreamError;
use aws_sdk_bedrockruntime::types::{PayloadPart, ResponseStream};
use aws_sdk_bedrockruntime::Client;
use futures::stream::Stream;
use tracing::debug;

use crate::config::BackendConfig;
use crate::relay::backend::{BackendStreamError, EventStream, InvokeError, StreamingBackend};
use crate::relay::transduce::ProviderEvent;
use crate::relay::translate::ProviderPayload;

/// Shared handle to the Bedrock runtime.
///
/// Built once at process start; the inner SDK client is cheap to clone
/// and safe to share across concurrent requests.
#[derive(Clone)]
pub struct BedrockStreamer {
    client: Client,
}

impl BedrockStreamer {
    /// Build the client from the AWS environment plus config overrides.
    pub async fn connect(config: &BackendConfig) -> Self {
        let mut loader = aws_config::from_env();
        if let Some(ref region) = config.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }
        if let Some(ref profile) = config.profile {
            loader = loader.profile_name(profile);
        }
        let sdk_config = loader.load().await;

        let client = if let Some(ref endpoint) = config.endpoint_override {
            let conf = aws_sdk_bedrockruntime::config::Builder::from(&sdk_config)
                .endpoint_url(endpoint)
                .build();
            Client::from_conf(conf)
        } else {
            Client::new(&sdk_config)
        };

        Self { client }
    }
}

#[async_trait]
impl StreamingBackend for BedrockStreamer {
    async fn invoke_streaming(
        &self,
        model_id: &str,
        payload: &ProviderPayload,
    ) -> Result<EventStream, InvokeError> {
        let body = serde_json::to_vec(payload)?;

        let response = self
            .client
            .invoke_model_with_response_stream()
            .model_id(model_id)
            .content_type("application/json")
            .body(Blob::new(body))
            .send()
            .await
            .map_err(map_invoke_error)?;

        debug!(model_id, "Bedrock stream opened");
        Ok(Box::pin(event_stream(response.body)))
    }
}

/// Map SDK invocation errors onto the relay's invoke taxonomy.
///
/// Converts through the crate-level `aws_sdk_bedrockruntime::Error` enum
/// so the variant names stay stable across SDK operation types.
fn map_invoke_error(err: impl Into<aws_sdk_bedrockruntime::Error>) -> InvokeError {
    use aws_sdk_bedrockruntime::Error as BedrockError;

    let err = err.into();
    match &err {
        BedrockError::ResourceNotFoundException(_) => InvokeError::ModelNotFound(err.to_string()),
        BedrockError::ThrottlingException(_) | BedrockError::ServiceQuotaExceededException(_) => {
            InvokeError::Throttled(err.to_string())
        }
        _ => InvokeError::Invoke(err.to_string()),
    }
}

/// Adapt the SDK's EventStream receiver into a provider event stream.
///
/// Empty chunks and unknown stream variants are skipped; receive errors
/// and undecodable chunk bytes terminate the stream with an error item.
fn event_stream(
    receiver: EventReceiver<ResponseStream, ResponseStreamError>,
) -> impl Stream<Item = Result<ProviderEvent, BackendStreamError>> {
    async_stream::stream! {
        let mut receiver = receiver;
        loop {
            match receiver.recv().await {
                Ok(Some(ResponseStream::Chunk(part))) => match decode_chunk(&part) {
                    Ok(Some(event)) => yield Ok(event),
                    Ok(None) => continue,
                    Err(e) => {
                        yield Err(e);
                        break;
                    }
                },
                Ok(Some(_)) => {
                    // Unknown stream variant, skip for forward compatibility.
                    continue;
                }
                Ok(None) => break,
                Err(e) => {
                    yield Err(BackendStreamError::Transport(format!("{e:?}")));
                    break;
                }
            }
        }
    }
}

/// Decode one EventStream chunk into a provider event.
///
/// Chunks without payload bytes decode to `None`.
fn decode_chunk(part: &PayloadPart) -> Result<Option<ProviderEvent>, BackendStreamError> {
    let Some(ref bytes) = part.bytes else {
        return Ok(None);
    };

    let json = bytes.as_ref();
    if json.is_empty() {
        return Ok(None);
    }

    serde_json::from_slice(json)
        .map(Some)
        .map_err(|e| BackendStreamError::Decode(e.to_string()))
}
