//! Streamed HTTP body assembly for relayed text fragments.
//!
//! Fragments flush to the client as they are produced; nothing is
//! buffered. A backend fault ends the chunked body early with no
//! terminator, which the client observes as a truncated stream.

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures::stream::Stream;
use futures::StreamExt;
use tracing::error;

use crate::relay::backend::BackendStreamError;

/// Wrap a fragment stream as a chunked `text/plain` response.
///
/// Mid-stream faults are logged here with the request ID; the error then
/// aborts the body, cutting the connection without a terminator.
pub fn relay_response<S>(fragments: S, request_id: String) -> Response
where
    S: Stream<Item = Result<String, BackendStreamError>> + Send + 'static,
{
    let bytes = fragments.map(move |item| match item {
        Ok(fragment) => Ok(Bytes::from(fragment)),
        Err(e) => {
            error!(request_id = %request_id, error = %e, "Relay stream failed");
            Err(e)
        }
    });

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(bytes),
    )
        .into_response()
}
