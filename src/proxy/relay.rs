//! Turning a [`DispatchResult`] into the caller's response.
//!
//! The relay consumes the result by value and returns one [`Response`],
//! so status and headers are committed exactly once. The winning body is
//! streamed through a [`RelayBody`] that logs how much was relayed and
//! reports a stream error or an early disconnect. Neither is recoverable:
//! the status line has already gone out.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use http_body::{Body as HttpBody, Frame, SizeHint};

use super::headers::strip_response_hop_by_hop;
use super::outcome::{DispatchResult, TargetResponse};

#[must_use]
pub fn relay(result: DispatchResult, correlation_id: &str) -> Response {
    match result {
        DispatchResult::Delivered { response, .. } => {
            let TargetResponse {
                status,
                mut headers,
                body,
            } = response;
            strip_response_hop_by_hop(&mut headers);

            let mut out = Response::new(Body::new(RelayBody::new(body, correlation_id)));
            *out.status_mut() = status;
            *out.headers_mut() = headers;
            out
        }
        DispatchResult::AllFailed { .. } => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}

pub struct RelayBody {
    inner: Body,
    correlation_id: Arc<str>,
    bytes: u64,
    finished: bool,
}

impl RelayBody {
    #[must_use]
    pub fn new(inner: Body, correlation_id: &str) -> Self {
        Self {
            inner,
            correlation_id: Arc::from(correlation_id),
            bytes: 0,
            finished: false,
        }
    }
}

impl HttpBody for RelayBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = &mut *self;
        match Pin::new(&mut this.inner).poll_frame(cx) {
            Poll::Ready(Some(Ok(frame))) => {
                if let Some(data) = frame.data_ref() {
                    this.bytes += data.len() as u64;
                }
                Poll::Ready(Some(Ok(frame)))
            }
            Poll::Ready(Some(Err(e))) => {
                this.finished = true;
                tracing::warn!(
                    correlation_id = %this.correlation_id,
                    bytes = this.bytes,
                    error = %e,
                    "winning response body failed mid-stream"
                );
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                this.finished = true;
                tracing::info!(
                    correlation_id = %this.correlation_id,
                    bytes = this.bytes,
                    "response relayed"
                );
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl Drop for RelayBody {
    fn drop(&mut self) {
        if !self.finished && !self.inner.is_end_stream() {
            tracing::warn!(
                correlation_id = %self.correlation_id,
                bytes = self.bytes,
                "caller went away before the response body completed"
            );
        }
    }
}
