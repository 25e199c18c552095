//! Classified results of target attempts and of whole dispatches.

use axum::body::Body;
use axum::http::{HeaderMap, Response, StatusCode};

use super::transport::TransportError;

/// A response received from a target: status line, headers, and the
/// not-yet-read body.
#[derive(Debug)]
pub struct TargetResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Body,
}

impl From<Response<Body>> for TargetResponse {
    fn from(response: Response<Body>) -> Self {
        let (parts, body) = response.into_parts();
        Self {
            status: parts.status,
            headers: parts.headers,
            body,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FailureReason {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("unsatisfying status {0}")]
    UnsatisfyingStatus(StatusCode),
}

#[derive(Debug)]
pub enum Outcome {
    Success(TargetResponse),
    Failure(FailureReason),
}

impl Outcome {
    /// Classify a target response. Server errors and `408 Request Timeout`
    /// are failures; anything else, redirects and client errors included,
    /// satisfies the caller.
    #[must_use]
    pub fn classify(response: Response<Body>) -> Self {
        let status = response.status();
        if is_unsatisfying(status) {
            // Dropping the response here closes its body.
            Self::Failure(FailureReason::UnsatisfyingStatus(status))
        } else {
            Self::Success(response.into())
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

#[must_use]
pub fn is_unsatisfying(status: StatusCode) -> bool {
    status.as_u16() >= 500 || status == StatusCode::REQUEST_TIMEOUT
}

/// One invoker's report, tagged with the index of its target.
#[derive(Debug)]
pub struct Report {
    pub index: usize,
    pub outcome: Outcome,
}

/// The single terminal result of dispatching one inbound request.
#[derive(Debug)]
pub enum DispatchResult {
    Delivered {
        index: usize,
        response: TargetResponse,
    },
    AllFailed {
        count: usize,
    },
}
