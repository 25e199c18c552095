//! The single request/response exchange against one target.
//!
//! [`Transport`] is the seam between the race protocol and the network.
//! [`HyperTransport`] is the production implementation on top of the
//! pooled hyper client; tests substitute scripted transports.
//!
//! Per-target timeouts belong here. The dispatcher imposes none.

use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use bytes::Bytes;
use http_body_util::Full;

use crate::server::HttpClient;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("{0}")]
    Upstream(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
}

// async_trait is required here because Transport is used as Arc<dyn Transport>
// and native async fn in traits does not support dyn dispatch.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one exchange. Resolves once the response head has arrived;
    /// the body is returned unread.
    async fn exchange(&self, request: Request<Full<Bytes>>)
        -> Result<Response<Body>, TransportError>;
}

pub struct HyperTransport {
    client: HttpClient,
    timeout: Duration,
}

impl HyperTransport {
    #[must_use]
    pub const fn new(client: HttpClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl Transport for HyperTransport {
    async fn exchange(
        &self,
        request: Request<Full<Bytes>>,
    ) -> Result<Response<Body>, TransportError> {
        let response = tokio::time::timeout(self.timeout, self.client.request(request))
            .await
            .map_err(|_| TransportError::Timeout(self.timeout))?
            .map_err(|e| TransportError::Upstream(Box::new(e)))?;
        Ok(response.map(Body::new))
    }
}
