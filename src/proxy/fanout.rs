//! Concurrent fan-out of a single request to every target.
//!
//! [`Dispatcher::dispatch`] clones the inbound request once per target,
//! spawns one [`Invoker`] per target into a `JoinSet`, and waits on the
//! [`Aggregator`]. Once it resolves, every token except the winner's is
//! cancelled and the `JoinSet` is drained, so no invoker task outlives
//! the request.

use std::sync::Arc;

use axum::http::{HeaderMap, Method, Request, Uri};
use bytes::Bytes;
use http_body_util::Full;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::aggregator::Aggregator;
use super::headers::build_target_headers;
use super::invoker::Invoker;
use super::outcome::DispatchResult;
use super::transport::Transport;
use crate::config::model::{Target, TargetSet};

/// A buffered inbound request. Never mutated; each target gets its own
/// [`Request`] built from it, sharing only the immutable body bytes.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl InboundRequest {
    pub fn to_target_request(
        &self,
        target: &Target,
    ) -> Result<Request<Full<Bytes>>, axum::http::Error> {
        let uri = target.uri_for(self.uri.path_and_query())?;
        let mut request = Request::builder()
            .method(self.method.clone())
            .uri(uri)
            .body(Full::new(self.body.clone()))?;
        *request.headers_mut() = build_target_headers(&self.headers, target);
        Ok(request)
    }
}

#[derive(Clone)]
pub struct Dispatcher {
    targets: TargetSet,
    transport: Arc<dyn Transport>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(targets: TargetSet, transport: Arc<dyn Transport>) -> Self {
        Self { targets, transport }
    }

    #[must_use]
    pub const fn targets(&self) -> &TargetSet {
        &self.targets
    }

    pub async fn dispatch(&self, inbound: &InboundRequest, correlation_id: &str) -> DispatchResult {
        let count = self.targets.len();
        let correlation_id: Arc<str> = Arc::from(correlation_id);

        let (reports_tx, reports_rx) = mpsc::channel(count);
        let mut tokens = Vec::with_capacity(count);
        let mut invokers = JoinSet::new();
        let mut unbuilt = 0;

        for (index, target) in self.targets.iter().enumerate() {
            let token = CancellationToken::new();
            tokens.push(token.clone());

            let request = match inbound.to_target_request(target) {
                Ok(request) => request,
                Err(e) => {
                    tracing::error!(
                        correlation_id = %correlation_id,
                        target = %target,
                        error = %e,
                        "failed to build target request"
                    );
                    unbuilt += 1;
                    continue;
                }
            };
            let invoker = Invoker {
                index,
                target: target.clone(),
                request,
                token,
                transport: Arc::clone(&self.transport),
                reports: reports_tx.clone(),
                correlation_id: Arc::clone(&correlation_id),
            };
            invokers.spawn(invoker.run());
        }
        // Only invokers hold senders now; the aggregator sees the channel
        // close if every one of them exits.
        drop(reports_tx);

        let result = Aggregator::new(reports_rx, count)
            .with_failures(unbuilt)
            .resolve()
            .await;

        let winner = match &result {
            DispatchResult::Delivered { index, .. } => Some(*index),
            DispatchResult::AllFailed { .. } => None,
        };
        for (index, token) in tokens.iter().enumerate() {
            if Some(index) != winner {
                token.cancel();
            }
        }

        while let Some(joined) = invokers.join_next().await {
            if let Err(e) = joined {
                tracing::error!(correlation_id = %correlation_id, error = %e, "invoker task failed");
            }
        }

        match &result {
            DispatchResult::Delivered { index, response } => {
                if let Some(target) = self.targets.get(*index) {
                    tracing::info!(
                        correlation_id = %correlation_id,
                        target = %target,
                        status = response.status.as_u16(),
                        "winner selected"
                    );
                }
            }
            DispatchResult::AllFailed { count } => {
                tracing::warn!(correlation_id = %correlation_id, targets = count, "all targets failed");
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(raw: &str) -> Target {
        Target::from_url(url::Url::parse(raw).unwrap()).unwrap()
    }

    fn inbound() -> InboundRequest {
        let mut headers = HeaderMap::new();
        headers.insert("host", "dispatcher.local".parse().unwrap());
        headers.insert("x-request-tag", "abc".parse().unwrap());
        InboundRequest {
            method: Method::POST,
            uri: "/orders/7?dry_run=true".parse().unwrap(),
            headers,
            body: Bytes::from_static(b"{\"qty\":1}"),
        }
    }

    #[test]
    fn target_request_is_redirected() {
        let request = inbound().to_target_request(&target("http://b:9000")).unwrap();
        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.uri().to_string(), "http://b:9000/orders/7?dry_run=true");
        assert_eq!(request.headers()["host"], "b:9000");
        assert_eq!(request.headers()["x-request-tag"], "abc");
    }

    #[test]
    fn clones_leave_original_untouched() {
        let original = inbound();
        let _a = original.to_target_request(&target("http://a")).unwrap();
        let _b = original.to_target_request(&target("https://b")).unwrap();
        assert_eq!(original.headers["host"], "dispatcher.local");
        assert_eq!(original.uri, "/orders/7?dry_run=true");
    }
}
