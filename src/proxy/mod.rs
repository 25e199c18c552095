//! Core request dispatching.
//!
//! The [`forward_handler`] function is the Axum fallback that receives
//! every request, buffers it, and hands it to the
//! [`Dispatcher`](fanout::Dispatcher). Submodules split the race protocol
//! into its parts: per-target attempts ([`invoker`]), first-success
//! resolution ([`aggregator`]), orchestration and teardown ([`fanout`]),
//! and writing the result back ([`relay`]). [`transport`] is the seam to
//! the network and [`headers`] handles header forwarding.

pub mod aggregator;
pub mod fanout;
pub mod headers;
pub mod invoker;
pub mod outcome;
pub mod relay;
pub mod transport;

use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, Method, Uri};
use axum::response::Response;

use crate::server::AppState;
use fanout::InboundRequest;
use outcome::DispatchResult;

pub async fn forward_handler(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let correlation_id = headers
        .get("x-correlation-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), String::from);

    tracing::info!(
        correlation_id = %correlation_id,
        client = %addr,
        method = %method,
        uri = %uri,
        targets = state.dispatcher.targets().len(),
        "request received"
    );

    let inbound = InboundRequest {
        method,
        uri,
        headers,
        body,
    };
    let result = state.dispatcher.dispatch(&inbound, &correlation_id).await;

    match result {
        DispatchResult::Delivered { .. } => {
            state.stats.delivered.fetch_add(1, Ordering::Relaxed);
        }
        DispatchResult::AllFailed { .. } => {
            state.stats.all_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    relay::relay(result, &correlation_id)
}
