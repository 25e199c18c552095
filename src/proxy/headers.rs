//! Header forwarding and hop-by-hop stripping.
//!
//! [`build_target_headers`] copies the inbound headers for one target,
//! strips hop-by-hop headers, and rewrites `Host`.
//! [`strip_response_hop_by_hop`] does the same cleanup on the winning
//! response before it is relayed; connection framing is negotiated per hop.

use std::sync::LazyLock;

use axum::http::{HeaderMap, HeaderName, HeaderValue};

use crate::config::model::Target;

static HOP_BY_HOP: LazyLock<Vec<HeaderName>> = LazyLock::new(|| {
    [
        "connection",
        "keep-alive",
        "transfer-encoding",
        "te",
        "trailer",
        "upgrade",
        "proxy-authorization",
        "proxy-authenticate",
    ]
    .iter()
    .filter_map(|name| name.parse::<HeaderName>().ok())
    .collect()
});

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    // Headers named in `Connection` are hop-by-hop too.
    let named: Vec<HeaderName> = headers
        .get_all(hyper::header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| name.trim().parse::<HeaderName>().ok())
        .collect();
    for name in named.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
}

/// Strip hop-by-hop headers from a target response.
///
/// `content-length` is kept: the body is streamed through unchanged.
pub fn strip_response_hop_by_hop(headers: &mut HeaderMap) {
    strip_hop_by_hop(headers);
}

#[must_use]
pub fn build_target_headers(original: &HeaderMap, target: &Target) -> HeaderMap {
    let mut headers = original.clone();
    strip_hop_by_hop(&mut headers);

    match HeaderValue::from_str(target.authority()) {
        Ok(val) => {
            headers.insert(hyper::header::HOST, val);
        }
        Err(_) => {
            tracing::warn!(target = %target, "target authority is not a valid Host header");
        }
    }

    headers
}
