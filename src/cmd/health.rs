//! `multireq health` — check the health of a running instance.
//!
//! Sends a `GET` to the health endpoint URL (the instance must have been
//! started with `--health-path`) and displays the response as formatted
//! text or raw JSON.

use http_body_util::BodyExt;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

use crate::cli::HealthArgs;
use crate::error::MultireqError;
use crate::health::HealthResponse;

pub async fn execute(args: HealthArgs) -> Result<(), MultireqError> {
    let uri: hyper::Uri =
        args.url.parse().map_err(
            |e: hyper::http::uri::InvalidUri| MultireqError::UriParse {
                source: Box::new(e),
            },
        )?;

    let connector = hyper_util::client::legacy::connect::HttpConnector::new();
    let client = Client::builder(TokioExecutor::new()).build(connector);

    let req = hyper::Request::builder()
        .uri(uri)
        .body(http_body_util::Full::new(bytes::Bytes::new()))
        .map_err(|e| MultireqError::HttpRequest {
            source: Box::new(e),
        })?;

    let response = tokio::time::timeout(std::time::Duration::from_secs(10), client.request(req))
        .await
        .map_err(|_| MultireqError::HttpRequest {
            source: "health check timed out after 10s".into(),
        })?
        .map_err(|e| MultireqError::HttpRequest {
            source: Box::new(e),
        })?;

    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .map_err(|e| MultireqError::HttpRequest {
            source: Box::new(e),
        })?
        .to_bytes();

    if !status.is_success() {
        return Err(MultireqError::HealthCheckFailed(status));
    }

    if args.json {
        println!("{}", String::from_utf8_lossy(&body));
        return Ok(());
    }

    match serde_json::from_slice::<HealthResponse>(&body) {
        Ok(health) => {
            println!("\u{2713} multireq is healthy ({})", args.url);
            println!("  version:   {}", health.version);
            println!("  uptime:    {}", format_uptime(health.uptime_seconds));
            println!("  listen:    {}", health.listen);
            println!("  targets:   {}", health.targets.join(", "));
            println!(
                "  requests:  {} delivered, {} failed",
                health.stats.requests_delivered, health.stats.requests_failed
            );
        }
        Err(e) => {
            eprintln!("Failed to parse health response: {e}");
            println!("{}", String::from_utf8_lossy(&body));
        }
    }

    Ok(())
}

fn format_uptime(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}
