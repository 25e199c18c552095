//! `multireq run` — start the dispatcher.
//!
//! Validates the listen address and target list, builds the pooled HTTP
//! client and the dispatcher, and serves until Ctrl+C or SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::cli::RunArgs;
use crate::config::Settings;
use crate::error::MultireqError;
use crate::logging;
use crate::proxy::fanout::Dispatcher;
use crate::proxy::transport::HyperTransport;
use crate::server::{self, AppState, Stats};

pub async fn execute(args: RunArgs) -> Result<(), MultireqError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    let settings = Settings::from_run_args(&args).await?;

    let transport = HyperTransport::new(server::build_http_client(), settings.timeout);
    let dispatcher = Dispatcher::new(settings.targets.clone(), Arc::new(transport));

    let state = Arc::new(AppState {
        dispatcher,
        listen: settings.listen,
        start_time: Instant::now(),
        stats: Stats::new(),
    });

    let router = server::build_router(state, settings.max_body, settings.health_path.as_deref());

    let listener = tokio::net::TcpListener::bind(settings.listen).await?;

    for (index, target) in settings.targets.iter().enumerate() {
        tracing::debug!(index, target = %target, "target configured");
    }
    tracing::info!(
        addr = %settings.listen,
        targets = settings.targets.len(),
        timeout_ms = settings.timeout.as_millis() as u64,
        health_path = settings.health_path.as_deref().unwrap_or("-"),
        "multireq started"
    );

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(server::shutdown_signal())
    .await?;

    tracing::info!("multireq stopped");
    Ok(())
}
