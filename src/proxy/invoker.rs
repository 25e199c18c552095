//! One attempt against one target.
//!
//! An [`Invoker`] races its transport exchange against its cancellation
//! token, classifies the result, and reports exactly one [`Report`], unless
//! it was cancelled first, in which case it reports nothing and drops
//! whatever it had in flight (closing any unread response body).

use std::sync::Arc;
use std::time::Instant;

use axum::http::Request;
use bytes::Bytes;
use http_body_util::Full;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;

use super::outcome::{FailureReason, Outcome, Report};
use super::transport::Transport;
use crate::config::model::Target;

pub struct Invoker {
    pub index: usize,
    pub target: Target,
    pub request: Request<Full<Bytes>>,
    pub token: CancellationToken,
    pub transport: Arc<dyn Transport>,
    pub reports: mpsc::Sender<Report>,
    pub correlation_id: Arc<str>,
}

impl Invoker {
    #[allow(clippy::cast_possible_truncation)]
    pub async fn run(self) {
        let Self {
            index,
            target,
            request,
            token,
            transport,
            reports,
            correlation_id,
        } = self;

        if token.is_cancelled() {
            tracing::debug!(correlation_id = %correlation_id, target = %target, "cancelled before start");
            return;
        }

        let start = Instant::now();
        let result = tokio::select! {
            biased;
            () = token.cancelled() => {
                tracing::debug!(
                    correlation_id = %correlation_id,
                    target = %target,
                    "cancelled while awaiting response"
                );
                return;
            }
            result = transport.exchange(request) => result,
        };
        let latency_ms = start.elapsed().as_millis() as u64;

        let outcome = match result {
            Ok(response) => Outcome::classify(response),
            Err(e) => Outcome::Failure(FailureReason::Transport(e)),
        };

        match &outcome {
            Outcome::Success(response) => tracing::info!(
                correlation_id = %correlation_id,
                target = %target,
                status = response.status.as_u16(),
                latency_ms,
                "target responded"
            ),
            Outcome::Failure(reason) => tracing::warn!(
                correlation_id = %correlation_id,
                target = %target,
                reason = %reason,
                latency_ms,
                "target failed"
            ),
        }

        // A winner may have been chosen while this exchange was finishing.
        if token.is_cancelled() {
            tracing::debug!(correlation_id = %correlation_id, target = %target, "discarding late outcome");
            return;
        }

        match reports.try_send(Report { index, outcome }) {
            Ok(()) => {}
            Err(TrySendError::Closed(_)) => {
                tracing::debug!(
                    correlation_id = %correlation_id,
                    target = %target,
                    "dispatch already resolved, discarding outcome"
                );
            }
            Err(TrySendError::Full(_)) => {
                // Capacity is one slot per target; only a second report could fill it.
                tracing::error!(
                    correlation_id = %correlation_id,
                    target = %target,
                    "outcome channel full, discarding outcome"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Response;

    use super::*;
    use crate::proxy::transport::TransportError;

    struct Fixed {
        status: u16,
        delay: Duration,
    }

    #[async_trait]
    impl Transport for Fixed {
        async fn exchange(
            &self,
            _request: Request<Full<Bytes>>,
        ) -> Result<Response<Body>, TransportError> {
            tokio::time::sleep(self.delay).await;
            Ok(Response::builder()
                .status(self.status)
                .body(Body::from("payload"))
                .unwrap())
        }
    }

    struct Refused;

    #[async_trait]
    impl Transport for Refused {
        async fn exchange(
            &self,
            _request: Request<Full<Bytes>>,
        ) -> Result<Response<Body>, TransportError> {
            Err(TransportError::Upstream("connection refused".into()))
        }
    }

    /// Completes its exchange, but a winner is chosen elsewhere just before
    /// it returns.
    struct CancelsOnReturn(CancellationToken);

    #[async_trait]
    impl Transport for CancelsOnReturn {
        async fn exchange(
            &self,
            _request: Request<Full<Bytes>>,
        ) -> Result<Response<Body>, TransportError> {
            self.0.cancel();
            Ok(Response::builder()
                .status(200)
                .body(Body::from("late"))
                .unwrap())
        }
    }

    fn invoker(
        transport: Arc<dyn Transport>,
        token: CancellationToken,
        reports: mpsc::Sender<Report>,
    ) -> Invoker {
        let target = Target::from_url(url::Url::parse("http://backend:8080").unwrap()).unwrap();
        Invoker {
            index: 3,
            target,
            request: Request::new(Full::new(Bytes::new())),
            token,
            transport,
            reports,
            correlation_id: Arc::from("test"),
        }
    }

    #[tokio::test]
    async fn reports_success_once() {
        let (tx, mut rx) = mpsc::channel(1);
        let transport = Arc::new(Fixed { status: 200, delay: Duration::ZERO });
        invoker(transport, CancellationToken::new(), tx).run().await;

        let report = rx.recv().await.unwrap();
        assert_eq!(report.index, 3);
        assert!(report.outcome.is_success());
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn reports_unsatisfying_status_as_failure() {
        let (tx, mut rx) = mpsc::channel(1);
        let transport = Arc::new(Fixed { status: 503, delay: Duration::ZERO });
        invoker(transport, CancellationToken::new(), tx).run().await;

        let report = rx.recv().await.unwrap();
        assert!(matches!(
            report.outcome,
            Outcome::Failure(FailureReason::UnsatisfyingStatus(s)) if s == 503
        ));
    }

    #[tokio::test]
    async fn reports_transport_error_as_failure() {
        let (tx, mut rx) = mpsc::channel(1);
        invoker(Arc::new(Refused), CancellationToken::new(), tx).run().await;

        let report = rx.recv().await.unwrap();
        assert!(matches!(report.outcome, Outcome::Failure(FailureReason::Transport(_))));
    }

    #[tokio::test]
    async fn cancelled_before_start_reports_nothing() {
        let (tx, mut rx) = mpsc::channel(1);
        let token = CancellationToken::new();
        token.cancel();
        let transport = Arc::new(Fixed { status: 200, delay: Duration::ZERO });
        invoker(transport, token, tx).run().await;

        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_mid_exchange_reports_nothing() {
        let (tx, mut rx) = mpsc::channel(1);
        let token = CancellationToken::new();
        let transport = Arc::new(Fixed { status: 200, delay: Duration::from_secs(60) });
        let handle = tokio::spawn(invoker(transport, token.clone(), tx).run());

        tokio::time::sleep(Duration::from_millis(10)).await;
        token.cancel();
        handle.await.unwrap();

        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn cancelled_after_exchange_discards_outcome() {
        let (tx, mut rx) = mpsc::channel(1);
        let token = CancellationToken::new();
        let transport = Arc::new(CancelsOnReturn(token.clone()));
        invoker(transport, token.clone(), tx).run().await;

        assert!(token.is_cancelled());
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn report_after_resolution_does_not_block() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let transport = Arc::new(Fixed { status: 200, delay: Duration::ZERO });
        tokio::time::timeout(
            Duration::from_secs(1),
            invoker(transport, CancellationToken::new(), tx).run(),
        )
        .await
        .unwrap();
    }
}
