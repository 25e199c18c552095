//! First-success-wins resolution of one dispatch.
//!
//! Every invoker of a request writes at most one [`Report`] into a single
//! channel sized to the number of targets; the [`Aggregator`] is its only
//! receiver. The first success returns immediately. `AllFailed` is only
//! produced once every target has been accounted for as a failure, so a
//! success can never lose to a concurrent final failure.
//!
//! Resolving consumes the aggregator and drops the receiver: later reports
//! fail fast in `try_send` and buffered ones are dropped unread.

use tokio::sync::mpsc;

use super::outcome::{DispatchResult, Outcome, Report};

pub struct Aggregator {
    reports: mpsc::Receiver<Report>,
    expected: usize,
    failures: usize,
}

impl Aggregator {
    #[must_use]
    pub const fn new(reports: mpsc::Receiver<Report>, expected: usize) -> Self {
        Self {
            reports,
            expected,
            failures: 0,
        }
    }

    /// Account for targets that failed before any invoker ran for them.
    #[must_use]
    pub const fn with_failures(mut self, failures: usize) -> Self {
        self.failures = failures;
        self
    }

    pub async fn resolve(mut self) -> DispatchResult {
        while self.failures < self.expected {
            match self.reports.recv().await {
                Some(Report {
                    index,
                    outcome: Outcome::Success(response),
                }) => {
                    return DispatchResult::Delivered { index, response };
                }
                Some(Report {
                    index,
                    outcome: Outcome::Failure(reason),
                }) => {
                    self.failures += 1;
                    tracing::debug!(
                        index,
                        reason = %reason,
                        failures = self.failures,
                        expected = self.expected,
                        "failure recorded"
                    );
                }
                None => {
                    // Every sender is gone; a missing report is an invoker that died.
                    tracing::warn!(
                        missing = self.expected - self.failures,
                        "invokers exited without reporting"
                    );
                    break;
                }
            }
        }

        DispatchResult::AllFailed {
            count: self.expected,
        }
    }
}
