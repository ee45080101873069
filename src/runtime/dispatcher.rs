//! Request dispatcher.
//!
//! Reads the request stream line by line, waits for each request's scheduled
//! offset, announces its arrival and spawns its worker without waiting for it.
//! After `STOP` or end of input, every spawned worker is joined before the run
//! is reported complete.

use serde::Serialize;
use tokio::io::{AsyncBufRead, Lines};
use tokio::task::JoinSet;

use crate::core::events::EventKind;
use crate::core::executor::WindowExecutor;
use crate::core::request::{parse_line, Line, Outcome, RequestOutcome};
use crate::core::{worker, Broker, BrokerError};

/// Summary of a finished run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Outcomes of every dispatched request, in stream order.
    pub outcomes: Vec<RequestOutcome>,
    /// Malformed lines that were skipped.
    pub skipped_lines: usize,
}

impl RunReport {
    /// Number of requests that ended with `outcome`-matching classification.
    #[must_use]
    pub fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.outcome)).count()
    }

    /// Requests that completed.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.count(|o| *o == Outcome::Completed)
    }

    /// Requests cancelled by timeout.
    #[must_use]
    pub fn cancelled(&self) -> usize {
        self.count(|o| *o == Outcome::Cancelled)
    }

    /// Requests declined without waiting.
    #[must_use]
    pub fn declined(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Declined(_)))
    }

    /// Outcome of the request with stream position `seq`.
    #[must_use]
    pub fn outcome_of(&self, seq: usize) -> Option<Outcome> {
        self.outcomes
            .iter()
            .find(|o| o.request.seq == seq)
            .map(|o| o.outcome)
    }
}

/// Drives a request stream through a broker.
#[derive(Debug, Clone)]
pub struct Dispatcher<E> {
    broker: Broker<E>,
}

impl<E: WindowExecutor> Dispatcher<E> {
    /// Create a dispatcher for `broker`.
    pub const fn new(broker: Broker<E>) -> Self {
        Self { broker }
    }

    /// Broker this dispatcher feeds.
    pub const fn broker(&self) -> &Broker<E> {
        &self.broker
    }

    /// Run the stream to completion: startup banner, dispatch, join, shutdown
    /// banner.
    ///
    /// # Errors
    ///
    /// `BrokerError::Io` if reading the stream fails. Workers already spawned
    /// are still joined first.
    pub async fn run<R>(&self, lines: &mut Lines<R>) -> Result<RunReport, BrokerError>
    where
        R: AsyncBufRead + Unpin,
    {
        let reporter = self.broker.reporter();
        reporter.report(EventKind::Startup);

        let mut workers = JoinSet::new();
        let mut report = RunReport::default();
        let read_result = self.dispatch(lines, &mut workers, &mut report).await;

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(e) => tracing::error!("worker task failed: {}", e),
            }
        }
        report.outcomes.sort_by_key(|o| o.request.seq);

        reporter.report(EventKind::Shutdown);
        tracing::info!(
            dispatched = report.outcomes.len(),
            completed = report.completed(),
            cancelled = report.cancelled(),
            declined = report.declined(),
            skipped = report.skipped_lines,
            "run finished"
        );

        read_result.map(|()| report)
    }

    async fn dispatch<R>(
        &self,
        lines: &mut Lines<R>,
        workers: &mut JoinSet<RequestOutcome>,
        report: &mut RunReport,
    ) -> Result<(), BrokerError>
    where
        R: AsyncBufRead + Unpin,
    {
        let clock = *self.broker.reporter().clock();
        let mut seq = 0;
        let mut line_no = 0usize;

        while let Some(line) = lines.next_line().await? {
            line_no += 1;
            let mut request = match parse_line(&line) {
                Ok(Some(Line::Request(request))) => request,
                Ok(Some(Line::Stop)) => {
                    tracing::debug!(line = line_no, "stop sentinel reached");
                    break;
                }
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(line = line_no, input = %line, "skipping request: {}", e);
                    report.skipped_lines += 1;
                    continue;
                }
            };
            request.seq = seq;
            seq += 1;

            tokio::time::sleep_until(clock.at(request.offset)).await;

            self.broker.reporter().report(EventKind::Arrival {
                user_id: request.user_id,
                resource_id: request.resource_id,
                operation: request.operation,
            });
            workers.spawn(worker::serve(self.broker.clone(), request));
        }
        Ok(())
    }
}
