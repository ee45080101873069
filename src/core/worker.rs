//! Per-request worker.
//!
//! Sequence: dispatch-latency grace period, deadline pre-check, "taken up"
//! announcement, admission, hold for the operation's duration, release,
//! completion. Exactly one of completion, cancellation or decline is reported.

use tokio::time::Instant;

use crate::core::broker::Broker;
use crate::core::events::EventKind;
use crate::core::executor::WindowExecutor;
use crate::core::request::{Outcome, Request, RequestOutcome};
use crate::core::AdmissionError;

/// Drive one request to its terminal outcome.
pub async fn serve<E: WindowExecutor>(broker: Broker<E>, request: Request) -> RequestOutcome {
    let outcome = process(&broker, &request).await;
    tracing::debug!(seq = request.seq, user = request.user_id, ?outcome, "request finished");
    RequestOutcome { request, outcome }
}

async fn process<E: WindowExecutor>(broker: &Broker<E>, request: &Request) -> Outcome {
    let reporter = broker.reporter();
    let user_id = request.user_id;
    let deadline = reporter
        .clock()
        .at(request.offset.saturating_add(broker.config().timeout()));

    tokio::time::sleep(broker.grace_period()).await;

    if Instant::now() > deadline {
        reporter.report(EventKind::Cancelled { user_id });
        return Outcome::Cancelled;
    }

    reporter.report(EventKind::TakenUp { user_id });

    let window = match broker
        .scheduler()
        .admit(request.resource_id, request.operation, deadline)
        .await
    {
        Ok(window) => window,
        Err(AdmissionError::InvalidResource { resource_id, reason }) => {
            reporter.report(EventKind::Declined {
                user_id,
                resource_id,
                reason,
            });
            return Outcome::Declined(reason);
        }
        Err(AdmissionError::Timeout) => {
            reporter.report(EventKind::Cancelled { user_id });
            return Outcome::Cancelled;
        }
    };

    let duration = broker.config().hold_duration(request.operation);
    broker.executor().hold(request, &window, duration).await;
    drop(window);

    reporter.report(EventKind::Completed { user_id });
    Outcome::Completed
}
