//! Admission scheduler: wait for a resource to become admissible or time out.
//!
//! Waiters are woken by broadcast on every release and on deletion, then race
//! to re-check the predicate under the resource lock. Admission order among
//! simultaneous waiters is therefore not FIFO; a later arrival may overtake an
//! earlier one.

use std::pin::pin;
use std::sync::Arc;

use tokio::time::{timeout_at, Instant};

use crate::core::access::Operation;
use crate::core::registry::{AccessWindow, ResourceRegistry};
use crate::core::AdmissionError;

/// Decides, per request, whether and when an access window opens.
#[derive(Debug, Clone)]
pub struct AdmissionScheduler {
    registry: Arc<ResourceRegistry>,
}

impl AdmissionScheduler {
    /// Create a scheduler over a registry.
    #[must_use]
    pub const fn new(registry: Arc<ResourceRegistry>) -> Self {
        Self { registry }
    }

    /// Registry this scheduler admits against.
    #[must_use]
    pub fn registry(&self) -> &Arc<ResourceRegistry> {
        &self.registry
    }

    /// Block until `op` is admitted on `resource_id` or `deadline` passes.
    ///
    /// Unknown or already-deleted resources are declined before any waiting.
    /// A waiter that observes a deletion while queued is declined as well.
    /// On timeout no counter has been touched.
    ///
    /// # Errors
    ///
    /// - `AdmissionError::InvalidResource` when the resource is unknown or deleted
    /// - `AdmissionError::Timeout` when the deadline passes first
    pub async fn admit(
        &self,
        resource_id: i64,
        op: Operation,
        deadline: Instant,
    ) -> Result<AccessWindow, AdmissionError> {
        let resource = self.registry.get(resource_id)?;
        loop {
            let mut notified = pin!(resource.notified());
            notified.as_mut().enable();

            if let Some(window) = resource.try_acquire(op)? {
                return Ok(window);
            }

            tracing::trace!(resource = resource_id, %op, "waiting for admission");
            if timeout_at(deadline, notified).await.is_err() {
                tracing::debug!(resource = resource_id, %op, "admission deadline passed");
                return Err(AdmissionError::Timeout);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DeclineReason;
    use std::time::Duration;

    fn scheduler(count: u32, limit: u32) -> AdmissionScheduler {
        AdmissionScheduler::new(Arc::new(ResourceRegistry::new(count, limit)))
    }

    #[tokio::test(start_paused = true)]
    async fn test_admits_immediately_when_idle() {
        let s = scheduler(1, 1);
        let start = Instant::now();
        let w = s
            .admit(1, Operation::Write, start + Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(w.operation(), Operation::Write);
        assert_eq!(Instant::now(), start);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_resource_declined() {
        let s = scheduler(2, 1);
        let err = s
            .admit(3, Operation::Read, Instant::now() + Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AdmissionError::InvalidResource {
                resource_id: 3,
                reason: DeclineReason::Unknown
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_without_touching_counters() {
        let s = scheduler(1, 1);
        let start = Instant::now();
        let _held = s.admit(1, Operation::Write, start).await.unwrap();

        let err = s
            .admit(1, Operation::Write, start + Duration::from_secs(2))
            .await
            .unwrap_err();
        assert!(matches!(err, AdmissionError::Timeout));
        assert_eq!(Instant::now(), start + Duration::from_secs(2));

        let state = s.registry().get(1).unwrap().snapshot();
        assert_eq!((state.readers, state.writers), (0, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiter_admitted_after_release() {
        let s = scheduler(1, 1);
        let start = Instant::now();
        let held = s.admit(1, Operation::Write, start).await.unwrap();

        let waiter = {
            let s = s.clone();
            tokio::spawn(async move {
                s.admit(1, Operation::Read, start + Duration::from_secs(10))
                    .await
                    .map(|w| (w.operation(), Instant::now()))
            })
        };

        tokio::time::sleep(Duration::from_secs(3)).await;
        drop(held);

        let (op, at) = waiter.await.unwrap().unwrap();
        assert_eq!(op, Operation::Read);
        assert_eq!(at, start + Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_queued_waiter_declined_on_delete() {
        let s = scheduler(1, 1);
        let start = Instant::now();
        let resource = s.registry().get(1).unwrap();
        let held = resource.try_acquire(Operation::Write).unwrap().unwrap();

        let waiter = {
            let s = s.clone();
            tokio::spawn(async move {
                let res = s.admit(1, Operation::Read, start + Duration::from_secs(10)).await;
                (res.map(|_| ()), Instant::now())
            })
        };
        tokio::time::sleep(Duration::from_secs(1)).await;

        // Release and delete with no await in between, so the delete wins.
        drop(held);
        let _delete = resource.try_acquire(Operation::Delete).unwrap().unwrap();

        let (res, at) = waiter.await.unwrap();
        assert!(matches!(
            res,
            Err(AdmissionError::InvalidResource {
                reason: DeclineReason::Deleted,
                ..
            })
        ));
        assert_eq!(at, start + Duration::from_secs(1));
    }
}
