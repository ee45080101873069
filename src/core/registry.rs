//! Resource registry and access windows.
//!
//! Each resource owns its counters behind a `parking_lot::Mutex` and a
//! `tokio::sync::Notify` used to broadcast every state change to waiters.
//! The mutex is only held for inspection or mutation, never across an await.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::futures::Notified;
use tokio::sync::Notify;

use crate::core::access::{AccessState, Operation};
use crate::core::{AdmissionError, DeclineReason};

/// A single named resource with independent access state.
#[derive(Debug)]
pub struct Resource {
    id: u32,
    limit: u32,
    state: Mutex<AccessState>,
    wake: Notify,
}

impl Resource {
    fn new(id: u32, limit: u32) -> Self {
        Self {
            id,
            limit,
            state: Mutex::new(AccessState::default()),
            wake: Notify::new(),
        }
    }

    /// 1-based resource id.
    #[must_use]
    pub const fn id(&self) -> u32 {
        self.id
    }

    /// Copy of the current counters.
    #[must_use]
    pub fn snapshot(&self) -> AccessState {
        *self.state.lock()
    }

    /// Future that resolves on the next broadcast. Must be enabled before
    /// the predicate is checked, or a release in between is lost.
    pub fn notified(&self) -> Notified<'_> {
        self.wake.notified()
    }

    /// Non-blocking admission attempt.
    ///
    /// Returns `Ok(None)` when the predicate does not hold yet, and an
    /// `InvalidResource` error once the resource is deleted.
    ///
    /// # Errors
    ///
    /// `AdmissionError::InvalidResource` with [`DeclineReason::Deleted`].
    pub fn try_acquire(self: &Arc<Self>, op: Operation) -> Result<Option<AccessWindow>, AdmissionError> {
        let mut state = self.state.lock();
        if state.deleted {
            return Err(AdmissionError::InvalidResource {
                resource_id: i64::from(self.id),
                reason: DeclineReason::Deleted,
            });
        }
        if !state.is_admissible(op, self.limit) {
            return Ok(None);
        }
        state.admit(op);
        tracing::debug!(resource = self.id, %op, readers = state.readers, writers = state.writers, "admitted");
        drop(state);

        if op == Operation::Delete {
            // Queued requests must observe the deletion and decline now.
            self.wake.notify_waiters();
        }
        Ok(Some(AccessWindow {
            resource: Arc::clone(self),
            op,
        }))
    }

    fn release(&self, op: Operation) {
        if op == Operation::Delete {
            return;
        }
        {
            let mut state = self.state.lock();
            state.release(op);
            tracing::debug!(resource = self.id, %op, readers = state.readers, writers = state.writers, "released");
        }
        self.wake.notify_waiters();
    }
}

/// An admitted reader or writer slot (or a completed deletion).
///
/// Dropping the window performs the matching release exactly once, on every
/// exit path of the holder.
#[derive(Debug)]
pub struct AccessWindow {
    resource: Arc<Resource>,
    op: Operation,
}

impl AccessWindow {
    /// Operation this window was admitted for.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        self.op
    }

    /// Resource this window is held on.
    #[must_use]
    pub fn resource(&self) -> &Resource {
        &self.resource
    }
}

impl Drop for AccessWindow {
    fn drop(&mut self) {
        self.resource.release(self.op);
    }
}

/// Fixed set of resources, created at startup and never destroyed.
#[derive(Debug)]
pub struct ResourceRegistry {
    resources: Vec<Arc<Resource>>,
    limit: u32,
}

impl ResourceRegistry {
    /// Create `count` resources sharing a per-resource concurrency `limit`.
    #[must_use]
    pub fn new(count: u32, limit: u32) -> Self {
        let resources = (1..=count).map(|id| Arc::new(Resource::new(id, limit))).collect();
        Self { resources, limit }
    }

    /// Number of resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether the registry holds no resources.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Per-resource concurrency limit.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Look up a resource by its 1-based id.
    ///
    /// # Errors
    ///
    /// `AdmissionError::InvalidResource` with [`DeclineReason::Unknown`] for ids
    /// outside `[1, len]`.
    pub fn get(&self, resource_id: i64) -> Result<Arc<Resource>, AdmissionError> {
        resource_id
            .checked_sub(1)
            .and_then(|idx| usize::try_from(idx).ok())
            .and_then(|idx| self.resources.get(idx))
            .cloned()
            .ok_or(AdmissionError::InvalidResource {
                resource_id,
                reason: DeclineReason::Unknown,
            })
    }

    /// Snapshot of every resource's counters, ordered by id.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(u32, AccessState)> {
        self.resources.iter().map(|r| (r.id(), r.snapshot())).collect()
    }
}
