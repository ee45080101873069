//! Shared handle bundling everything a worker needs.

use std::sync::Arc;
use std::time::Duration;

use crate::config::BrokerConfig;
use crate::core::events::Reporter;
use crate::core::executor::WindowExecutor;
use crate::core::registry::ResourceRegistry;
use crate::core::scheduler::AdmissionScheduler;

/// Default dispatch latency before a worker starts its admission attempt.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(1);

/// Cheap-to-clone broker handle; every field is shared.
#[derive(Debug, Clone)]
pub struct Broker<E> {
    config: Arc<BrokerConfig>,
    scheduler: AdmissionScheduler,
    reporter: Arc<Reporter>,
    executor: E,
    grace_period: Duration,
}

impl<E: WindowExecutor> Broker<E> {
    /// Assemble a broker from its parts. See `builders::BrokerBuilder`.
    pub fn new(
        config: Arc<BrokerConfig>,
        registry: Arc<ResourceRegistry>,
        reporter: Arc<Reporter>,
        executor: E,
        grace_period: Duration,
    ) -> Self {
        Self {
            config,
            scheduler: AdmissionScheduler::new(registry),
            reporter,
            executor,
            grace_period,
        }
    }

    /// Immutable configuration.
    #[must_use]
    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }

    /// Admission scheduler.
    #[must_use]
    pub const fn scheduler(&self) -> &AdmissionScheduler {
        &self.scheduler
    }

    /// Resource registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ResourceRegistry> {
        self.scheduler.registry()
    }

    /// Event reporter.
    #[must_use]
    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// Executor holding admitted windows.
    #[must_use]
    pub const fn executor(&self) -> &E {
        &self.executor
    }

    /// Dispatch latency applied before each admission attempt.
    #[must_use]
    pub const fn grace_period(&self) -> Duration {
        self.grace_period
    }
}
