//! Builder assembling a broker from configuration.

use std::sync::Arc;
use std::time::Duration;

use crate::config::BrokerConfig;
use crate::core::{
    Broker, BrokerError, ConsoleSink, EventSink, OutputFormat, Reporter, ResourceRegistry,
    TimedExecutor, WindowExecutor, DEFAULT_GRACE_PERIOD,
};
use crate::util::clock::Clock;

/// Builds a [`Broker`]: registry sized from the config, reporter over a sink,
/// executor, and dispatch grace period.
///
/// The run clock starts when [`BrokerBuilder::build`] is called.
pub struct BrokerBuilder<E = TimedExecutor> {
    config: BrokerConfig,
    sink: Option<Box<dyn EventSink>>,
    executor: E,
    grace_period: Duration,
}

impl BrokerBuilder<TimedExecutor> {
    /// Start from a configuration, with stdout text output and the timed executor.
    #[must_use]
    pub fn new(config: BrokerConfig) -> Self {
        Self {
            config,
            sink: None,
            executor: TimedExecutor,
            grace_period: DEFAULT_GRACE_PERIOD,
        }
    }
}

impl<E: WindowExecutor> BrokerBuilder<E> {
    /// Emit events to `sink` instead of stdout.
    #[must_use]
    pub fn with_sink(mut self, sink: Box<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Replace the window executor.
    #[must_use]
    pub fn with_executor<X: WindowExecutor>(self, executor: X) -> BrokerBuilder<X> {
        BrokerBuilder {
            config: self.config,
            sink: self.sink,
            executor,
            grace_period: self.grace_period,
        }
    }

    /// Override the dispatch-latency grace period.
    #[must_use]
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// Validate the configuration, create every resource, and start the clock.
    ///
    /// # Errors
    ///
    /// `BrokerError::Config` if the configuration is invalid.
    pub fn build(self) -> Result<Broker<E>, BrokerError> {
        self.config.validate().map_err(BrokerError::Config)?;

        let registry = Arc::new(ResourceRegistry::new(
            self.config.resource_count,
            self.config.concurrency_limit,
        ));
        let sink = self.sink.unwrap_or_else(|| {
            Box::new(ConsoleSink::new(std::io::stdout(), OutputFormat::Text, true))
        });
        let reporter = Arc::new(Reporter::new(Clock::start(), sink));
        tracing::debug!(
            resources = self.config.resource_count,
            limit = self.config.concurrency_limit,
            timeout_secs = self.config.timeout_secs,
            "broker initialized"
        );

        Ok(Broker::new(
            Arc::new(self.config),
            registry,
            reporter,
            self.executor,
            self.grace_period,
        ))
    }
}
