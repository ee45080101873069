//! # Access Broker
//!
//! Per-resource access arbitration with timed admission.
//!
//! A fixed set of numbered resources is shared by a stream of timestamped
//! requests. Each request asks for a `READ`, `WRITE` or `DELETE` window on one
//! resource and is served by its own task, which waits until the resource's
//! state admits it or its deadline passes.
//!
//! ## Sharing rules
//!
//! - **READ**: shared with other readers, up to the per-resource limit
//! - **WRITE**: exclusive against every reader and writer
//! - **DELETE**: requires an idle resource and invalidates it permanently;
//!   every later or still-queued request for it is declined
//!
//! Waiters are woken by broadcast and re-check the predicate; admission order
//! among simultaneous waiters is not FIFO.
//!
//! ## Example
//!
//! ```rust,ignore
//! use access_broker::builders::BrokerBuilder;
//! use access_broker::config::read_header;
//! use access_broker::runtime::Dispatcher;
//! use tokio::io::{AsyncBufReadExt, BufReader};
//!
//! let mut lines = BufReader::new(tokio::io::stdin()).lines();
//! let config = read_header(&mut lines).await?;
//! let broker = BrokerBuilder::new(config).build()?;
//! let report = Dispatcher::new(broker).run(&mut lines).await?;
//! println!("{} completed", report.completed());
//! ```
//!
//! For complete scenarios, see `tests/broker_scenarios_test.rs`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core arbitration: access state, registry, admission, workers and events.
pub mod core;
/// Configuration models and the startup header reader.
pub mod config;
/// Builders to construct a broker from configuration.
pub mod builders;
/// Runtime adapters: request dispatch on tokio.
pub mod runtime;
/// Shared utilities.
pub mod util;
