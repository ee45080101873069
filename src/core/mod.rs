//! Core arbitration: access state, registry, admission, workers and events.

pub mod access;
pub mod broker;
pub mod error;
pub mod events;
pub mod executor;
pub mod registry;
pub mod request;
pub mod scheduler;
pub mod worker;

pub use access::{AccessState, Operation};
pub use broker::{Broker, DEFAULT_GRACE_PERIOD};
pub use error::{AdmissionError, AppResult, BrokerError, DeclineReason};
pub use events::{
    ConsoleSink, Event, EventKind, EventSink, InMemoryEventSink, OutputFormat, Reporter,
};
pub use executor::{TimedExecutor, WindowExecutor};
pub use registry::{AccessWindow, Resource, ResourceRegistry};
pub use request::{parse_line, Line, Outcome, Request, RequestOutcome, STOP_KEYWORD};
pub use scheduler::AdmissionScheduler;
