//! Event reporting.
//!
//! Every status line goes through a [`Reporter`], which timestamps it from the
//! run clock and hands it to an [`EventSink`] under a single global lock held
//! for the emission of that one line only.

use std::collections::VecDeque;
use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::core::access::Operation;
use crate::core::DeclineReason;
use crate::util::clock::{as_millis_u64, rounded_secs, Clock};

const YELLOW: &str = "\x1b[1;33m";
const MAGENTA: &str = "\x1b[1;35m";
const GREEN: &str = "\x1b[0;32m";
const RED: &str = "\x1b[0;31m";
const WHITE: &str = "\x1b[1;37m";
const RESET: &str = "\x1b[0m";

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventKind {
    /// The broker is up.
    Startup,
    /// A request reached its scheduled offset and was dispatched.
    Arrival {
        /// Requesting user.
        user_id: i64,
        /// Target resource.
        resource_id: i64,
        /// Requested access.
        operation: Operation,
    },
    /// A worker started its admission attempt.
    TakenUp {
        /// Requesting user.
        user_id: i64,
    },
    /// The access window closed normally.
    Completed {
        /// Requesting user.
        user_id: i64,
    },
    /// The request was refused without waiting.
    Declined {
        /// Requesting user.
        user_id: i64,
        /// Target resource.
        resource_id: i64,
        /// Unknown or deleted.
        reason: DeclineReason,
    },
    /// The request gave up after its deadline passed.
    Cancelled {
        /// Requesting user.
        user_id: i64,
    },
    /// All workers finished.
    Shutdown,
}

/// A timestamped status event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    /// Event payload.
    #[serde(flatten)]
    pub kind: EventKind,
    /// Milliseconds since run start.
    pub elapsed_ms: u64,
}

impl Event {
    /// Elapsed time rounded to whole seconds.
    #[must_use]
    pub fn secs(&self) -> u64 {
        rounded_secs(std::time::Duration::from_millis(self.elapsed_ms))
    }

    /// User the event concerns, if any.
    #[must_use]
    pub const fn user_id(&self) -> Option<i64> {
        match self.kind {
            EventKind::Arrival { user_id, .. }
            | EventKind::TakenUp { user_id }
            | EventKind::Completed { user_id }
            | EventKind::Declined { user_id, .. }
            | EventKind::Cancelled { user_id } => Some(user_id),
            EventKind::Startup | EventKind::Shutdown => None,
        }
    }

    /// Human-readable line, without colour.
    #[must_use]
    pub fn render_text(&self) -> String {
        let t = self.secs();
        match &self.kind {
            EventKind::Startup => "Access broker is up and accepting requests.\n".to_string(),
            EventKind::Arrival {
                user_id,
                resource_id,
                operation,
            } => format!(
                "User {user_id} requested {operation} on resource {resource_id} at {t} seconds"
            ),
            EventKind::TakenUp { user_id } => {
                format!("Broker has taken up the request of User {user_id} at {t} seconds")
            }
            EventKind::Completed { user_id } => {
                format!("The request of User {user_id} was completed at {t} seconds")
            }
            EventKind::Declined {
                user_id,
                resource_id,
                reason,
            } => {
                let why = match reason {
                    DeclineReason::Unknown => "does not exist",
                    DeclineReason::Deleted => "has been deleted",
                };
                format!(
                    "Broker declined the request of User {user_id} at {t} seconds because resource {resource_id} {why}"
                )
            }
            EventKind::Cancelled { user_id } => {
                format!("User {user_id} cancelled the request after no response at {t} seconds")
            }
            EventKind::Shutdown => {
                "\nAccess broker has no more pending requests and is shutting down.".to_string()
            }
        }
    }

    const fn color(&self) -> Option<&'static str> {
        match self.kind {
            EventKind::Startup | EventKind::Shutdown => None,
            EventKind::Arrival { .. } => Some(YELLOW),
            EventKind::TakenUp { .. } => Some(MAGENTA),
            EventKind::Completed { .. } => Some(GREEN),
            EventKind::Cancelled { .. } => Some(RED),
            EventKind::Declined { .. } => Some(WHITE),
        }
    }
}

/// Sink abstraction for emitted events.
pub trait EventSink: Send {
    /// Write one event. Called with the reporter's lock held.
    ///
    /// # Errors
    ///
    /// Propagates I/O failures of the underlying writer.
    fn emit(&mut self, event: &Event) -> std::io::Result<()>;
}

/// Line format for console output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Sink writing lines to any `Write` (stdout in the binary).
pub struct ConsoleSink<W> {
    out: W,
    format: OutputFormat,
    color: bool,
}

impl<W: Write + Send> ConsoleSink<W> {
    /// Create a sink over a writer.
    pub const fn new(out: W, format: OutputFormat, color: bool) -> Self {
        Self { out, format, color }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> EventSink for ConsoleSink<W> {
    fn emit(&mut self, event: &Event) -> std::io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, event)?;
                writeln!(self.out)?;
            }
            OutputFormat::Text => {
                let text = event.render_text();
                match event.color() {
                    Some(color) if self.color => writeln!(self.out, "{color}{text}{RESET}")?,
                    _ => writeln!(self.out, "{text}")?,
                }
            }
        }
        self.out.flush()
    }
}

/// In-memory sink for tests and embedding, bounded to `max_events`.
///
/// Clones share the same buffer, so a clone kept by the caller observes
/// everything emitted through the reporter.
#[derive(Debug, Clone)]
pub struct InMemoryEventSink {
    events: Arc<Mutex<VecDeque<Event>>>,
    max_events: usize,
}

impl InMemoryEventSink {
    /// Create a new in-memory sink with a bounded buffer.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::with_capacity(max_events.min(1024)))),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().iter().cloned().collect()
    }
}

impl EventSink for InMemoryEventSink {
    fn emit(&mut self, event: &Event) -> std::io::Result<()> {
        let mut events = self.events.lock();
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(event.clone());
        Ok(())
    }
}

/// Serializes events from all workers onto one sink.
pub struct Reporter {
    clock: Clock,
    sink: Mutex<Box<dyn EventSink>>,
}

impl Reporter {
    /// Create a reporter timestamping from `clock`.
    pub fn new(clock: Clock, sink: Box<dyn EventSink>) -> Self {
        Self {
            clock,
            sink: Mutex::new(sink),
        }
    }

    /// Run clock used for timestamps.
    #[must_use]
    pub const fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Timestamp and emit an event. Output failures are logged, not raised,
    /// so a broken pipe never takes a worker down.
    pub fn report(&self, kind: EventKind) -> Event {
        let mut sink = self.sink.lock();
        let event = Event {
            kind,
            elapsed_ms: as_millis_u64(self.clock.elapsed()),
        };
        if let Err(e) = sink.emit(&event) {
            tracing::error!("failed to emit event: {}", e);
        }
        event
    }
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter").field("clock", &self.clock).finish_non_exhaustive()
    }
}
