//! Access state machine for a single resource.
//!
//! The state of a resource is the tuple `(readers, writers, deleted)`. All
//! transitions are evaluated by the caller while holding the resource's own
//! lock; this module only encodes the rules.
//!
//! | Operation | Admissible when                                             |
//! |-----------|-------------------------------------------------------------|
//! | `READ`    | not deleted, no writer, `readers + writers < limit`         |
//! | `WRITE`   | not deleted, no reader, no writer, `readers + writers < limit` |
//! | `DELETE`  | not deleted, no reader, no writer                           |
//!
//! `deleted` is absorbing: once set, nothing is ever admitted again.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::BrokerError;

/// Kind of access a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    /// Shared access.
    Read,
    /// Exclusive access.
    Write,
    /// Permanent invalidation of the resource.
    Delete,
}

impl Operation {
    /// Keyword used on the wire.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Read => "READ",
            Self::Write => "WRITE",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for Operation {
    type Err = BrokerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "READ" => Ok(Self::Read),
            "WRITE" => Ok(Self::Write),
            "DELETE" => Ok(Self::Delete),
            other => Err(BrokerError::parse(format!("unknown operation `{other}`"))),
        }
    }
}

/// Counters guarded by a resource's lock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessState {
    /// Active readers.
    pub readers: u32,
    /// Active writers (0 or 1).
    pub writers: u32,
    /// Terminal flag; never cleared.
    pub deleted: bool,
}

impl AccessState {
    /// Number of slots currently held.
    #[must_use]
    pub const fn holders(&self) -> u32 {
        self.readers + self.writers
    }

    /// Whether `op` may be admitted right now under `limit`.
    #[must_use]
    pub const fn is_admissible(&self, op: Operation, limit: u32) -> bool {
        if self.deleted {
            return false;
        }
        match op {
            Operation::Read => self.writers == 0 && self.holders() < limit,
            Operation::Write => self.readers == 0 && self.writers == 0 && self.holders() < limit,
            Operation::Delete => self.readers == 0 && self.writers == 0,
        }
    }

    /// Apply the admit transition. Caller must have checked admissibility.
    pub fn admit(&mut self, op: Operation) {
        debug_assert!(!self.deleted, "admit on deleted resource");
        match op {
            Operation::Read => self.readers += 1,
            Operation::Write => self.writers += 1,
            Operation::Delete => self.deleted = true,
        }
    }

    /// Apply the release transition for a previously admitted `op`.
    ///
    /// Deletion holds no slot, so releasing it is a no-op.
    pub fn release(&mut self, op: Operation) {
        match op {
            Operation::Read => {
                debug_assert!(self.readers > 0, "reader underflow");
                self.readers = self.readers.saturating_sub(1);
            }
            Operation::Write => {
                debug_assert!(self.writers > 0, "writer underflow");
                self.writers = self.writers.saturating_sub(1);
            }
            Operation::Delete => {}
        }
    }
}
