//! Requests, their parsing from the input stream, and their outcomes.
//!
//! One request per line: `<user_id> <resource_id> <READ|WRITE|DELETE> <offset>`,
//! where `offset` is a non-negative number of seconds from run start. A line
//! whose first token is `STOP` ends the stream.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::access::Operation;
use crate::core::{BrokerError, DeclineReason};
use crate::util::HORIZON;

/// Sentinel keyword that ends the request stream.
pub const STOP_KEYWORD: &str = "STOP";

/// One arbitration unit, owned exclusively by its worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Position in the input stream among accepted requests.
    pub seq: usize,
    /// Requesting user.
    pub user_id: i64,
    /// Target resource (1-based; validated at admission time).
    pub resource_id: i64,
    /// Requested access kind.
    pub operation: Operation,
    /// Scheduled arrival, measured from run start.
    pub offset: Duration,
}

/// A parsed, non-blank input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    /// A request to dispatch. `seq` is left at zero for the dispatcher to fill.
    Request(Request),
    /// The `STOP` sentinel.
    Stop,
}

/// Parse one input line. Returns `Ok(None)` for blank lines.
///
/// # Errors
///
/// `BrokerError::Parse` for a wrong field count, a non-numeric field, an
/// unknown operation keyword, or an offset that is negative, non-finite, or
/// beyond [`HORIZON`].
pub fn parse_line(line: &str) -> Result<Option<Line>, BrokerError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    match fields.as_slice() {
        [] => Ok(None),
        [first, ..] if *first == STOP_KEYWORD => Ok(Some(Line::Stop)),
        [user, resource, op, offset] => {
            let user_id = user
                .parse::<i64>()
                .map_err(|e| BrokerError::parse(format!("user id `{user}`: {e}")))?;
            let resource_id = resource
                .parse::<i64>()
                .map_err(|e| BrokerError::parse(format!("resource id `{resource}`: {e}")))?;
            let operation = op.parse::<Operation>()?;
            let secs = offset
                .parse::<f64>()
                .map_err(|e| BrokerError::parse(format!("offset `{offset}`: {e}")))?;
            let offset = Duration::try_from_secs_f64(secs)
                .map_err(|_| BrokerError::parse(format!("offset `{offset}` is not a valid time")))?;
            if offset > HORIZON {
                return Err(BrokerError::parse(format!(
                    "offset {}s is beyond the {}s horizon",
                    offset.as_secs(),
                    HORIZON.as_secs()
                )));
            }
            Ok(Some(Line::Request(Request {
                seq: 0,
                user_id,
                resource_id,
                operation,
                offset,
            })))
        }
        other => Err(BrokerError::parse(format!(
            "expected 4 fields, found {}",
            other.len()
        ))),
    }
}

/// Terminal classification of a request. Exactly one per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "reason")]
pub enum Outcome {
    /// Admitted, held for its duration, and released.
    Completed,
    /// The deadline passed before admission.
    Cancelled,
    /// Refused without waiting: the resource is unknown or deleted.
    Declined(DeclineReason),
}

/// A request paired with its terminal outcome, produced by its worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestOutcome {
    /// The request as dispatched.
    pub request: Request,
    /// How it ended.
    pub outcome: Outcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request() {
        let line = parse_line("7 2 WRITE 1.5").unwrap().unwrap();
        assert_eq!(
            line,
            Line::Request(Request {
                seq: 0,
                user_id: 7,
                resource_id: 2,
                operation: Operation::Write,
                offset: Duration::from_millis(1500),
            })
        );
    }

    #[test]
    fn test_parse_tolerates_extra_whitespace() {
        let line = parse_line("  1\t3   READ  0  ").unwrap().unwrap();
        assert!(matches!(line, Line::Request(Request { resource_id: 3, .. })));
    }

    #[test]
    fn test_parse_stop_and_blank() {
        assert_eq!(parse_line("STOP").unwrap(), Some(Line::Stop));
        assert_eq!(parse_line("STOP now please").unwrap(), Some(Line::Stop));
        assert_eq!(parse_line("   ").unwrap(), None);
    }

    #[test]
    fn test_out_of_range_resource_still_parses() {
        let line = parse_line("1 -4 READ 0").unwrap().unwrap();
        assert!(matches!(line, Line::Request(Request { resource_id: -4, .. })));
    }

    #[test]
    fn test_offset_up_to_horizon_accepted() {
        let line = format!("1 2 READ {}", HORIZON.as_secs());
        let parsed = parse_line(&line).unwrap().unwrap();
        assert!(matches!(parsed, Line::Request(Request { offset, .. }) if offset == HORIZON));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in [
            "1 2 READ",
            "1 2 READ 0 extra",
            "x 2 READ 0",
            "1 y READ 0",
            "1 2 APPEND 0",
            "1 2 READ soon",
            "1 2 READ -1",
            "1 2 READ inf",
            "1 2 READ 1e19",
            "1 2 READ 1e300",
        ] {
            assert!(
                matches!(parse_line(bad), Err(BrokerError::Parse { .. })),
                "accepted `{bad}`"
            );
        }
    }
}
