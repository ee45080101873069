//! Broker configuration: operation durations, resource set, limits, timeout.
//!
//! Read once at startup and immutable thereafter. The usual source is the
//! positional header at the top of the input stream:
//!
//! ```text
//! <read_secs> <write_secs> <delete_secs>
//! <resource_count> <concurrency_limit> <timeout_secs>
//! ```
//!
//! The six integers may be spread over any number of lines.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, Lines};

use crate::core::access::Operation;
use crate::core::BrokerError;

/// Number of positional integers in the startup header.
pub const HEADER_FIELDS: usize = 6;

/// Process-wide broker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Seconds a READ window stays open.
    pub read_secs: u64,
    /// Seconds a WRITE window stays open.
    pub write_secs: u64,
    /// Seconds a DELETE takes after admission.
    pub delete_secs: u64,
    /// Number of resources, addressed `1..=resource_count`.
    pub resource_count: u32,
    /// Maximum concurrent holders per resource.
    pub concurrency_limit: u32,
    /// Admission timeout in seconds, measured from a request's scheduled offset.
    pub timeout_secs: u64,
}

impl BrokerConfig {
    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Describes the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.resource_count == 0 {
            return Err("resource_count must be greater than 0".into());
        }
        if self.concurrency_limit == 0 {
            return Err("concurrency_limit must be greater than 0".into());
        }
        Ok(())
    }

    /// Build from the six positional header tokens and validate.
    ///
    /// # Errors
    ///
    /// `BrokerError::Config` on a wrong token count, a token that is not a
    /// non-negative integer, or a failed validation.
    pub fn from_tokens(tokens: &[&str]) -> Result<Self, BrokerError> {
        const NAMES: [&str; HEADER_FIELDS] = [
            "read duration",
            "write duration",
            "delete duration",
            "resource count",
            "concurrency limit",
            "timeout",
        ];
        if tokens.len() != HEADER_FIELDS {
            return Err(BrokerError::Config(format!(
                "expected {HEADER_FIELDS} header values, found {}",
                tokens.len()
            )));
        }
        let mut values = [0u64; HEADER_FIELDS];
        for ((slot, token), name) in values.iter_mut().zip(tokens).zip(NAMES) {
            *slot = token
                .parse::<u64>()
                .map_err(|e| BrokerError::Config(format!("{name} `{token}`: {e}")))?;
        }
        let narrow = |value: u64, name: &str| {
            u32::try_from(value).map_err(|_| BrokerError::Config(format!("{name} {value} is too large")))
        };
        let cfg = Self {
            read_secs: values[0],
            write_secs: values[1],
            delete_secs: values[2],
            resource_count: narrow(values[3], NAMES[3])?,
            concurrency_limit: narrow(values[4], NAMES[4])?,
            timeout_secs: values[5],
        };
        cfg.validate().map_err(BrokerError::Config)?;
        Ok(cfg)
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// `BrokerError::Config` on malformed JSON or a failed validation.
    pub fn from_json_str(input: &str) -> Result<Self, BrokerError> {
        let cfg: Self = serde_json::from_str(input)
            .map_err(|e| BrokerError::Config(format!("parse error: {e}")))?;
        cfg.validate().map_err(BrokerError::Config)?;
        Ok(cfg)
    }

    /// Admission timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// How long an admitted `op` holds its window.
    #[must_use]
    pub const fn hold_duration(&self, op: Operation) -> Duration {
        Duration::from_secs(match op {
            Operation::Read => self.read_secs,
            Operation::Write => self.write_secs,
            Operation::Delete => self.delete_secs,
        })
    }
}

/// Consume the positional header from the front of a line stream.
///
/// Reads lines until six tokens are collected. Surplus tokens on the last
/// header line are ignored.
///
/// # Errors
///
/// `BrokerError::Config` if the stream ends early or a value is invalid;
/// `BrokerError::Io` on read failure.
pub async fn read_header<R>(lines: &mut Lines<R>) -> Result<BrokerConfig, BrokerError>
where
    R: AsyncBufRead + Unpin,
{
    let mut tokens: Vec<String> = Vec::with_capacity(HEADER_FIELDS);
    while tokens.len() < HEADER_FIELDS {
        let Some(line) = lines.next_line().await? else {
            return Err(BrokerError::Config(format!(
                "input ended after {} of {HEADER_FIELDS} header values",
                tokens.len()
            )));
        };
        let mut fields = line.split_whitespace();
        tokens.extend(fields.by_ref().take(HEADER_FIELDS - tokens.len()).map(str::to_owned));
        if fields.next().is_some() {
            tracing::warn!("ignoring trailing tokens after configuration header");
        }
    }
    let refs: Vec<&str> = tokens.iter().map(String::as_str).collect();
    BrokerConfig::from_tokens(&refs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncBufReadExt;

    #[test]
    fn test_from_tokens() {
        let cfg = BrokerConfig::from_tokens(&["1", "2", "3", "4", "5", "6"]).unwrap();
        assert_eq!(cfg.hold_duration(Operation::Read), Duration::from_secs(1));
        assert_eq!(cfg.hold_duration(Operation::Write), Duration::from_secs(2));
        assert_eq!(cfg.hold_duration(Operation::Delete), Duration::from_secs(3));
        assert_eq!(cfg.resource_count, 4);
        assert_eq!(cfg.concurrency_limit, 5);
        assert_eq!(cfg.timeout(), Duration::from_secs(6));
    }

    #[test]
    fn test_from_tokens_rejects_bad_values() {
        for bad in [
            vec!["1", "2", "3", "4", "5"],
            vec!["1", "2", "x", "4", "5", "6"],
            vec!["1", "2", "3", "-4", "5", "6"],
            vec!["1", "2", "3", "0", "5", "6"],
            vec!["1", "2", "3", "4", "0", "6"],
            vec!["1", "2", "3", "99999999999", "5", "6"],
        ] {
            assert!(matches!(
                BrokerConfig::from_tokens(&bad),
                Err(BrokerError::Config(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_read_header_across_lines() {
        let input: &[u8] = b"2 3 1\n\n 4 2\n 5 trailing\n1 1 READ 0\n";
        let mut lines = input.lines();
        let cfg = read_header(&mut lines).await.unwrap();
        assert_eq!(cfg.timeout_secs, 5);
        assert_eq!(cfg.concurrency_limit, 2);
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("1 1 READ 0"));
    }

    #[tokio::test]
    async fn test_read_header_truncated() {
        let input: &[u8] = b"2 3 1\n4\n";
        let err = read_header(&mut input.lines()).await.unwrap_err();
        assert!(matches!(err, BrokerError::Config(_)));
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "read_secs": 1,
            "write_secs": 2,
            "delete_secs": 1,
            "resource_count": 3,
            "concurrency_limit": 2,
            "timeout_secs": 5
        }"#;
        let cfg = BrokerConfig::from_json_str(json).unwrap();
        assert_eq!(cfg.resource_count, 3);
        assert!(BrokerConfig::from_json_str("{}").is_err());
    }
}
