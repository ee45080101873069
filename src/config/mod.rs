//! Configuration models for the broker.

pub mod broker;

pub use broker::{read_header, BrokerConfig, HEADER_FIELDS};
