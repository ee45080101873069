//! Runtime adapters: request dispatch on tokio.

pub mod dispatcher;

pub use dispatcher::{Dispatcher, RunReport};
