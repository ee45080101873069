//! What happens while an access window is held.

use std::time::Duration;

use async_trait::async_trait;

use crate::core::registry::AccessWindow;
use crate::core::request::Request;

/// Abstraction for the work performed inside an admitted access window.
///
/// The broker does not touch resource contents; the default executor simply
/// keeps the window open for the operation's configured duration. Tests plug
/// in executors that probe the registry while the window is held.
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use access_broker::core::{AccessWindow, Request, WindowExecutor};
///
/// #[derive(Clone)]
/// struct Logged;
///
/// #[async_trait]
/// impl WindowExecutor for Logged {
///     async fn hold(&self, request: &Request, window: &AccessWindow, duration: Duration) {
///         tracing::info!(user = request.user_id, op = %window.operation(), "holding");
///         tokio::time::sleep(duration).await;
///     }
/// }
/// ```
#[async_trait]
pub trait WindowExecutor: Send + Sync + Clone + 'static {
    /// Hold `window` open on behalf of `request` for `duration`.
    async fn hold(&self, request: &Request, window: &AccessWindow, duration: Duration);
}

/// Executor that holds every window for exactly its configured duration.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimedExecutor;

#[async_trait]
impl WindowExecutor for TimedExecutor {
    async fn hold(&self, _request: &Request, _window: &AccessWindow, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
