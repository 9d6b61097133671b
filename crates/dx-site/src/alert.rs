//! Failure and status notifications.

use std::error::Error;

/// Receives notable events from the site: failed refreshes, ignored
/// snapshots and completed rebuilds.
///
/// Notifications are fire-and-forget; implementations must not block for long.
pub trait Alerter: Send + Sync {
    /// Something failed but the site keeps serving.
    fn error(&self, event: &str, error: &dyn Error);

    /// Informational event.
    fn info(&self, event: &str);
}

/// Alerter that writes to the `tracing` log.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingAlerter;

impl Alerter for TracingAlerter {
    fn error(&self, event: &str, error: &dyn Error) {
        tracing::error!(error = %error, "{event}");
    }

    fn info(&self, event: &str) {
        tracing::info!("{event}");
    }
}
