//! Shutdown signalling for the listener.

use tokio_util::sync::CancellationToken;

/// Broadcasts the stop signal to the serve task.
///
/// The listener's own `stop` and a remote DELETE both cancel the same
/// token; a triggered signal stays triggered, so each listener start uses
/// a fresh one.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    token: CancellationToken,
}

impl ShutdownSignal {
    /// A fresh, untriggered signal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The token the serve task watches.
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Triggers shutdown; idempotent.
    pub fn trigger(&self) {
        self.token.cancel();
    }

    /// Whether shutdown has been requested.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_untriggered() {
        assert!(!ShutdownSignal::new().is_triggered());
    }

    #[test]
    fn trigger_is_observable_through_clones() {
        let signal = ShutdownSignal::new();
        let clone = signal.clone();
        signal.trigger();
        assert!(clone.is_triggered());
        signal.trigger();
        assert!(signal.is_triggered());
    }

    #[tokio::test]
    async fn tokens_resolve_on_trigger() {
        let signal = ShutdownSignal::new();
        let token = signal.token();
        signal.trigger();
        token.cancelled().await;
    }
}
