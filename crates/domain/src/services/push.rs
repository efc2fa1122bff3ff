//! Push-notification delivery seam.
//!
//! The dispatcher only sees this trait; the FCM HTTP v1 implementation lives
//! in the API crate.

use serde_json::Value;

/// Result of a single delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// The transport accepted the message.
    Sent,
    /// The transport reported the address as permanently unregistered or
    /// invalid. The address must be invalidated so it is never used again.
    Unregistered,
    /// Transient failure (network, 5xx, timeout). The address stays valid.
    Failed(String),
}

impl PushOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, PushOutcome::Sent)
    }

    /// Whether this outcome requires the delivery address to be invalidated.
    pub fn invalidates_address(&self) -> bool {
        matches!(self, PushOutcome::Unregistered)
    }
}

/// Delivery transport contract: `deliver(token, title, body, data)`.
#[async_trait::async_trait]
pub trait PushService: Send + Sync {
    async fn deliver(&self, token: &str, title: &str, body: &str, data: Value) -> PushOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sent_does_not_invalidate() {
        assert!(PushOutcome::Sent.is_sent());
        assert!(!PushOutcome::Sent.invalidates_address());
    }

    #[test]
    fn test_unregistered_invalidates() {
        assert!(!PushOutcome::Unregistered.is_sent());
        assert!(PushOutcome::Unregistered.invalidates_address());
    }

    #[test]
    fn test_transient_failure_keeps_address() {
        let outcome = PushOutcome::Failed("timeout".into());
        assert!(!outcome.is_sent());
        assert!(!outcome.invalidates_address());
    }
}
