//! Notification dispatch
//!
//! The communication service is fire-and-forget: events are published after
//! the owning transaction commits, and no handler's success depends on
//! delivery.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;
use tracing::info;

use core_kernel::NotificationPort;

/// Publishes events to the log stream
///
/// Stands in for the real communication collaborator; deployments swap in an
/// adapter with the same port.
#[derive(Debug, Default)]
pub struct TracingNotifier;

#[async_trait]
impl NotificationPort for TracingNotifier {
    async fn publish(&self, event_type: &'static str, payload: Value) {
        info!(event = event_type, payload = %payload, "Notification event");
    }
}

/// Captures published events for assertions in tests
#[derive(Debug, Default)]
pub struct CapturingNotifier {
    pub events: Mutex<Vec<(&'static str, Value)>>,
}

#[async_trait]
impl NotificationPort for CapturingNotifier {
    async fn publish(&self, event_type: &'static str, payload: Value) {
        if let Ok(mut events) = self.events.lock() {
            events.push((event_type, payload));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn capturing_notifier_records_events() {
        let notifier = CapturingNotifier::default();
        notifier
            .publish("invoice.paid", serde_json::json!({"invoice_id": "x"}))
            .await;

        let events = notifier.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, "invoice.paid");
    }
}
