//! Outbound notifications.
//!
//! Delivery is fire-and-forget: a failed publish is logged and never reaches the operation
//! that raised the event.

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::domain::events::{DomainEvent, OrderEvent, UserEvent};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl Notification {
    pub fn from_event(event: &DomainEvent) -> Self {
        match event {
            DomainEvent::User(UserEvent::Registered { username, role, .. }) => Self {
                recipient: username.clone(),
                subject: "Welcome to the supermarket".to_string(),
                body: format!("Hello {username}, your {role} account is ready."),
            },
            DomainEvent::Order(OrderEvent::Placed { order_id, username, total, line_count, .. }) => Self {
                recipient: username.clone(),
                subject: format!("Order #{order_id} confirmed"),
                body: format!("Your order #{order_id} with {line_count} item(s) totalling {total} is now Processing."),
            },
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

pub fn publish(notifier: &dyn Notifier, event: &DomainEvent) {
    tracing::debug!(event = event.name(), "publishing domain event");
    notifier.notify(Notification::from_event(event));
}

/// Writes notifications to the log. Used when no broker is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, n: Notification) {
        tracing::info!(recipient = %n.recipient, subject = %n.subject, "notification");
    }
}

/// Publishes notifications as JSON to a NATS subject.
pub struct NatsNotifier {
    client: async_nats::Client,
    subject: String,
}

impl NatsNotifier {
    pub async fn connect(url: &str, subject: impl Into<String>) -> anyhow::Result<Self> {
        let client = async_nats::connect(url).await?;
        Ok(Self { client, subject: subject.into() })
    }
}

impl Notifier for NatsNotifier {
    fn notify(&self, n: Notification) {
        let client = self.client.clone();
        let subject = self.subject.clone();
        tokio::spawn(async move {
            let payload = match serde_json::to_vec(&n) {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to encode notification");
                    return;
                }
            };
            if let Err(e) = client.publish(subject, payload.into()).await {
                tracing::warn!(error = %e, recipient = %n.recipient, "failed to publish notification");
            }
        });
    }
}

/// Keeps notifications in memory; lets embedders and tests observe what was sent.
#[derive(Debug, Default, Clone)]
pub struct MemoryNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl MemoryNotifier {
    pub fn new() -> Self { Self::default() }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, n: Notification) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(n);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::Role;
    use crate::domain::value_objects::Money;

    #[test]
    fn test_order_placed_notification() {
        let event = DomainEvent::Order(OrderEvent::Placed {
            order_id: 12, user_id: 3, username: "alice".into(), total: Money::from_major(2500), line_count: 2,
        });
        let n = Notification::from_event(&event);
        assert_eq!(n.recipient, "alice");
        assert_eq!(n.subject, "Order #12 confirmed");
        assert!(n.body.contains("₦2,500.00"));
    }

    #[test]
    fn test_memory_notifier_records() {
        let notifier = MemoryNotifier::new();
        publish(&notifier, &DomainEvent::User(UserEvent::Registered { user_id: 1, username: "bob".into(), role: Role::Admin }));
        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].body, "Hello bob, your admin account is ready.");
    }
}
