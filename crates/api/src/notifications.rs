//! Forwards site events to the owner's WhatsApp.
//!
//! [`WhatsAppNotifier`] subscribes to the event bus and sends the message of
//! every forwarded event type. Delivery failures are logged and never reach
//! the request that published the event.

use agency_events::bus::{PAYMENT_CODE_REDEEMED, QUOTE_SUBMITTED};
use agency_events::{SiteEvent, WhatsAppDelivery};
use tokio::sync::broadcast;

/// Event types that produce a WhatsApp message.
const FORWARDED_EVENTS: &[&str] = &[QUOTE_SUBMITTED, PAYMENT_CODE_REDEEMED];

/// The text to send for `event`, if it is forwarded and carries one.
fn outgoing_text(event: &SiteEvent) -> Option<&str> {
    if !FORWARDED_EVENTS.contains(&event.event_type.as_str()) {
        return None;
    }
    event.message.as_deref().filter(|m| !m.trim().is_empty())
}

pub struct WhatsAppNotifier {
    delivery: WhatsAppDelivery,
}

impl WhatsAppNotifier {
    pub fn new(delivery: WhatsAppDelivery) -> Self {
        Self { delivery }
    }

    /// Run until the event bus is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<SiteEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    let Some(text) = outgoing_text(&event) else {
                        continue;
                    };
                    match self.delivery.send(text).await {
                        Ok(()) => tracing::info!(
                            event_type = %event.event_type,
                            "WhatsApp notification sent"
                        ),
                        Err(e) => tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "WhatsApp notification dropped"
                        ),
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "WhatsApp notifier lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, WhatsApp notifier shutting down");
                    break;
                }
            }
        }
    }
}
