//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! Handlers publish [`SiteEvent`]s after a write succeeds; background
//! subscribers (notifications) react to them without blocking the request.

use agency_core::types::{DbId, Timestamp};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

pub const QUOTE_SUBMITTED: &str = "quote.submitted";
pub const PAYMENT_CODE_REDEEMED: &str = "payment_code.redeemed";
pub const SUBSCRIPTION_ACTIVATED: &str = "subscription.activated";
pub const SUBSCRIPTION_CANCELED: &str = "subscription.canceled";

// ---------------------------------------------------------------------------
// SiteEvent
// ---------------------------------------------------------------------------

/// Something that happened on the site.
///
/// Built with [`SiteEvent::new`] and the `with_*` builder methods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteEvent {
    /// Dot-separated event name, e.g. `"quote.submitted"`.
    pub event_type: String,
    pub source_entity_type: Option<String>,
    pub source_entity_id: Option<DbId>,
    /// User that triggered the event, when signed in.
    pub actor_user_id: Option<DbId>,
    /// Human-readable text for notification channels.
    pub message: Option<String>,
    pub payload: serde_json::Value,
    pub timestamp: Timestamp,
}

impl SiteEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            source_entity_type: None,
            source_entity_id: None,
            actor_user_id: None,
            message: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_source(mut self, entity_type: impl Into<String>, entity_id: DbId) -> Self {
        self.source_entity_type = Some(entity_type.into());
        self.source_entity_id = Some(entity_id);
        self
    }

    /// Attach the acting user, if any.
    pub fn with_actor(mut self, user_id: Option<DbId>) -> Self {
        self.actor_user_id = user_id;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

const DEFAULT_CAPACITY: usize = 256;

/// Fan-out event bus, shared as `Arc<EventBus>`.
///
/// ```rust
/// use agency_events::bus::{EventBus, SiteEvent, QUOTE_SUBMITTED};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
/// bus.publish(SiteEvent::new(QUOTE_SUBMITTED));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<SiteEvent>,
}

impl EventBus {
    /// When the buffer is full the oldest events are dropped and slow
    /// receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to all current subscribers. Dropped silently when nobody listens.
    pub fn publish(&self, event: SiteEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("Event published with no subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SiteEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
