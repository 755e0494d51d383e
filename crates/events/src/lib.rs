//! Site event bus and outbound notification channels.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`SiteEvent`]: the event envelope published by request handlers.
//! - [`delivery`]: external delivery channels (WhatsApp via CallMeBot).

pub mod bus;
pub mod delivery;

pub use bus::{EventBus, SiteEvent};
pub use delivery::whatsapp::{WhatsAppConfig, WhatsAppDelivery};
