//! Hosted checkout integration.
//!
//! - [`CheckoutProvider`]: the seam the API talks to when it needs a
//!   checkout URL; [`WhopClient`] is the production implementation.
//! - [`webhook`]: signature verification and parsing of provider callbacks
//!   into [`webhook::WebhookAction`]s.

pub mod provider;
pub mod webhook;
pub mod whop;

pub use provider::{CheckoutError, CheckoutProvider, CheckoutRequest, CheckoutSession};
pub use whop::{WhopClient, WhopConfig};
