use std::sync::Arc;

use agency_checkout::CheckoutProvider;
use agency_events::EventBus;

use crate::auth::google::IdentityProvider;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: agency_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Centralized event bus for publishing site events.
    pub event_bus: Arc<EventBus>,
    /// Hosted checkout; `None` when Whop is not configured.
    pub checkout: Option<Arc<dyn CheckoutProvider>>,
    /// Google code exchange; `None` when OAuth is not configured.
    pub identity: Option<Arc<dyn IdentityProvider>>,
}
