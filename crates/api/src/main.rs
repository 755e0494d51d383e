use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use agency_api::auth::google::{GoogleClient, IdentityProvider};
use agency_api::background::monthly_reports;
use agency_api::config::ServerConfig;
use agency_api::notifications::WhatsAppNotifier;
use agency_api::router::build_app_router;
use agency_api::state::AppState;
use agency_checkout::{CheckoutProvider, WhopClient};
use agency_events::{EventBus, WhatsAppDelivery};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agency_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };
    tracing::info!(
        host = %config.host,
        port = %config.port,
        google = config.google.is_some(),
        whop = config.whop.is_some(),
        whatsapp = config.whatsapp.is_some(),
        "Loaded server configuration"
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = agency_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    agency_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    agency_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Integrations ---
    let checkout: Option<Arc<dyn CheckoutProvider>> = match &config.whop {
        Some(whop) => Some(Arc::new(
            WhopClient::new(whop).expect("Failed to build Whop client"),
        )),
        None => {
            tracing::warn!("WHOP_API_KEY not set, checkout disabled");
            None
        }
    };
    let identity: Option<Arc<dyn IdentityProvider>> = match &config.google {
        Some(google) => Some(Arc::new(
            GoogleClient::new(google.clone()).expect("Failed to build Google client"),
        )),
        None => {
            tracing::warn!("Google OAuth not configured, sign-in disabled");
            None
        }
    };

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());

    let notifier_handle = match &config.whatsapp {
        Some(whatsapp) => {
            let delivery =
                WhatsAppDelivery::new(whatsapp.clone()).expect("Failed to build WhatsApp client");
            Some(tokio::spawn(
                WhatsAppNotifier::new(delivery).run(event_bus.subscribe()),
            ))
        }
        None => {
            tracing::warn!("CallMeBot not configured, WhatsApp notifications disabled");
            None
        }
    };

    // --- Background jobs ---
    let report_cancel = CancellationToken::new();
    let report_handle = tokio::spawn(monthly_reports::run(
        pool.clone(),
        Duration::from_secs(config.monthly_report_interval_secs),
        report_cancel.clone(),
    ));

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
        checkout,
        identity,
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    report_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), report_handle).await;
    tracing::info!("Monthly report job stopped");

    // The notifier exits once the last bus sender is gone. The router (and
    // with it the state's clone) was dropped when `serve` returned.
    drop(event_bus);
    if let Some(handle) = notifier_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        tracing::info!("WhatsApp notifier stopped");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
