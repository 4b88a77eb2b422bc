use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wizard_sync::{config::RelayConfig, relay, AppState};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wizard_sync=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting wizard sync relay");

    let config = RelayConfig::from_env();
    let app = relay::router(AppState::default());

    let listener = match tokio::net::TcpListener::bind(&config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %config.bind_addr, error = %e, "Failed to bind relay address");
            std::process::exit(1);
        }
    };
    info!(addr = %config.bind_addr, "Relay listening");

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "Relay server stopped");
        std::process::exit(1);
    }
}
