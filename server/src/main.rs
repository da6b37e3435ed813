use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use api::auth::{GoogleOAuth, OAuthConfig, TokenKeys};
use api::mail::{HttpMailer, LogMailer, Mailer};
use api::{create_router, AppState};
use store::{MemoryStore, PgStore, Store};

mod settings;

use settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let settings = Settings::new().context("Failed to load settings")?;

    let store: Arc<dyn Store> = if settings.database.url.is_empty() {
        warn!("No database configured, notes will not survive restarts");
        Arc::new(MemoryStore::new())
    } else {
        let store = PgStore::connect(&settings.database.url)
            .await
            .context("Failed to connect to the database")?;
        store.migrate().await.context("Failed to run migrations")?;
        Arc::new(store)
    };

    let mailer: Arc<dyn Mailer> = if settings.mail.endpoint.is_empty() {
        warn!("No mail endpoint configured, verification links are logged only");
        Arc::new(LogMailer)
    } else {
        Arc::new(HttpMailer::new(
            settings.mail.endpoint.clone(),
            settings.mail.key.clone(),
            settings.mail.sender.clone(),
        ))
    };

    let google = if settings.google.id.is_empty() {
        warn!("Google OAuth is not configured");
        None
    } else {
        let config = OAuthConfig::google(
            settings.google.id.clone(),
            settings.google.secret.clone(),
            settings.google_redirect(),
        )
        .map_err(anyhow::Error::msg)
        .context("Invalid Google OAuth configuration")?;
        Some(GoogleOAuth::new(config))
    };

    let state = AppState::new(
        store,
        TokenKeys::new(&settings.auth.secret),
        mailer,
        google,
        settings.server.url.clone(),
        settings.server.frontend.clone(),
    );
    let app = create_router(state);

    let address = format!("0.0.0.0:{}", settings.server.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        signal(SignalKind::terminate())
            .expect("Failed to install terminate signal handler")
            .recv()
            .await;
        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
