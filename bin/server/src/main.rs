use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tunegate_provider::OAuth2Provider;
use tunegate_server::{
    app,
    auth::{AppState, AuthAdaptor},
    config::ServerConfig,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = ServerConfig::from_env().expect("failed to load configuration");
    tracing::info!("Loaded configuration");

    let provider = OAuth2Provider::new(&config.provider, &config.auth.callback_url)
        .expect("failed to configure provider");
    let adaptor = AuthAdaptor::new(Arc::new(provider), &config.auth)
        .expect("failed to configure auth adaptor");
    tracing::info!(
        callback = adaptor.callback_path(),
        login = adaptor.ui_redirect_path(),
        "Auth routes configured"
    );

    let app = app::router(Arc::new(AppState::new(adaptor)));

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .expect("failed to bind to address");

    tracing::info!("listening on http://{}", config.listen_addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}
