use std::{net::SocketAddr, sync::Arc};
use student_hub::insight::GeminiClient;
use student_hub::sync::SyncClient;
use student_hub::{load_settings, router, AppConfig, AppState};
use tokio::fs;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = AppConfig::from_env();
    if let Some(parent) = config.settings_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let settings = load_settings(&config.settings_path).await;
    match settings.endpoint() {
        Some(url) => info!("syncing with sheet endpoint {url}"),
        None => info!("no sheet endpoint configured; records stay local"),
    }
    if config.gemini_api_key.is_none() {
        info!("no API key set; AI insights will report an error");
    }

    let http = reqwest::Client::new();
    let generator = GeminiClient::new(
        http.clone(),
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
        config.gemini_base_url.clone(),
    );
    let state = AppState::new(
        config.settings_path.clone(),
        settings,
        SyncClient::new(http),
        Arc::new(generator),
        config.reconcile_delay,
    )
    .with_display_offset(config.display_offset);
    state.trigger_refresh().await;

    let app = router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
