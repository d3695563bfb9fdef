use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod error;
mod tts;

use api::routes::{create_router, AppState};
use config::Config;
use tts::google::GoogleTtsClient;
use tts::{SystemClock, TtsService};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("Voice Compare Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Starting server on http://{}", addr);
    tracing::info!("Speech API: {}", config.api_base_url);
    tracing::info!("Voice cache TTL: {}s", config.voice_cache_ttl.as_secs());
    if config.api_key.is_none() {
        tracing::warn!("No GOOGLE_API_KEY or GOOGLE_API_KEY_FILE set; remote calls will likely fail");
    }

    let backend = Arc::new(GoogleTtsClient::new(
        config.api_base_url.clone(),
        config.api_key.clone(),
    )?);
    let tts = TtsService::new(backend, Arc::new(SystemClock), config.voice_cache_ttl);

    let state = Arc::new(AppState { tts });
    let app = create_router(state, &config);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
