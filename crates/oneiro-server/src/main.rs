mod config;

use std::sync::Arc;

use tracing::{info, warn};

use oneiro_ai::{GeminiClient, Interpreter};
use oneiro_api::auth::{AppState, AppStateInner};
use oneiro_api::routes::router;

use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "oneiro=debug,tower_http=debug".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;

    // Init database
    let db = oneiro_db::Database::open(&config.db_path)?;

    let interpreter: Option<Arc<dyn Interpreter>> = match config.gemini {
        Some(gemini) => {
            info!(model = %gemini.model, "Dream interpretation enabled");
            let client = GeminiClient::new(gemini.api_key)
                .with_base_url(gemini.base_url)
                .with_model(gemini.model);
            Some(Arc::new(client))
        }
        None => {
            warn!("GEMINI_API_KEY not set, AI routes will answer 503");
            None
        }
    };

    let state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret: config.jwt_secret,
        interpreter,
    });

    let app = router(state);

    info!("Oneiro server listening on {}", config.bind_address);

    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
