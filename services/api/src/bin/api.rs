//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{
        DbAdapter, FixedSentimentAdapter, MemoryAdapter, OfflineInsightsModel,
        OpenAiInsightsAdapter, OpenAiSentimentAdapter,
    },
    config::{AiBackend, Config},
    error::ApiError,
    web::{router, state::AppState},
};
use async_openai::{config::OpenAIConfig, Client};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wellbeing_core::insights::{JournalInsightsFlow, KeywordExtractor};
use wellbeing_core::ports::{DatabaseService, InsightsModel, SentimentClassifier};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Storage & Run Migrations ---
    let db: Arc<dyn DatabaseService> = match &config.database_url {
        Some(url) => {
            info!("Connecting to database...");
            let db_pool = PgPoolOptions::new().max_connections(5).connect(url).await?;
            let db_adapter = DbAdapter::new(db_pool);
            info!("Running database migrations...");
            db_adapter.run_migrations().await?;
            info!("Database migrations complete.");
            Arc::new(db_adapter)
        }
        None => {
            warn!("DATABASE_URL is not set; using the in-memory store. Data will not survive a restart.");
            Arc::new(MemoryAdapter::new())
        }
    };

    // --- 3. Initialize AI Adapters ---
    let (classifier, model): (Arc<dyn SentimentClassifier>, Arc<dyn InsightsModel>) =
        match config.ai_backend {
            AiBackend::OpenAi => {
                let openai_config = OpenAIConfig::new().with_api_key(
                    config
                        .openai_api_key
                        .as_ref()
                        .ok_or_else(|| ApiError::Internal("OPENAI_API_KEY is required".to_string()))?,
                );
                let openai_client = Client::with_config(openai_config);
                (
                    Arc::new(OpenAiSentimentAdapter::new(
                        openai_client.clone(),
                        config.sentiment_model.clone(),
                    )),
                    Arc::new(OpenAiInsightsAdapter::new(
                        openai_client,
                        config.insights_model.clone(),
                    )),
                )
            }
            AiBackend::Offline => {
                warn!("AI_BACKEND=offline; insights come from local stand-ins.");
                (
                    Arc::new(FixedSentimentAdapter::default()),
                    Arc::new(OfflineInsightsModel::new()),
                )
            }
        };

    let extractor = KeywordExtractor::new(classifier).with_concurrency(config.sentiment_concurrency);
    let insights = JournalInsightsFlow::new(extractor, model);

    // --- 4. Build the Shared AppState ---
    let shutdown = CancellationToken::new();
    let app_state = Arc::new(AppState {
        db,
        config: config.clone(),
        insights,
        shutdown: shutdown.clone(),
    });

    // --- 5. Create the Web Router ---
    let app = router(app_state);

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for shutdown signal: {}", e);
                return;
            }
            info!("Shutdown signal received; cancelling in-flight insights runs.");
            shutdown.cancel();
        })
        .await?;

    Ok(())
}
