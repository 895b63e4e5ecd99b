//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, HttpCompletionAdapter, LibraryExtractor, OpenAiCompletionAdapter},
    config::{CompletionBackend, Config, ConfigError},
    error::ApiError,
    web::{self, rest::ApiDoc, state::{AppState, UploadTracker}},
};
use async_openai::{config::OpenAIConfig, Client};
use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use axum::Router;
use doc_summarizer_core::{ports::CompletionService, summarize::Summarizer};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize Service Adapters ---
    let completion: Arc<dyn CompletionService> = match &config.completion {
        CompletionBackend::OpenAi { api_key, model } => {
            info!(model = %model, "Using OpenAI chat completions for summaries");
            let openai_client = Client::with_config(OpenAIConfig::new().with_api_key(api_key));
            Arc::new(OpenAiCompletionAdapter::new(openai_client, model.clone()))
        }
        CompletionBackend::Http { endpoint_url, api_key } => {
            info!(endpoint = %endpoint_url, "Using HTTP completion endpoint for summaries");
            Arc::new(HttpCompletionAdapter::new(
                reqwest::Client::new(),
                endpoint_url.clone(),
                api_key.clone(),
            ))
        }
    };
    let summarizer = Summarizer::new(Arc::new(LibraryExtractor::new()), completion);

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        identity: db_adapter,
        summarizer,
        uploads: UploadTracker::new(),
        config: config.clone(),
    });

    let cors_origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ConfigError::InvalidValue("CORS_ORIGIN".to_string(), e.to_string())
    })?;
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(web::router(app_state).layer(cors))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
