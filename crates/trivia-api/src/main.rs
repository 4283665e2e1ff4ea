//! Trivia quiz API server entry point.

use std::sync::{Arc, Mutex};

use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use trivia_core::clock::{Clock, SystemClock};
use trivia_core::rng::{DeterministicRng, SystemRng};
use trivia_opentdb::OpenTdbClient;
use trivia_quiz::application::question_source::QuestionSource;
use trivia_store::PgDocumentRepository;

use trivia_api::config::Config;
use trivia_api::error::AppError;
use trivia_api::routes;
use trivia_api::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting trivia quiz API server");

    let config = Config::from_env()?;

    // Create database connection pool and bring the schema up to date.
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(config.db_acquire_timeout)
        .connect(&config.database_url)
        .await?;
    trivia_store::MIGRATOR
        .run(&pool)
        .await
        .map_err(sqlx::Error::from)?;

    // Build application state.
    let provider = OpenTdbClient::new(config.question_bank.clone())
        .map_err(|e| AppError::Config(format!("cannot build question bank client: {e}")))?;
    let questions = QuestionSource::new(Arc::new(provider))
        .with_options(config.fetch_options)
        .with_max_fetch_attempts(config.max_fetch_attempts);
    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(SystemClock);
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(SystemRng::new()));
    let app_state = AppState::new(
        clock,
        rng,
        Arc::new(PgDocumentRepository::new(pool)),
        Arc::new(questions),
    );

    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = routes::router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server.
    let addr = config.bind_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
