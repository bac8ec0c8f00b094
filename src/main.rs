// src/main.rs

use dotenvy::dotenv;
use mocktest_backend::config::Config;
use mocktest_backend::routes;
use mocktest_backend::services::{
    ai::{DisabledGenerator, GenerationParams, OpenAiGenerator, TextGenerator},
    analysis::AnalysisService,
    cache::LocalQuestionCache,
    questions::QuestionService,
    store::PgQuestionStore,
};
use mocktest_backend::state::AppState;
use mocktest_backend::utils::hash::hash_password;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DB_CONNECT_RETRIES: u32 = 5;

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let mut config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Admin credentials never live in memory as plain text
    if let Ok(password) = std::env::var("ADMIN_PASSWORD") {
        match hash_password(&password) {
            Ok(hash) => config.admin_password_hash = Some(hash),
            Err(e) => tracing::error!("Failed to hash admin password, login disabled: {:?}", e),
        }
    }
    if config.admin_username.is_none() || config.admin_password_hash.is_none() {
        tracing::warn!("ADMIN_USERNAME/ADMIN_PASSWORD not set, admin endpoints are unreachable");
    }

    let pool = connect_pool(&config).await;

    let store = PgQuestionStore::new(pool.clone(), config.store_query_timeout);
    let cache = LocalQuestionCache::new(&config.question_cache_path);
    let questions = QuestionService::new(Arc::new(store), cache);

    let generator: Arc<dyn TextGenerator> = match &config.ai.api_key {
        Some(key) => {
            tracing::info!("AI enrichment enabled with model {}", config.ai.model);
            Arc::new(OpenAiGenerator::new(
                reqwest::Client::new(),
                &config.ai,
                key.clone(),
            ))
        }
        None => {
            tracing::warn!("AI_API_KEY not set, analysis will use template feedback only");
            Arc::new(DisabledGenerator)
        }
    };
    let params = GenerationParams {
        temperature: config.ai.temperature,
        max_tokens: config.ai.max_tokens,
    };
    let analysis = AnalysisService::new(generator, params, config.ai.timeout);

    // Create AppState
    let state = AppState {
        pool,
        config: config.clone(),
        questions,
        analysis,
    };

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listening address");

    // Start the server
    axum::serve(listener, app).await.expect("Server error");
}

/// Connects to PostgreSQL with retries and runs migrations.
///
/// When the database stays unreachable the server still starts on a lazy
/// pool; question requests then fall back to the cache and built-in samples.
async fn connect_pool(config: &Config) -> PgPool {
    let options = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3));

    let mut retry_count = 0;
    loop {
        match options.clone().connect(&config.database_url).await {
            Ok(pool) => {
                tracing::info!("Database connected...");
                run_migrations(&pool).await;
                return pool;
            }
            Err(e) => {
                retry_count += 1;
                if retry_count > DB_CONNECT_RETRIES {
                    tracing::error!(
                        "Failed to connect to database after {} retries: {}",
                        DB_CONNECT_RETRIES,
                        e
                    );
                    break;
                }
                tracing::warn!("Database not ready, retrying in 2s... (Attempt {})", retry_count);
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    }

    match options.connect_lazy(&config.database_url) {
        Ok(pool) => {
            tracing::warn!("Starting without a database, migrations skipped");
            pool
        }
        Err(e) => panic!("Invalid DATABASE_URL: {}", e),
    }
}

async fn run_migrations(pool: &PgPool) {
    tracing::info!("Running migrations...");
    match sqlx::migrate!("./migrations").run(pool).await {
        Ok(()) => tracing::info!("Migrations applied successfully."),
        Err(e) => tracing::error!("Failed to run database migrations: {:?}", e),
    }
}
