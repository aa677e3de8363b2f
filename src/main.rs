use std::sync::{Arc, Mutex};

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use bookline::config::AppConfig;
use bookline::db;
use bookline::handlers;
use bookline::services::ai::gemini::GeminiProvider;
use bookline::services::ai::ollama::OllamaProvider;
use bookline::services::ai::LlmProvider;
use bookline::services::ocr::RemoteOcrProvider;
use bookline::services::queue::TokioJobQueue;
use bookline::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;
    let db = Arc::new(Mutex::new(conn));

    let llm: Box<dyn LlmProvider> = match config.llm_provider.as_str() {
        "ollama" => {
            tracing::info!(
                "using Ollama LLM provider (url: {}, model: {})",
                config.ollama_url,
                config.ollama_model
            );
            Box::new(OllamaProvider::new(
                config.ollama_url.clone(),
                config.ollama_model.clone(),
            ))
        }
        _ => {
            anyhow::ensure!(
                !config.gemini_api_key.is_empty(),
                "GEMINI_API_KEY must be set when LLM_PROVIDER=gemini"
            );
            tracing::info!("using Gemini LLM provider (model: {})", config.gemini_model);
            Box::new(GeminiProvider::new(
                config.gemini_api_key.clone(),
                config.gemini_model.clone(),
            ))
        }
    };

    let ocr = RemoteOcrProvider::new(config.ocr_url.clone());
    let queue = TokioJobQueue::new(Arc::clone(&db));

    let state = Arc::new(AppState {
        db,
        config: config.clone(),
        llm,
        ocr: Box::new(ocr),
        queue: Box::new(queue),
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/pipeline/text", post(handlers::pipeline::text_pipeline))
        .route("/pipeline/image", post(handlers::pipeline::image_pipeline))
        .route(
            "/scheduler/schedule",
            post(handlers::scheduler::schedule_appointment),
        )
        .route("/appointments", get(handlers::scheduler::list_appointments))
        .route(
            "/appointments/:task_id",
            get(handlers::scheduler::get_appointment),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
