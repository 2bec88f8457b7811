//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post},
    Extension, Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use audit::services::{IndexerClient, OpenAiReasoner, SearchRetriever};
use audit::Pipeline;

use crate::config::Config;
use crate::routes::{audit_handler, check_duration_handler, health_handler};

/// The concretely wired pipeline the server runs.
pub type AppPipeline = Pipeline<Arc<IndexerClient>, SearchRetriever, OpenAiReasoner>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<AppPipeline>,
    pub indexer: Arc<IndexerClient>,
    pub max_video_duration_secs: f64,
}

/// Build the Axum application router.
///
/// Wires the concrete capability adapters into the pipeline and mounts
/// the audit, duration-check, and health routes behind CORS + tracing.
pub fn build_app(config: &Config) -> Router {
    let indexer = Arc::new(
        IndexerClient::new(&config.indexer_url, &config.indexer_api_key)
            .with_poll_timeout(config.poll_timeout)
            .with_poll_interval(config.poll_interval),
    );

    let retriever = SearchRetriever::new(&config.rule_search_url, &config.rule_search_api_key);

    let mut reasoner = OpenAiReasoner::new(&config.openai_api_key);
    if let Some(model) = &config.openai_model {
        reasoner = reasoner.with_model(model);
    }

    let pipeline = Arc::new(
        Pipeline::new(indexer.clone(), retriever, reasoner).with_top_k(config.rule_top_k),
    );

    let state = AppState {
        pipeline,
        indexer,
        max_video_duration_secs: config.max_video_duration_secs,
    };

    router(state, &config.cors_origins)
}

/// Build the router around an already-wired state (used directly by
/// tests with mock-backed state).
pub fn router(state: AppState, cors_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/audit", post(audit_handler))
        .route("/check-duration", post(check_duration_handler))
        .route("/health", get(health_handler))
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
