use axum::extract::MatchedPath;
use axum::http::Request;
use axum::routing::{get, post};
use axum::Router;
use clap::Args;
use sentsim::PoolingStrategy;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info_span;
use uuid::Uuid;

use crate::server::routes::{default, similarity};
use crate::server::state::ServerState;

#[derive(Debug, Clone, Args)]
pub struct ModelArgs {
    /// Hugging Face Hub model, as `repo_id[:revision]`
    #[clap(short, long, default_value = "sentence-transformers/all-MiniLM-L6-v2")]
    pub model_repo: String,

    /// Local model folder; takes precedence over `--model-repo`
    #[clap(long)]
    pub model_folder: Option<PathBuf>,

    /// Pooling strategy; read from the model's pooling config when omitted
    #[clap(long, value_enum)]
    pub pooling: Option<PoolingStrategy>,
}

pub fn init_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route(
            "/calculate-similarity",
            post(similarity::calculate_similarity),
        )
        .route("/health", get(default::health_check))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                // Log the matched route's path (with placeholders not filled in).
                let matched_path = request
                    .extensions()
                    .get::<MatchedPath>()
                    .map(MatchedPath::as_str);

                info_span!(
                    "http_request",
                    method = ?request.method(),
                    matched_path,
                    request_id = %Uuid::new_v4(),
                )
            }),
        )
}
