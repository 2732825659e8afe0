use axum::extract::State;
use axum::Json;
use sentsim::cosine_similarity;
use std::sync::Arc;
use tokio::time::Instant;

use crate::server::data_models::SimilarityResponse;
use crate::server::state::ServerState;
use crate::server::{ServerError, SimilarityPayload};

pub async fn calculate_similarity(
    State(server_state): State<Arc<ServerState>>,
    SimilarityPayload(request): SimilarityPayload,
) -> Result<Json<SimilarityResponse>, ServerError> {
    let sentences = request.into_sentences()?;

    let start = Instant::now();
    let embeddings = server_state.provider.embed(sentences.into()).await?;

    let [first, second] = embeddings.as_slice() else {
        return Err(ServerError::Inference(anyhow::anyhow!(
            "expected 2 embeddings, got {}",
            embeddings.len()
        )));
    };
    let similarity =
        cosine_similarity(first, second).map_err(|err| ServerError::Inference(err.into()))?;

    tracing::trace!("Similarity took {} ms", start.elapsed().as_millis());

    Ok(Json(SimilarityResponse::from_score(similarity)))
}
