use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use crate::server::state::ServerState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    model_loaded: bool,
}

pub async fn health_check(State(server_state): State<Arc<ServerState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model_loaded: server_state.provider.is_loaded(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::testing::BagOfWordsEmbedder;
    use crate::server::testing::provider_with;

    #[tokio::test]
    async fn test_health_reports_model_state() -> anyhow::Result<()> {
        let provider = provider_with(BagOfWordsEmbedder);
        let server_state = Arc::new(ServerState::new(provider.clone()));

        let Json(health) = health_check(State(server_state.clone())).await;
        assert_eq!(health.status, "ok");
        assert!(!health.model_loaded);

        provider.ensure_loaded().await?;
        let Json(health) = health_check(State(server_state)).await;
        assert!(health.model_loaded);
        Ok(())
    }
}
