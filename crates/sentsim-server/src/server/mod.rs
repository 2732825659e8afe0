mod extract;
mod init;
pub mod data_models;
pub mod provider;
pub mod routes;
pub mod state;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use extract::SimilarityPayload;
pub use init::{init_router, ModelArgs};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::server::data_models::ErrorResponse;

/// Message returned for every internal failure; details stay in the server log.
pub const INTERNAL_ERROR_MESSAGE: &str = "An error occurred while calculating similarity";

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Both sentences are required")]
    InvalidRequest,

    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("Model unavailable: {0:#}")]
    ModelUnavailable(anyhow::Error),

    #[error("Inference error: {0:#}")]
    Inference(anyhow::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            ServerError::InvalidRequest => {
                tracing::debug!("Rejected request: {self}");
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            ServerError::MalformedBody(message) => {
                tracing::debug!("Rejected request: {self}");
                (StatusCode::BAD_REQUEST, message.clone())
            }
            ServerError::ModelUnavailable(_) | ServerError::Inference(_) => {
                tracing::error!("Error calculating similarity: {self}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_MESSAGE.to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}
