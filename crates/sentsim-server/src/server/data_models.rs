use serde::{Deserialize, Serialize};

use crate::server::ServerError;

/// Body of `POST /calculate-similarity`.
///
/// Both fields are optional at the parsing level so that a missing field is
/// reported as [`ServerError::InvalidRequest`] rather than a parse failure.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SimilarityRequest {
    pub sentence1: Option<String>,
    pub sentence2: Option<String>,
}

impl SimilarityRequest {
    /// The two sentences, if both are present and non-empty.
    pub fn into_sentences(self) -> Result<[String; 2], ServerError> {
        match (self.sentence1, self.sentence2) {
            (Some(s1), Some(s2)) if !s1.is_empty() && !s2.is_empty() => Ok([s1, s2]),
            _ => Err(ServerError::InvalidRequest),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SimilarityResponse {
    pub similarity: String,
}

impl SimilarityResponse {
    pub fn from_score(score: f32) -> Self {
        Self {
            similarity: format_score(score),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

/// Four decimal digits, with negative zero printed as `0.0000`.
pub fn format_score(score: f32) -> String {
    let formatted = format!("{score:.4}");
    match formatted.strip_prefix('-') {
        Some(digits) if digits.bytes().all(|b| b == b'0' || b == b'.') => digits.to_string(),
        _ => formatted,
    }
}
