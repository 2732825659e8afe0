use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::{header, HeaderMap};
use serde_json::Value;

use crate::server::data_models::SimilarityRequest;
use crate::server::ServerError;

/// The body of a similarity request.
///
/// Only JSON objects carry sentences. A request without a JSON content type, an
/// empty body, or a JSON value that isn't an object yields an empty request,
/// which validation then rejects as missing sentences. Bodies that aren't valid
/// JSON, or objects whose fields aren't strings, are malformed.
#[derive(Debug)]
pub struct SimilarityPayload(pub SimilarityRequest);

#[async_trait]
impl<S> FromRequest<S> for SimilarityPayload
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !has_json_content_type(req.headers()) {
            return Ok(Self(SimilarityRequest::default()));
        }

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ServerError::MalformedBody(rejection.body_text()))?;

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(SimilarityRequest::default()));
        }

        let value: Value = serde_json::from_slice(&body).map_err(|err| {
            ServerError::MalformedBody(format!(
                "Failed to parse the request body as JSON: {err}"
            ))
        })?;

        match value {
            Value::Object(_) => serde_json::from_value(value).map(Self).map_err(|err| {
                ServerError::MalformedBody(format!(
                    "Failed to deserialize the JSON body into the target type: {err}"
                ))
            }),
            _ => Ok(Self(SimilarityRequest::default())),
        }
    }
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return false;
    };

    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}
