use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::cache::TWIST_STATUS_HEADER;
use crate::prediction::PredictionError;
use crate::scoring::ScoringError;
use crate::story::GenerationError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("prediction failed: {0}")]
    Prediction(#[from] PredictionError),

    #[error("scoring failed: {0}")]
    Scoring(#[from] ScoringError),

    #[error("story generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("internal error: {0}")]
    InternalError(String),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl GatewayError {
    /// HTTP status and the `x-twist-status` value for this error.
    pub fn status(&self) -> (StatusCode, &'static str) {
        match self {
            GatewayError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
            GatewayError::Prediction(e) => {
                let status = match e {
                    PredictionError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
                    PredictionError::Model(_) | PredictionError::NoCandidates { .. } => {
                        StatusCode::BAD_GATEWAY
                    }
                    PredictionError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                    PredictionError::Cancelled => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, e.code())
            }
            GatewayError::Scoring(ScoringError::InvalidInput { .. }) => {
                (StatusCode::BAD_REQUEST, "invalid_input")
            }
            GatewayError::Scoring(ScoringError::Embedding(e)) if e.is_input_error() => {
                (StatusCode::BAD_REQUEST, "invalid_input")
            }
            GatewayError::Scoring(ScoringError::Embedding(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "embedding_error")
            }
            GatewayError::Generation(e) => {
                let status = match e {
                    GenerationError::Model(_) | GenerationError::Unparseable { .. } => {
                        StatusCode::BAD_GATEWAY
                    }
                    GenerationError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                };
                (status, e.code())
            }
            GatewayError::InternalError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, twist_status) = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, code = twist_status, "Request failed");
        } else {
            tracing::debug!(error = %self, code = twist_status, "Request rejected");
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            TWIST_STATUS_HEADER,
            HeaderValue::from_str(twist_status).unwrap_or(HeaderValue::from_static("error")),
        );

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}
