use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{info, instrument};

use crate::cache::{TWIST_STATUS_HEADER, TWIST_STATUS_HEALTHY, TwistStatus};
use crate::gateway::error::GatewayError;
use crate::gateway::payload::{ModerateRequest, PredictTwistResponse, SemanticScoreResponse};
use crate::gateway::state::HandlerState;
use crate::prediction::PredictRequest;
use crate::scoring::ScoreRequest;
use crate::story::StoryRequest;

#[instrument(skip(state, payload))]
pub async fn predict_twist_handler(
    State(state): State<HandlerState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Response, GatewayError> {
    let Json(request) = payload.map_err(invalid_body)?;
    let (prediction, status) = state.service.predict(request).await?;
    info!(
        %status,
        candidates = prediction.candidates.len(),
        degraded = prediction.degraded_retrieval,
        "Twists predicted"
    );
    Ok(make_response(
        status.as_header_value(),
        PredictTwistResponse::from(prediction.as_ref()),
    ))
}

#[instrument(skip(state, payload))]
pub async fn generate_story_handler(
    State(state): State<HandlerState>,
    payload: Result<Json<StoryRequest>, JsonRejection>,
) -> Result<Response, GatewayError> {
    let Json(request) = payload.map_err(invalid_body)?;
    let story = state.service.generate_story(request).await?;
    Ok(make_response(TwistStatus::Fresh.as_header_value(), story))
}

#[instrument(skip(state, payload))]
pub async fn semantic_score_handler(
    State(state): State<HandlerState>,
    payload: Result<Json<ScoreRequest>, JsonRejection>,
) -> Result<Response, GatewayError> {
    let Json(request) = payload.map_err(invalid_body)?;
    let (breakdown, status) = state.service.score(request).await?;
    info!(%status, score = breakdown.final_score, "Guess scored");
    Ok(make_response(
        status.as_header_value(),
        SemanticScoreResponse::from(breakdown.as_ref()),
    ))
}

#[instrument(skip(state, payload))]
pub async fn moderate_handler(
    State(state): State<HandlerState>,
    payload: Result<Json<ModerateRequest>, JsonRejection>,
) -> Result<Response, GatewayError> {
    let Json(request) = payload.map_err(invalid_body)?;
    let result = state.service.moderate(&request.text);
    Ok(make_response(TwistStatus::Fresh.as_header_value(), result))
}

#[instrument(skip(state))]
pub async fn health_handler(State(state): State<HandlerState>) -> Response {
    make_response(TWIST_STATUS_HEALTHY, state.service.health())
}

pub(crate) fn invalid_body(rejection: JsonRejection) -> GatewayError {
    GatewayError::InvalidRequest(rejection.body_text())
}

pub(crate) fn make_response<T: Serialize>(twist_status: &'static str, body: T) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(TWIST_STATUS_HEADER, HeaderValue::from_static(twist_status));
    (StatusCode::OK, headers, Json(body)).into_response()
}
