//! HTTP gateway (Axum) over [`crate::service::TwistService`].
//!
//! Every response carries an `x-twist-status` header: `fresh`, `cached`, `healthy`,
//! or the error code of a failed request.

pub mod error;
pub mod handler;
pub mod payload;
pub mod state;
pub mod streaming;


use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::GatewayError;
pub use handler::{
    generate_story_handler, health_handler, moderate_handler, predict_twist_handler,
    semantic_score_handler,
};
pub use state::HandlerState;
pub use streaming::stream_predict_handler;

pub fn create_router_with_state(state: HandlerState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/predict-twist", post(predict_twist_handler))
        .route("/generate-story", post(generate_story_handler))
        .route("/semantic-score", post(semantic_score_handler))
        .route("/moderate", post(moderate_handler))
        .route("/stream/predict-twist", get(stream_predict_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
