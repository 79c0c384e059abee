use std::convert::Infallible;

use axum::{
    extract::{Query, State, rejection::QueryRejection},
    http::HeaderValue,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures_util::stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::cache::{TWIST_STATUS_HEADER, TwistStatus};
use crate::gateway::error::GatewayError;
use crate::gateway::payload::StreamQuery;
use crate::gateway::state::HandlerState;
use crate::prediction::{PredictRequest, PredictionEvent};

/// Streams a prediction as server-sent events, one per pipeline step.
///
/// Each event is named after its status and carries the JSON event as data.
/// Streams bypass the response cache. A client disconnect drops the receiver,
/// which stops the pipeline.
#[instrument(skip(state, query), fields(stream_id = tracing::field::Empty))]
pub async fn stream_predict_handler(
    State(state): State<HandlerState>,
    query: Result<Query<StreamQuery>, QueryRejection>,
) -> Result<Response, GatewayError> {
    let Query(query) = query.map_err(|e| GatewayError::InvalidRequest(e.body_text()))?;
    let request = PredictRequest::from(query).validate()?;

    let stream_id = Uuid::new_v4();
    tracing::Span::current().record("stream_id", tracing::field::display(&stream_id));
    debug!("Opening prediction stream");

    let events = ReceiverStream::new(state.service.predict_streaming(request))
        .enumerate()
        .map(move |(seq, event)| Ok::<_, Infallible>(to_sse_event(stream_id, seq, &event)));

    let mut response = Sse::new(events)
        .keep_alive(KeepAlive::default())
        .into_response();
    response.headers_mut().insert(
        TWIST_STATUS_HEADER,
        HeaderValue::from_static(TwistStatus::Fresh.as_header_value()),
    );
    Ok(response)
}

fn to_sse_event(stream_id: Uuid, seq: usize, event: &PredictionEvent) -> Event {
    let base = Event::default()
        .event(event.name())
        .id(format!("{stream_id}-{seq}"));
    match base.json_data(event) {
        Ok(sse) => sse,
        Err(e) => {
            warn!(error = %e, "Failed to serialize prediction event");
            Event::default()
                .event("failed")
                .id(format!("{stream_id}-{seq}"))
                .data(r#"{"status":"failed","message":"event serialization failed"}"#)
        }
    }
}
