use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::info;

use super::{EnhanceError, EnhanceEvent};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EnhanceRequest {
    pub prompt: String,
}

/// POST /api/v1/enhance
/// Streams reconciled enhancement deltas back to the client as SSE.
/// Each event is a JSON object: `{"delta": ...}` while streaming, then
/// `{"done": true, "text": ...}` or `{"error": ...}`, then a `[DONE]` frame.
pub async fn handle_enhance(
    State(state): State<AppState>,
    Json(request): Json<EnhanceRequest>,
) -> Result<Sse<ReceiverStream<Result<Event, std::convert::Infallible>>>, AppError> {
    if request.prompt.trim().is_empty() {
        return Err(AppError::Validation("prompt must not be empty".to_string()));
    }

    // Connect before committing to an SSE response so connection failures
    // surface as proper HTTP errors instead of an empty stream.
    let response = state
        .enhancer
        .open_stream(&request.prompt)
        .await
        .map_err(|e| match e {
            EnhanceError::Http(e) => AppError::Http(e),
            other => AppError::Upstream(other.to_string()),
        })?;

    info!("Enhance stream opened ({} prompt chars)", request.prompt.len());

    let (event_tx, event_rx) = mpsc::channel::<EnhanceEvent>(64);
    tokio::spawn(super::EnhanceClient::pump_stream(response, event_tx));

    let (sse_tx, sse_rx) = mpsc::channel::<Result<Event, std::convert::Infallible>>(64);
    tokio::spawn(forward_events(event_rx, sse_tx));

    Ok(Sse::new(ReceiverStream::new(sse_rx)).keep_alive(KeepAlive::default()))
}

/// Translates reconciled events into the wire frames the web client expects.
async fn forward_events(
    mut events: mpsc::Receiver<EnhanceEvent>,
    tx: mpsc::Sender<Result<Event, std::convert::Infallible>>,
) {
    while let Some(event) = events.recv().await {
        let frame = match &event {
            EnhanceEvent::Delta(delta) => json!({ "delta": delta }).to_string(),
            EnhanceEvent::Done(text) => json!({ "done": true, "text": text }).to_string(),
            EnhanceEvent::Error(message) => json!({ "error": message }).to_string(),
        };
        if tx.send(Ok(Event::default().data(frame))).await.is_err() {
            return; // client disconnected
        }
        if matches!(event, EnhanceEvent::Done(_) | EnhanceEvent::Error(_)) {
            let _ = tx.send(Ok(Event::default().data("[DONE]"))).await;
            return;
        }
    }
}
