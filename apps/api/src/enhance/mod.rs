//! Enhancement client — the single point of entry for all agent-runtime
//! calls in PromptForge.
//!
//! Opens the upstream `/enhance` SSE stream with retry on transient errors,
//! then pumps decoded events through the stream core: frame decoding,
//! envelope routing, and per-stream text reconciliation. Only the reconciled
//! deltas leave this module.

use anyhow::Result;
use futures::StreamExt;
use reqwest::Client;
use serde_json::{json, Value};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub mod handlers;

use crate::stream::decoder::{SseDecoder, DONE_SENTINEL};
use crate::stream::envelope::{extract_sse_text, read_sse_event_meta};
use crate::stream::reconcile::StreamAccumulator;

const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum EnhanceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Agent error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },
}

/// One reconciled event forwarded to the client-facing SSE response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnhanceEvent {
    /// Incremental text to append.
    Delta(String),
    /// Terminal event carrying the final full text.
    Done(String),
    /// Terminal upstream failure.
    Error(String),
}

/// The agent-runtime client used by the enhancement endpoint.
#[derive(Clone)]
pub struct EnhanceClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl EnhanceClient {
    pub fn new(base_url: String, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(300))
            .build()?;
        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    /// Opens the upstream enhancement stream.
    /// Retries on 429 and 5xx with exponential backoff before the stream
    /// starts; once the body is streaming there is no retry.
    pub async fn open_stream(&self, prompt: &str) -> Result<reqwest::Response, EnhanceError> {
        let url = format!("{}/enhance", self.base_url);
        let body = json!({ "prompt": prompt });

        let mut last_error: Option<EnhanceError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Enhance connect attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .header("accept", "text/event-stream")
                .json(&body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(EnhanceError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let message = response.text().await.unwrap_or_default();
                warn!("Agent runtime returned {status}: {message}");
                last_error = Some(EnhanceError::Api {
                    status: status.as_u16(),
                    message,
                });
                continue;
            }

            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(EnhanceError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            return Ok(response);
        }

        Err(last_error.unwrap_or(EnhanceError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }

    /// Consumes the upstream SSE body and sends reconciled [`EnhanceEvent`]s
    /// into `tx`. Always terminates with `Done` or `Error`. A closed receiver
    /// (client went away) stops the pump.
    pub async fn pump_stream(response: reqwest::Response, tx: mpsc::Sender<EnhanceEvent>) {
        let mut body = response.bytes_stream();
        let mut decoder = SseDecoder::new();
        let mut accumulator = StreamAccumulator::new();
        let mut events_seen = 0usize;

        while let Some(chunk) = body.next().await {
            let chunk = match chunk {
                Ok(c) => c,
                Err(e) => {
                    warn!("Upstream body error after {events_seen} events: {e}");
                    let _ = tx.send(EnhanceEvent::Error(e.to_string())).await;
                    return;
                }
            };

            for payload in decoder.push_chunk(&chunk) {
                if payload == DONE_SENTINEL {
                    let text = accumulator.last_text().unwrap_or_default();
                    info!("Enhance stream complete: {events_seen} events, {} chars", text.len());
                    let _ = tx.send(EnhanceEvent::Done(text.to_string())).await;
                    return;
                }
                events_seen += 1;
                if !apply_event(&payload, &mut accumulator, &tx).await {
                    return;
                }
            }
        }

        // Upstream closed without a [DONE]; flush whatever is buffered and
        // finish with the text we have.
        for payload in decoder.finish() {
            if payload == DONE_SENTINEL {
                break;
            }
            events_seen += 1;
            if !apply_event(&payload, &mut accumulator, &tx).await {
                return;
            }
        }
        let text = accumulator.last_text().unwrap_or_default();
        info!("Enhance stream closed without [DONE] after {events_seen} events");
        let _ = tx.send(EnhanceEvent::Done(text.to_string())).await;
    }
}

/// Routes one decoded payload. Returns `false` when the stream is finished
/// (terminal failure or a gone receiver).
async fn apply_event(
    payload: &str,
    accumulator: &mut StreamAccumulator,
    tx: &mpsc::Sender<EnhanceEvent>,
) -> bool {
    let envelope: Value = match serde_json::from_str(payload) {
        Ok(v) => v,
        Err(e) => {
            // Unparseable lines are dropped, never fatal.
            debug!("Skipping malformed SSE payload: {e}");
            return true;
        }
    };

    if let Some(message) = failure_message(&envelope) {
        warn!("Upstream turn failed: {message}");
        let _ = tx.send(EnhanceEvent::Error(message)).await;
        return false;
    }

    let meta = read_sse_event_meta(&envelope);
    let item = match envelope.get("item") {
        Some(item) => item.clone(),
        // Legacy chat-completions envelopes bury the delta in `choices`;
        // lift it into item shape so the reconciler sees it.
        None if envelope.get("choices").is_some() => json!({ "delta": extract_sse_text(&envelope) }),
        None => envelope.clone(),
    };

    let delta = accumulator.apply(&meta, &item);

    if delta.is_empty() {
        return true;
    }
    tx.send(EnhanceEvent::Delta(delta)).await.is_ok()
}

/// Terminal-failure envelopes across protocol generations.
fn failure_message(envelope: &Value) -> Option<String> {
    let tag = envelope
        .get("event")
        .and_then(|v| v.as_str())
        .or_else(|| envelope.get("type").and_then(|v| v.as_str()))?;
    if !matches!(tag, "error" | "turn.failed" | "response.failed" | "response.error") {
        return None;
    }
    let message = envelope
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(|v| v.as_str())
        .or_else(|| envelope.get("message").and_then(|v| v.as_str()))
        .unwrap_or("enhancement stream failed");
    Some(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn run_payloads(payloads: &[&str]) -> (Vec<EnhanceEvent>, StreamAccumulator) {
        let (tx, mut rx) = mpsc::channel(16);
        let mut accumulator = StreamAccumulator::new();
        for payload in payloads {
            if !apply_event(payload, &mut accumulator, &tx).await {
                break;
            }
        }
        drop(tx);
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        (events, accumulator)
    }

    #[tokio::test]
    async fn test_delta_events_forwarded_once() {
        let (events, _) = run_payloads(&[
            r#"{"event":"item/agent_message/delta","turn_id":"t","delta":"hel"}"#,
            r#"{"event":"item/agent_message/delta","turn_id":"t","delta":"lo"}"#,
            // duplicate delivery of the last delta
            r#"{"event":"item/agent_message/delta","turn_id":"t","delta":"lo"}"#,
        ])
        .await;
        assert_eq!(
            events,
            vec![
                EnhanceEvent::Delta("hel".to_string()),
                EnhanceEvent::Delta("lo".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_completed_snapshot_emits_only_new_suffix() {
        let (events, _) = run_payloads(&[
            r#"{"event":"item/agent_message/delta","turn_id":"t","delta":"hello"}"#,
            r#"{"event":"item/completed","turn_id":"t","item":{"text":"hello world"}}"#,
        ])
        .await;
        assert_eq!(
            events,
            vec![
                EnhanceEvent::Delta("hello".to_string()),
                EnhanceEvent::Delta(" world".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_legacy_choices_envelope_flows() {
        let (events, _) =
            run_payloads(&[r#"{"choices":[{"delta":{"content":"chat delta"}}]}"#]).await;
        assert_eq!(events, vec![EnhanceEvent::Delta("chat delta".to_string())]);
    }

    #[tokio::test]
    async fn test_malformed_payload_skipped() {
        let (events, _) = run_payloads(&[
            "not json at all",
            r#"{"event":"item/agent_message/delta","delta":"ok"}"#,
        ])
        .await;
        assert_eq!(events, vec![EnhanceEvent::Delta("ok".to_string())]);
    }

    #[tokio::test]
    async fn test_final_text_unaffected_by_trailing_lifecycle_event() {
        // A textless turn.completed-style event after the last delta carries
        // no ids; the final text must still come from the stream that wrote.
        let (events, accumulator) = run_payloads(&[
            r#"{"event":"item/agent_message/delta","turn_id":"t","delta":"hello"}"#,
            r#"{"event":"turn.completed"}"#,
        ])
        .await;
        assert_eq!(events, vec![EnhanceEvent::Delta("hello".to_string())]);
        assert_eq!(accumulator.last_text(), Some("hello"));
    }

    #[tokio::test]
    async fn test_turn_failure_terminates() {
        let (events, _) = run_payloads(&[
            r#"{"event":"item/agent_message/delta","delta":"partial"}"#,
            r#"{"type":"turn.failed","error":{"message":"quota exceeded"}}"#,
            r#"{"event":"item/agent_message/delta","delta":"never seen"}"#,
        ])
        .await;
        assert_eq!(
            events,
            vec![
                EnhanceEvent::Delta("partial".to_string()),
                EnhanceEvent::Error("quota exceeded".to_string()),
            ]
        );
    }
}
