//! Envelope routing — pulls text payloads and correlation metadata out of the
//! loosely-shaped JSON events the agent runtime emits.
//!
//! The upstream protocol has gone through several envelope generations
//! (Codex-style `item/*` events, the Responses API `response.output_text.*`
//! shapes, and legacy chat-completions `choices`), and a live stream can mix
//! them. Every extractor here is total over arbitrary JSON: missing or
//! malformed fields degrade to `None`/`""`, never an error.

use serde_json::Value;

/// Correlation metadata projected from one event envelope.
/// Every field defaults to `None`; the caller decides how to key streams.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseEventMeta {
    pub event_type: Option<String>,
    pub response_type: Option<String>,
    pub thread_id: Option<String>,
    pub turn_id: Option<String>,
    pub item_id: Option<String>,
    pub item_type: Option<String>,
}

/// Resolves a text carrier that may be a plain string, an array of carriers,
/// or an object with `text`/`output_text`/`content` fields (in that priority
/// order). Array elements are resolved independently and concatenated; this
/// one level of nesting is all the protocol ever produces.
pub fn extract_text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(_) => extract_text_from_array(value),
        Value::Object(map) => {
            for key in ["text", "output_text", "content"] {
                let Some(field) = map.get(key) else { continue };
                if let Some(s) = field.as_str() {
                    if !s.is_empty() {
                        return Some(s.to_string());
                    }
                    continue;
                }
                if let Some(joined) = extract_text_from_array(field) {
                    return Some(joined);
                }
            }
            None
        }
        _ => None,
    }
}

fn extract_text_from_array(value: &Value) -> Option<String> {
    let entries = value.as_array()?;
    let parts: Vec<String> = entries.iter().filter_map(extract_text_value).collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.concat())
}

/// Best-available full/partial text stated by an item: `text`, `output_text`,
/// `content`, then `payload`. Returns `""` for non-object items.
pub fn extract_item_text(item: &Value) -> String {
    let Some(map) = item.as_object() else {
        return String::new();
    };
    for key in ["text", "output_text", "content", "payload"] {
        if let Some(text) = map.get(key).and_then(extract_text_value) {
            return text;
        }
    }
    String::new()
}

/// Explicit incremental delta stated by an item: `delta`, then
/// `payload.delta`. Returns `""` when neither resolves.
pub fn extract_item_delta(item: &Value) -> String {
    let Some(map) = item.as_object() else {
        return String::new();
    };
    if let Some(delta) = map.get("delta").and_then(extract_text_value) {
        return delta;
    }
    if let Some(delta) = map
        .get("payload")
        .and_then(|p| p.get("delta"))
        .and_then(extract_text_value)
    {
        return delta;
    }
    String::new()
}

/// Extracts the text payload from one event envelope, checking the known
/// envelope generations in priority order. First match wins:
///
/// 1. flat top-level `delta` string (`response.output_text.delta`, item deltas)
/// 2. nested `item` delta/text
/// 3. `payload.text` / `payload.output_text` (`item/completed`)
/// 4. top-level `text` (`response.output_text.done`)
/// 5. `choices[0].delta.content` (legacy chat-completions)
pub fn extract_sse_text(envelope: &Value) -> String {
    if let Some(delta) = envelope.get("delta").and_then(|v| v.as_str()) {
        if !delta.is_empty() {
            return delta.to_string();
        }
    }

    if let Some(item) = envelope.get("item") {
        let delta = extract_item_delta(item);
        if !delta.is_empty() {
            return delta;
        }
        let text = extract_item_text(item);
        if !text.is_empty() {
            return text;
        }
    }

    if let Some(payload) = envelope.get("payload") {
        if let Some(text) = payload.get("text").and_then(extract_text_value) {
            return text;
        }
        if let Some(text) = payload.get("output_text").and_then(extract_text_value) {
            return text;
        }
    }

    if let Some(text) = envelope.get("text").and_then(extract_text_value) {
        return text;
    }

    if let Some(content) = envelope
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|choice| choice.get("delta"))
        .and_then(|delta| delta.get("content"))
        .and_then(extract_text_value)
    {
        return content;
    }

    String::new()
}

/// Projects routing metadata from an envelope. `item_id`/`item_type` fall
/// back to the nested `item` object when the flat fields are absent.
pub fn read_sse_event_meta(envelope: &Value) -> SseEventMeta {
    let field = |key: &str| {
        envelope
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::to_string)
    };
    let item_field = |key: &str| {
        envelope
            .get("item")
            .and_then(|item| item.get(key))
            .and_then(|v| v.as_str())
            .map(str::to_string)
    };

    SseEventMeta {
        event_type: field("event"),
        response_type: field("type"),
        thread_id: field("thread_id"),
        turn_id: field("turn_id"),
        item_id: field("item_id").or_else(|| item_field("id")),
        item_type: field("item_type").or_else(|| item_field("type")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_text_value_string() {
        assert_eq!(
            extract_text_value(&json!("hello")),
            Some("hello".to_string())
        );
        assert_eq!(extract_text_value(&json!("")), None);
        assert_eq!(extract_text_value(&json!(null)), None);
        assert_eq!(extract_text_value(&json!(42)), None);
    }

    #[test]
    fn test_extract_text_value_array_concatenates() {
        let value = json!(["foo", {"text": "bar"}, null, ""]);
        assert_eq!(extract_text_value(&value), Some("foobar".to_string()));
        assert_eq!(extract_text_value(&json!([])), None);
        assert_eq!(extract_text_value(&json!([null, ""])), None);
    }

    #[test]
    fn test_extract_text_value_object_priority() {
        let value = json!({"content": "c", "output_text": "o", "text": "t"});
        assert_eq!(extract_text_value(&value), Some("t".to_string()));
        let value = json!({"content": "c", "output_text": "o"});
        assert_eq!(extract_text_value(&value), Some("o".to_string()));
        let value = json!({"content": [{"text": "nested"}]});
        assert_eq!(extract_text_value(&value), Some("nested".to_string()));
    }

    #[test]
    fn test_extract_item_text_fallback_order() {
        assert_eq!(extract_item_text(&json!({"text": "a", "payload": "b"})), "a");
        assert_eq!(extract_item_text(&json!({"payload": "b"})), "b");
        assert_eq!(extract_item_text(&json!("not an object")), "");
        assert_eq!(extract_item_text(&json!({})), "");
    }

    #[test]
    fn test_extract_item_delta() {
        assert_eq!(extract_item_delta(&json!({"delta": "d"})), "d");
        assert_eq!(
            extract_item_delta(&json!({"payload": {"delta": "pd"}})),
            "pd"
        );
        assert_eq!(extract_item_delta(&json!(null)), "");
    }

    #[test]
    fn test_extract_sse_text_codex_item_delta() {
        let envelope = json!({
            "event": "item/agent_message/delta",
            "item_id": "item_1",
            "delta": "hello",
        });
        assert_eq!(extract_sse_text(&envelope), "hello");

        let envelope = json!({
            "event": "item/agent_message/delta",
            "item": {"delta": {"text": "world"}},
        });
        assert_eq!(extract_sse_text(&envelope), "world");
    }

    #[test]
    fn test_extract_sse_text_completed_payload() {
        let envelope = json!({
            "event": "item/completed",
            "payload": {"text": "final text"},
        });
        assert_eq!(extract_sse_text(&envelope), "final text");

        let envelope = json!({
            "event": "item/completed",
            "payload": {"output_text": "output text"},
        });
        assert_eq!(extract_sse_text(&envelope), "output text");
    }

    #[test]
    fn test_extract_sse_text_legacy_shapes() {
        let envelope = json!({
            "type": "response.output_text.delta",
            "delta": "legacy delta",
        });
        assert_eq!(extract_sse_text(&envelope), "legacy delta");

        let envelope = json!({
            "type": "response.output_text.done",
            "text": "done text",
        });
        assert_eq!(extract_sse_text(&envelope), "done text");

        let envelope = json!({
            "choices": [{"delta": {"content": "chat delta"}}],
        });
        assert_eq!(extract_sse_text(&envelope), "chat delta");
    }

    #[test]
    fn test_extract_sse_text_unknown_envelope_is_empty() {
        assert_eq!(extract_sse_text(&json!({})), "");
        assert_eq!(extract_sse_text(&json!({"event": "turn.started"})), "");
        assert_eq!(extract_sse_text(&json!("bare string")), "");
    }

    #[test]
    fn test_read_sse_event_meta_defaults() {
        assert_eq!(read_sse_event_meta(&json!({})), SseEventMeta::default());
        assert_eq!(read_sse_event_meta(&json!(null)), SseEventMeta::default());
    }

    #[test]
    fn test_read_sse_event_meta_flat_fields() {
        let meta = read_sse_event_meta(&json!({
            "event": "item/agent_message/delta",
            "type": "response.output_text.delta",
            "thread_id": "thread_1",
            "turn_id": "turn_1",
            "item_id": "item_meta_1",
        }));
        assert_eq!(meta.event_type.as_deref(), Some("item/agent_message/delta"));
        assert_eq!(
            meta.response_type.as_deref(),
            Some("response.output_text.delta")
        );
        assert_eq!(meta.thread_id.as_deref(), Some("thread_1"));
        assert_eq!(meta.turn_id.as_deref(), Some("turn_1"));
        assert_eq!(meta.item_id.as_deref(), Some("item_meta_1"));
        assert_eq!(meta.item_type, None);
    }

    #[test]
    fn test_read_sse_event_meta_nested_item_fallback() {
        let meta = read_sse_event_meta(&json!({
            "type": "response.output_text.done",
            "thread_id": "thread_2",
            "turn_id": "turn_2",
            "item": {"id": "item_meta_2", "type": "agent_message"},
        }));
        assert_eq!(meta.item_id.as_deref(), Some("item_meta_2"));
        assert_eq!(meta.item_type.as_deref(), Some("agent_message"));
    }
}
