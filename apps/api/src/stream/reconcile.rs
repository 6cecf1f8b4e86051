//! Stream text reconciliation — turns a protocol that mixes explicit deltas,
//! partial snapshots, and full-replace "done" events into a monotonically
//! growing text buffer with correct per-event deltas.
//!
//! The function is pure: the caller owns the running text and threads it in
//! per event, sequentially per logical stream. `StreamAccumulator` is the
//! caller-side container that does exactly that, keyed by whatever stream
//! identity the event metadata provides.

use std::collections::HashMap;

use serde_json::Value;

use super::envelope::{extract_item_delta, extract_item_text, SseEventMeta};

/// Result of applying one stream event to the running text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamTextUpdate {
    /// The new "full text so far" after this event.
    pub next_text: String,
    /// The increment to append/render for this event. Empty for no-ops and
    /// already-applied duplicate deltas.
    pub delta: String,
}

/// Applies one event to `previous_text`. Case order is load-bearing:
///
/// 1. the event restates the full text and extends the running prefix →
///    adopt it, delta is the new suffix;
/// 2. the event states a full text that does not extend the prefix →
///    authoritative replace (terminal "done" events supersede any dropped or
///    reordered intermediate deltas), delta is the whole text;
/// 3. the event carries only an explicit delta → append it, unless the
///    running text already ends with it (duplicate delivery), which is a no-op;
/// 4. nothing usable → no-op.
///
/// Never fails: malformed items fall through the empty-string paths to the
/// no-op case.
pub fn compute_stream_text_update(previous_text: &str, item: &Value) -> StreamTextUpdate {
    let current = extract_item_text(item);
    let explicit_delta = extract_item_delta(item);

    if !current.is_empty() && current.starts_with(previous_text) {
        let delta = current[previous_text.len()..].to_string();
        return StreamTextUpdate {
            next_text: current,
            delta,
        };
    }

    if !current.is_empty() && current != previous_text {
        return StreamTextUpdate {
            next_text: current.clone(),
            delta: current,
        };
    }

    if !explicit_delta.is_empty() {
        if previous_text.ends_with(&explicit_delta) {
            return StreamTextUpdate {
                next_text: previous_text.to_string(),
                delta: String::new(),
            };
        }
        return StreamTextUpdate {
            next_text: format!("{previous_text}{explicit_delta}"),
            delta: explicit_delta,
        };
    }

    StreamTextUpdate {
        next_text: previous_text.to_string(),
        delta: String::new(),
    }
}

/// Per-request accumulator holding the running text of each logical stream.
///
/// Events for the same key must be applied in receipt order; independent
/// keys are unrelated. One accumulator lives inside one stream-consumption
/// task, so there is no shared state to synchronize.
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    streams: HashMap<String, String>,
    /// Key of the most recent stream that actually carried text. Metadata-only
    /// lifecycle events (which often omit ids) must not redirect this.
    last_key: Option<String>,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives the stream key for an event. Turn scoping wins over item
    /// scoping so checkpoint events (which carry item ids only) land on the
    /// same buffer as the deltas they restate.
    pub fn stream_key(meta: &SseEventMeta) -> String {
        let thread = meta.thread_id.as_deref().unwrap_or("-");
        let scope = meta
            .turn_id
            .as_deref()
            .or(meta.item_id.as_deref())
            .unwrap_or("-");
        format!("{thread}/{scope}")
    }

    /// Applies one event to the stream identified by `meta` and returns the
    /// delta to forward (empty for no-ops and duplicates).
    pub fn apply(&mut self, meta: &SseEventMeta, item: &Value) -> String {
        let key = Self::stream_key(meta);
        let previous = self.streams.get(&key).map(String::as_str).unwrap_or("");
        let update = compute_stream_text_update(previous, item);
        if !update.next_text.is_empty() {
            self.last_key = Some(key.clone());
        }
        self.streams.insert(key, update.next_text);
        update.delta
    }

    /// The current full text of one stream, if any events have arrived.
    pub fn current_text(&self, meta: &SseEventMeta) -> Option<&str> {
        self.streams
            .get(&Self::stream_key(meta))
            .map(String::as_str)
    }

    /// Full text of the last stream that carried any text, regardless of
    /// what metadata-only events arrived after it.
    pub fn last_text(&self) -> Option<&str> {
        self.streams
            .get(self.last_key.as_ref()?)
            .map(String::as_str)
    }
}
