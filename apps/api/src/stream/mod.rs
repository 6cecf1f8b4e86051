//! Streaming text core — SSE frame decoding, envelope text extraction, and
//! incremental reconciliation of the "current full text" for an in-flight
//! enhancement stream.

pub mod decoder;
pub mod envelope;
pub mod reconcile;
