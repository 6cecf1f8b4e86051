//! Prompt assembly and quality scoring — the builder-side utilities behind
//! the structured prompt editor.

pub mod builder;
pub mod context;
pub mod handlers;
pub mod scoring;
