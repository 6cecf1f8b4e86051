use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::builder::{build_prompt, has_prompt_input, PromptConfig};
use super::context::{score_context, summarize_source, ContextConfig, ContextScore};
use super::scoring::{score_prompt, PromptScore};
use crate::errors::AppError;

#[derive(Debug, Serialize)]
pub struct BuildResponse {
    pub prompt: String,
    pub has_input: bool,
}

/// POST /api/v1/prompt/build
/// Assembles the final prompt text from a builder configuration.
pub async fn handle_build(
    Json(config): Json<PromptConfig>,
) -> Result<Json<BuildResponse>, AppError> {
    Ok(Json(BuildResponse {
        prompt: build_prompt(&config),
        has_input: has_prompt_input(&config),
    }))
}

/// POST /api/v1/prompt/score
/// Scores a builder configuration on the four quality dimensions.
pub async fn handle_score(
    Json(config): Json<PromptConfig>,
) -> Result<Json<PromptScore>, AppError> {
    Ok(Json(score_prompt(&config)))
}

/// POST /api/v1/context/score
/// Runs the four-point context checklist shown in the context panel.
pub async fn handle_context_score(
    Json(config): Json<ContextConfig>,
) -> Result<Json<ContextScore>, AppError> {
    Ok(Json(score_context(&config)))
}

#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    pub content: String,
}

/// POST /api/v1/context/summarize
/// Produces the bullet summary shown when a source is attached.
pub async fn handle_summarize(
    Json(request): Json<SummarizeRequest>,
) -> Result<Json<Value>, AppError> {
    if request.content.trim().is_empty() {
        return Err(AppError::Validation("content must not be empty".to_string()));
    }
    Ok(Json(json!({ "summary": summarize_source(&request.content) })))
}

/// GET /api/v1/prompt/catalog
/// Static option lists the builder UI renders its pickers from.
pub async fn handle_catalog() -> Json<Value> {
    Json(json!({
        "roles": super::builder::ROLES,
        "formats": super::builder::FORMAT_OPTIONS,
        "constraints": super::builder::CONSTRAINT_OPTIONS,
        "tones": super::builder::TONE_OPTIONS,
        "complexities": super::builder::COMPLEXITY_OPTIONS,
        "lengths": [
            { "value": "brief", "label": "Brief (~100 words)" },
            { "value": "standard", "label": "Standard (~300 words)" },
            { "value": "detailed", "label": "Detailed (500+ words)" },
        ],
    }))
}
