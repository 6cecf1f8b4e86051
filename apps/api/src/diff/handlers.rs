use axum::Json;
use serde::Deserialize;

use super::{build_line_diff, LineDiff};
use crate::errors::AppError;

/// The diff table is O(n·m) in line counts; cap inputs so a pathological
/// request cannot allocate gigabytes.
const MAX_DIFF_LINES: usize = 10_000;

#[derive(Debug, Deserialize)]
pub struct DiffRequest {
    pub before: String,
    pub after: String,
}

/// POST /api/v1/diff
/// Computes the line-level diff between two prompt revisions.
pub async fn handle_diff(Json(request): Json<DiffRequest>) -> Result<Json<LineDiff>, AppError> {
    for (name, text) in [("before", &request.before), ("after", &request.after)] {
        let lines = text.lines().count();
        if lines > MAX_DIFF_LINES {
            return Err(AppError::Validation(format!(
                "'{name}' has {lines} lines; the maximum is {MAX_DIFF_LINES}"
            )));
        }
    }
    Ok(Json(build_line_diff(&request.before, &request.after)))
}
