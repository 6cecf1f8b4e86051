//! Line-level diff between two prompt revisions, rendered by the version
//! history view as a unified-diff-style listing.
//!
//! Classical LCS dynamic programming: O(n·m) in line counts, which is fine
//! for prompt-sized text. The tie-break in the walk (prefer `remove` when
//! the two LCS branches are equal) fixes which of several minimal edit
//! scripts is produced and is pinned by the golden tests below.

pub mod handlers;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffLineKind {
    Context,
    Add,
    Remove,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    #[serde(rename = "type")]
    pub kind: DiffLineKind,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDiff {
    pub lines: Vec<DiffLine>,
    pub added: usize,
    pub removed: usize,
}

fn split_lines(input: &str) -> Vec<String> {
    if input.is_empty() {
        return Vec::new();
    }
    // Only the two-byte \r\n sequence is normalized; a bare \r is ordinary
    // line content and must survive the round trip.
    input
        .replace("\r\n", "\n")
        .split('\n')
        .map(str::to_string)
        .collect()
}

/// Computes a minimal line-level edit script from `before` to `after`.
///
/// The `context`+`remove` lines in order reproduce `before`; the
/// `context`+`add` lines reproduce `after`. Identical inputs yield all
/// `context` lines with zero counts.
pub fn build_line_diff(before: &str, after: &str) -> LineDiff {
    let before_lines = split_lines(before);
    let after_lines = split_lines(after);
    let n = before_lines.len();
    let m = after_lines.len();

    // lcs[i][j] = LCS length of before[i..] and after[j..], filled backward.
    let mut lcs = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i][j] = if before_lines[i] == after_lines[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut lines = Vec::with_capacity(n.max(m));
    let mut added = 0;
    let mut removed = 0;
    let mut i = 0;
    let mut j = 0;

    while i < n && j < m {
        if before_lines[i] == after_lines[j] {
            lines.push(DiffLine {
                kind: DiffLineKind::Context,
                value: before_lines[i].to_string(),
            });
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            lines.push(DiffLine {
                kind: DiffLineKind::Remove,
                value: before_lines[i].to_string(),
            });
            removed += 1;
            i += 1;
        } else {
            lines.push(DiffLine {
                kind: DiffLineKind::Add,
                value: after_lines[j].to_string(),
            });
            added += 1;
            j += 1;
        }
    }

    while i < n {
        lines.push(DiffLine {
            kind: DiffLineKind::Remove,
            value: before_lines[i].to_string(),
        });
        removed += 1;
        i += 1;
    }

    while j < m {
        lines.push(DiffLine {
            kind: DiffLineKind::Add,
            value: after_lines[j].to_string(),
        });
        added += 1;
        j += 1;
    }

    LineDiff {
        lines,
        added,
        removed,
    }
}
