//! Rich context configuration — structured background fields, attached
//! sources, and interview answers that the builder folds into the prompt.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextSource {
    pub id: String,
    #[serde(rename = "type")]
    pub source_type: String, // "text" | "url" | "file"
    pub title: String,
    #[serde(default)]
    pub raw_content: String,
    pub summary: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredContext {
    #[serde(default)]
    pub audience: String,
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub offer: String,
    #[serde(default)]
    pub must_include: String,
    #[serde(default)]
    pub excluded_topics: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewAnswer {
    pub question_id: String,
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextConfig {
    #[serde(default)]
    pub sources: Vec<ContextSource>,
    #[serde(default)]
    pub structured: StructuredContext,
    #[serde(default)]
    pub interview_answers: Vec<InterviewAnswer>,
    #[serde(default = "default_use_delimiters")]
    pub use_delimiters: bool,
    #[serde(default)]
    pub project_notes: String,
}

fn default_use_delimiters() -> bool {
    true
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            structured: StructuredContext::default(),
            interview_answers: Vec::new(),
            use_delimiters: true,
            project_notes: String::new(),
        }
    }
}

fn framed(section: &str, tag: &str, heading: &str, use_delimiters: bool) -> String {
    if use_delimiters {
        format!("<{tag}>\n{section}\n</{tag}>")
    } else {
        format!("**{heading}:**\n{section}")
    }
}

/// Renders the context configuration into the block the builder appends to
/// the assembled prompt. Returns `""` when nothing is filled in.
pub fn build_context_block(ctx: &ContextConfig, use_delimiters: bool) -> String {
    let mut sections: Vec<String> = Vec::new();

    let s = &ctx.structured;
    let structured_parts: Vec<String> = [
        ("Audience", &s.audience),
        ("Subject", &s.product),
        ("Goal", &s.offer),
        ("Must include", &s.must_include),
        ("Excluded", &s.excluded_topics),
    ]
    .iter()
    .filter(|(_, value)| !value.is_empty())
    .map(|(label, value)| format!("{label}: {value}"))
    .collect();
    if !structured_parts.is_empty() {
        sections.push(framed(
            &structured_parts.join("\n"),
            "background",
            "Background",
            use_delimiters,
        ));
    }

    if !ctx.sources.is_empty() {
        let source_lines: Vec<String> = ctx
            .sources
            .iter()
            .map(|src| {
                format!(
                    "[{}: {}]\n{}",
                    src.source_type.to_uppercase(),
                    src.title,
                    src.summary
                )
            })
            .collect();
        sections.push(framed(
            &source_lines.join("\n\n"),
            "sources",
            "Sources",
            use_delimiters,
        ));
    }

    let notes = ctx.project_notes.trim();
    if !notes.is_empty() {
        sections.push(framed(notes, "project-notes", "Project Notes", use_delimiters));
    }

    let answered: Vec<String> = ctx
        .interview_answers
        .iter()
        .filter(|a| !a.answer.trim().is_empty())
        .map(|a| format!("Q: {}\nA: {}", a.question, a.answer))
        .collect();
    if !answered.is_empty() {
        sections.push(framed(
            &answered.join("\n\n"),
            "context-interview",
            "Context Interview",
            use_delimiters,
        ));
    }

    sections.join("\n\n")
}

/// One entry of the context-quality checklist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextCheck {
    pub label: String,
    pub met: bool,
    pub tip: String,
}

/// Context-quality checklist result: how many of the four checks pass,
/// scaled to 0–100.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextScore {
    pub score: u32,
    pub checks: Vec<ContextCheck>,
}

fn answered(ctx: &ContextConfig, question_id: &str) -> bool {
    ctx.interview_answers
        .iter()
        .any(|a| a.question_id == question_id && !a.answer.trim().is_empty())
}

/// Runs the four-point context checklist: objective, background,
/// constraints, and supporting evidence.
pub fn score_context(ctx: &ContextConfig) -> ContextScore {
    let mut checks = Vec::new();

    let has_objective = !ctx.structured.offer.trim().is_empty() || answered(ctx, "goal");
    checks.push(ContextCheck {
        label: "Clear objective".to_string(),
        met: has_objective,
        tip: "Fill in the Goal/Offer field or complete the context interview.".to_string(),
    });

    let has_background = !ctx.structured.audience.trim().is_empty()
        || !ctx.structured.product.trim().is_empty()
        || !ctx.sources.is_empty();
    checks.push(ContextCheck {
        label: "Enough background".to_string(),
        met: has_background,
        tip: "Add audience, subject info, or attach source material.".to_string(),
    });

    let has_constraints =
        !ctx.structured.excluded_topics.trim().is_empty() || answered(ctx, "constraints");
    checks.push(ContextCheck {
        label: "Defined constraints".to_string(),
        met: has_constraints,
        tip: "Specify excluded topics or constraints so the model knows boundaries.".to_string(),
    });

    let has_evidence = !ctx.structured.must_include.trim().is_empty() || !ctx.sources.is_empty();
    checks.push(ContextCheck {
        label: "Supporting evidence".to_string(),
        met: has_evidence,
        tip: "Add must-include facts or attach a source for grounded output.".to_string(),
    });

    let met_count = checks.iter().filter(|c| c.met).count();
    let score = (met_count as f64 / checks.len() as f64 * 100.0).round() as u32;

    ContextScore { score, checks }
}

/// Heuristic source summary: first three and last two sentences, bulleted.
pub fn summarize_source(content: &str) -> String {
    let flattened = content.replace('\n', " ");
    let mut sentences: Vec<&str> = Vec::new();
    let mut start = 0;
    let bytes = flattened.as_bytes();
    for (idx, ch) in flattened.char_indices() {
        if matches!(ch, '.' | '!' | '?') {
            let next = idx + ch.len_utf8();
            if next >= bytes.len() || bytes[next] == b' ' {
                let sentence = flattened[start..next].trim();
                if sentence.len() > 10 {
                    sentences.push(sentence);
                }
                start = next;
            }
        }
    }
    let tail = flattened[start..].trim();
    if tail.len() > 10 {
        sentences.push(tail);
    }

    let picked: Vec<&str> = if sentences.len() <= 5 {
        sentences
    } else {
        sentences[..3]
            .iter()
            .chain(sentences[sentences.len() - 2..].iter())
            .copied()
            .collect()
    };
    picked
        .iter()
        .map(|s| format!("\u{2022} {s}"))
        .collect::<Vec<_>>()
        .join("\n")
}
