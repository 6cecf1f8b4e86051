//! Prompt assembly from the structured builder configuration.
//!
//! The output is plain markdown-ish text: a `**Role:**` / `**Task:**` /
//! context / `**Format:**` / `**Examples:**` / `**Constraints:**` stack,
//! each section emitted only when the config carries something for it.

use serde::{Deserialize, Serialize};

use super::context::{build_context_block, ContextConfig};

pub const DEFAULT_TONE: &str = "Professional";
pub const DEFAULT_COMPLEXITY: &str = "Moderate";
pub const DEFAULT_LENGTH: &str = "standard";

pub const ROLES: &[&str] = &[
    "Expert Copywriter",
    "Data Analyst",
    "Software Developer",
    "Teacher",
    "Business Consultant",
    "Creative Director",
    "Marketing Specialist",
    "UX Designer",
    "Financial Advisor",
    "Research Scientist",
    "Product Manager",
    "Legal Advisor",
    "Medical Professional",
    "Journalist",
    "Technical Writer",
];

pub const FORMAT_OPTIONS: &[&str] = &[
    "Bullet points",
    "Numbered list",
    "Paragraph form",
    "Table",
    "JSON",
    "Markdown",
    "Code block",
];

pub const CONSTRAINT_OPTIONS: &[&str] = &[
    "Avoid jargon",
    "Use formal tone",
    "Be conversational",
    "Include citations",
    "Think step-by-step",
];

pub const TONE_OPTIONS: &[&str] = &["Professional", "Casual", "Technical", "Creative", "Academic"];
pub const COMPLEXITY_OPTIONS: &[&str] = &["Simple", "Moderate", "Advanced"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptConfig {
    #[serde(default)]
    pub original_prompt: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub custom_role: String,
    #[serde(default)]
    pub task: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub context_config: ContextConfig,
    #[serde(default)]
    pub format: Vec<String>,
    #[serde(default)]
    pub custom_format: String,
    #[serde(default = "default_length")]
    pub length_preference: String,
    #[serde(default)]
    pub examples: String,
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default)]
    pub custom_constraint: String,
    #[serde(default = "default_tone")]
    pub tone: String,
    #[serde(default = "default_complexity")]
    pub complexity: String,
}

fn default_tone() -> String {
    DEFAULT_TONE.to_string()
}

fn default_complexity() -> String {
    DEFAULT_COMPLEXITY.to_string()
}

fn default_length() -> String {
    DEFAULT_LENGTH.to_string()
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            original_prompt: String::new(),
            role: String::new(),
            custom_role: String::new(),
            task: String::new(),
            context: String::new(),
            context_config: ContextConfig::default(),
            format: Vec::new(),
            custom_format: String::new(),
            length_preference: default_length(),
            examples: String::new(),
            constraints: Vec::new(),
            custom_constraint: String::new(),
            tone: default_tone(),
            complexity: default_complexity(),
        }
    }
}

fn has_text(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Whether the builder has received any input at all — gates the "empty
/// state" in the editor and blocks enhancement of a blank config.
pub fn has_prompt_input(config: &PromptConfig) -> bool {
    let ctx = &config.context_config;
    let s = &ctx.structured;
    let has_structured = [
        &s.audience,
        &s.product,
        &s.offer,
        &s.must_include,
        &s.excluded_topics,
    ]
    .iter()
    .any(|v| has_text(v));
    let has_interview = ctx.interview_answers.iter().any(|a| has_text(&a.answer));

    has_text(&config.original_prompt)
        || has_text(&config.task)
        || has_text(&config.role)
        || has_text(&config.custom_role)
        || has_text(&config.context)
        || !ctx.sources.is_empty()
        || has_structured
        || has_interview
        || has_text(&ctx.project_notes)
        || !config.format.is_empty()
        || has_text(&config.custom_format)
        || config.length_preference != DEFAULT_LENGTH
        || has_text(&config.examples)
        || !config.constraints.is_empty()
        || has_text(&config.custom_constraint)
        || config.tone != DEFAULT_TONE
        || config.complexity != DEFAULT_COMPLEXITY
}

fn length_label(preference: &str) -> &'static str {
    match preference {
        "brief" => "Keep it brief (~100 words)",
        "detailed" => "Be detailed (500+ words)",
        _ => "Standard length (~300 words)",
    }
}

/// Assembles the final prompt text from the builder configuration.
pub fn build_prompt(config: &PromptConfig) -> String {
    let mut parts: Vec<String> = Vec::new();

    let actual_role = if config.custom_role.is_empty() {
        &config.role
    } else {
        &config.custom_role
    };
    if !actual_role.is_empty() {
        parts.push(format!("**Role:** Act as a {actual_role}."));
    }

    if !config.task.is_empty() || !config.original_prompt.is_empty() {
        let task = if config.task.is_empty() {
            &config.original_prompt
        } else {
            &config.task
        };
        parts.push(format!("**Task:** {task}"));
    }

    let context_block =
        build_context_block(&config.context_config, config.context_config.use_delimiters);
    if !context_block.is_empty() {
        parts.push(context_block.clone());
    }

    // Legacy flat context field, only when the rich panel produced nothing.
    if !config.context.is_empty() && context_block.is_empty() {
        parts.push(format!("**Context:** {}", config.context));
    }

    let mut formats = config.format.clone();
    if !config.custom_format.is_empty() {
        formats.push(config.custom_format.clone());
    }
    if !formats.is_empty() {
        parts.push(format!(
            "**Format:** Present the response as {}. {}.",
            formats.join(", "),
            length_label(&config.length_preference)
        ));
    }

    if !config.examples.is_empty() {
        parts.push(format!("**Examples:**\n{}", config.examples));
    }

    let mut all_constraints = config.constraints.clone();
    if !config.custom_constraint.is_empty() {
        all_constraints.push(config.custom_constraint.clone());
    }
    // Tone/complexity only become constraints when they carry signal: either
    // a non-default choice, or a prompt that already has other content.
    let has_meaningful_input = !parts.is_empty() || !all_constraints.is_empty();
    if !config.tone.is_empty() && (config.tone != DEFAULT_TONE || has_meaningful_input) {
        all_constraints.push(format!("Use a {} tone", config.tone.to_lowercase()));
    }
    if !config.complexity.is_empty()
        && (config.complexity != DEFAULT_COMPLEXITY || has_meaningful_input)
    {
        all_constraints.push(format!(
            "Target {} complexity level",
            config.complexity.to_lowercase()
        ));
    }

    if !all_constraints.is_empty() {
        let bullets: Vec<String> = all_constraints.iter().map(|c| format!("- {c}")).collect();
        parts.push(format!("**Constraints:**\n{}", bullets.join("\n")));
    }

    parts.join("\n\n")
}
