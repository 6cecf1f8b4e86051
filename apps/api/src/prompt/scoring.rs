//! Prompt quality scoring — four 0–25 dimensions summed to a 0–100 total,
//! with actionable tips for any dimension that lands under its threshold.

use serde::{Deserialize, Serialize};

use super::builder::PromptConfig;

const DIMENSION_MAX: u32 = 25;
const TIP_THRESHOLD: u32 = 15;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptScore {
    pub total: u32,
    pub clarity: u32,
    pub context: u32,
    pub specificity: u32,
    pub structure: u32,
    pub tips: Vec<String>,
}

/// Scores a builder configuration on clarity, context, specificity, and
/// structure. Deterministic weighted counting, no model calls.
pub fn score_prompt(config: &PromptConfig) -> PromptScore {
    let mut tips: Vec<String> = Vec::new();

    // Clarity: task length, saturating at 100 characters.
    let task = if config.task.is_empty() {
        &config.original_prompt
    } else {
        &config.task
    };
    let clarity = if task.is_empty() {
        0
    } else {
        let scaled = (task.chars().count() as f64 / 100.0 * DIMENSION_MAX as f64).round() as u32;
        scaled.min(DIMENSION_MAX)
    };
    if clarity < TIP_THRESHOLD {
        tips.push("Make your task description more specific and detailed.".to_string());
    }

    // Context: legacy field length plus structured-panel signals.
    let mut context = if config.context.is_empty() {
        0
    } else {
        let scaled = (config.context.chars().count() as f64 / 150.0 * 15.0).round() as u32;
        scaled.min(15)
    };
    let ctx = &config.context_config;
    if !ctx.sources.is_empty() {
        context += 5;
    }
    if !ctx.structured.audience.is_empty() || !ctx.structured.product.is_empty() {
        context += 4;
    }
    if !ctx.structured.offer.is_empty() {
        context += 3;
    }
    if ctx
        .interview_answers
        .iter()
        .any(|a| !a.answer.trim().is_empty())
    {
        context += 3;
    }
    if !ctx.project_notes.trim().is_empty() {
        context += 2;
    }
    if !config.role.is_empty() || !config.custom_role.is_empty() {
        context += 5;
    }
    let context = context.min(DIMENSION_MAX);
    if context < TIP_THRESHOLD {
        tips.push("Use the Context & Sources panel to add structured background info.".to_string());
    }

    // Specificity: format, length, examples, constraints.
    let mut specificity = 0;
    if !config.format.is_empty() {
        specificity += 8;
    }
    if !config.length_preference.is_empty() {
        specificity += 5;
    }
    if !config.examples.is_empty() {
        specificity += 7;
    }
    if !config.constraints.is_empty() {
        specificity += 5;
    }
    let specificity = u32::min(specificity, DIMENSION_MAX);
    if specificity < TIP_THRESHOLD {
        tips.push(
            "Specify output format, length, or provide examples for better results.".to_string(),
        );
    }

    // Structure: role, tone, complexity, constraint count, format.
    let mut structure = 0;
    if !config.role.is_empty() || !config.custom_role.is_empty() {
        structure += 7;
    }
    if !config.tone.is_empty() {
        structure += 5;
    }
    if !config.complexity.is_empty() {
        structure += 5;
    }
    if config.constraints.len() >= 2 {
        structure += 4;
    }
    if !config.format.is_empty() {
        structure += 4;
    }
    let structure = u32::min(structure, DIMENSION_MAX);
    if structure < TIP_THRESHOLD {
        tips.push("Select a role, tone, and constraints to improve prompt structure.".to_string());
    }

    if tips.is_empty() {
        tips.push("Great prompt! You've covered all the essentials.".to_string());
    }

    PromptScore {
        total: clarity + context + specificity + structure,
        clarity,
        context,
        specificity,
        structure,
        tips,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::context::InterviewAnswer;

    fn strong_config() -> PromptConfig {
        let mut config = PromptConfig {
            task: "x".repeat(120),
            context: "y".repeat(200),
            role: "Data Analyst".to_string(),
            format: vec!["Table".to_string()],
            examples: "Example: ...".to_string(),
            constraints: vec!["Avoid jargon".to_string(), "Include citations".to_string()],
            ..Default::default()
        };
        config.context_config.structured.audience = "analysts".to_string();
        config.context_config.structured.offer = "quarterly report".to_string();
        config
    }

    #[test]
    fn test_empty_config_scores_zero_with_tips() {
        let score = score_prompt(&PromptConfig::default());
        assert_eq!(score.clarity, 0);
        assert_eq!(score.context, 0);
        // Default length preference still counts toward specificity.
        assert_eq!(score.specificity, 5);
        // Default tone + complexity.
        assert_eq!(score.structure, 10);
        assert_eq!(score.tips.len(), 4);
    }

    #[test]
    fn test_dimensions_cap_at_25() {
        let score = score_prompt(&strong_config());
        assert_eq!(score.clarity, 25);
        assert_eq!(score.context, 25);
        assert_eq!(score.specificity, 25);
        assert_eq!(score.structure, 25);
        assert_eq!(score.total, 100);
    }

    #[test]
    fn test_complete_config_gets_praise_tip() {
        let score = score_prompt(&strong_config());
        assert_eq!(
            score.tips,
            vec!["Great prompt! You've covered all the essentials.".to_string()]
        );
    }

    #[test]
    fn test_short_task_triggers_clarity_tip() {
        let config = PromptConfig {
            task: "hi".to_string(),
            ..Default::default()
        };
        let score = score_prompt(&config);
        assert!(score.clarity < 15);
        assert!(score
            .tips
            .iter()
            .any(|t| t.contains("task description")));
    }

    #[test]
    fn test_interview_and_notes_contribute_to_context() {
        let mut config = PromptConfig::default();
        config.context_config.project_notes = "notes".to_string();
        config.context_config.interview_answers.push(InterviewAnswer {
            question_id: "goal".to_string(),
            question: "Goal?".to_string(),
            answer: "ship it".to_string(),
        });
        let score = score_prompt(&config);
        assert_eq!(score.context, 5);
    }
}
