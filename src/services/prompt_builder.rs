use crate::constants::{
    prompts, MAX_CONTENT_CHARS, MAX_QUESTION_COUNT, MIN_QUESTION_COUNT,
};
use crate::models::domain::{CountMode, GenerationSettings};

/// Which correctness contract the prompt demands from the model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptTask {
    /// Author new questions; the count is binding.
    Generate,
    /// Return only questions verbatim present in the source; empty allowed.
    Extract,
}

#[derive(Clone, Debug)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Builds the full instruction text for one pipeline call. Pure and
/// deterministic over its inputs; performs no I/O.
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn build(
        task: PromptTask,
        header: &str,
        description: Option<&str>,
        settings: &GenerationSettings,
        content: &str,
        categories: Option<&[String]>,
    ) -> Prompt {
        let system = match task {
            PromptTask::Generate => prompts::GENERATE_SYSTEM_PROMPT,
            PromptTask::Extract => prompts::EXTRACT_SYSTEM_PROMPT,
        }
        .to_string();

        let mut user = String::new();

        user.push_str("## TASK\n\n");
        user.push_str(&format!("Quiz header: {}\n", header));
        if let Some(description) = description.filter(|d| !d.trim().is_empty()) {
            user.push_str(&format!("Quiz description: {}\n", description));
        }

        match task {
            PromptTask::Generate => {
                let count = clamp_count(settings.number_of_questions);
                match settings.count_mode {
                    CountMode::Exact => user.push_str(&format!(
                        "Generate EXACTLY {} questions. Not more, not fewer.\n",
                        count
                    )),
                    CountMode::UpTo => user.push_str(&format!(
                        "Generate up to {} questions, as many as the content supports.\n",
                        count
                    )),
                }
                if let Some(kind) = settings.question_kind {
                    user.push_str(&format!(
                        "Every question must be of type {}.\n",
                        serde_json::to_string(&kind).unwrap_or_default().trim_matches('"')
                    ));
                }
                if let Some(difficulty) = settings.difficulty {
                    user.push_str(&format!(
                        "Target difficulty: {}.\n",
                        serde_json::to_string(&difficulty)
                            .unwrap_or_default()
                            .trim_matches('"')
                    ));
                }
            }
            PromptTask::Extract => {
                user.push_str(
                    "Extract every quiz question that appears verbatim in the source \
                     content below. If none are present, return an empty questions array.\n",
                );
            }
        }

        if settings.language != "auto" && !settings.language.is_empty() {
            user.push_str(&format!(
                "Write all question and answer text in language: {}.\n",
                settings.language
            ));
        }

        if let Some(categories) = categories.filter(|c| !c.is_empty()) {
            user.push_str(
                "\nChoose EXACTLY ONE category for this quiz from the following list and \
                 return it as a top-level \"selectedCategory\" field in the JSON object. \
                 If no category matches well, pick the closest one; never answer with \
                 none or a category outside the list.\nCategories: ",
            );
            user.push_str(&categories.join(", "));
            user.push('\n');
        }

        user.push_str("\n## OUTPUT JSON SHAPE\n\n");
        user.push_str(prompts::QUESTION_JSON_SHAPE);

        user.push_str("\n\n## SOURCE CONTENT\n\n");
        user.push_str(&truncate_content(content));

        Prompt { system, user }
    }

    /// Prompt for the title/description enrichment call.
    pub fn build_title_description(
        content_sample: &str,
        question_texts: &[String],
        language_name: &str,
    ) -> Prompt {
        let mut user = String::new();
        user.push_str("## TASK\n\n");
        user.push_str(&format!("Target language: {}\n", language_name));
        if !question_texts.is_empty() {
            user.push_str("\nQuiz questions:\n");
            for text in question_texts {
                user.push_str(&format!("- {}\n", text));
            }
        }
        user.push_str("\n## CONTENT SAMPLE\n\n");
        user.push_str(&truncate_content(content_sample));

        Prompt {
            system: prompts::TITLE_DESCRIPTION_SYSTEM_PROMPT.to_string(),
            user,
        }
    }
}

pub fn clamp_count(requested: u8) -> u8 {
    requested.clamp(MIN_QUESTION_COUNT, MAX_QUESTION_COUNT)
}

/// Cuts content to the prompt budget on a char boundary.
pub fn truncate_content(content: &str) -> String {
    content.chars().take(MAX_CONTENT_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::QuestionKind;

    fn settings_with_count(count: u8) -> GenerationSettings {
        GenerationSettings {
            number_of_questions: count,
            ..GenerationSettings::default()
        }
    }

    #[test]
    fn generate_prompt_embeds_exact_count() {
        let prompt = PromptBuilder::build(
            PromptTask::Generate,
            "Arithmetic",
            None,
            &settings_with_count(7),
            "some content",
            None,
        );
        assert!(prompt.user.contains("EXACTLY 7 questions"));
        assert!(prompt.system.contains("quiz generation agent"));
    }

    #[test]
    fn requested_count_is_clamped_to_one_through_ten() {
        let prompt = PromptBuilder::build(
            PromptTask::Generate,
            "H",
            None,
            &settings_with_count(50),
            "c",
            None,
        );
        assert!(prompt.user.contains("EXACTLY 10 questions"));

        let prompt = PromptBuilder::build(
            PromptTask::Generate,
            "H",
            None,
            &settings_with_count(0),
            "c",
            None,
        );
        assert!(prompt.user.contains("EXACTLY 1 questions"));
    }

    #[test]
    fn content_is_truncated_to_budget() {
        let content = "x".repeat(MAX_CONTENT_CHARS + 500);
        let prompt = PromptBuilder::build(
            PromptTask::Generate,
            "H",
            None,
            &GenerationSettings::default(),
            &content,
            None,
        );
        // count only within the source section; the templates above it also
        // contain the letter
        let source_section = prompt
            .user
            .split("## SOURCE CONTENT")
            .nth(1)
            .expect("prompt has a source section");
        let embedded_x = source_section.chars().filter(|c| *c == 'x').count();
        assert_eq!(embedded_x, MAX_CONTENT_CHARS);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let content = "é".repeat(MAX_CONTENT_CHARS + 10);
        let truncated = truncate_content(&content);
        assert_eq!(truncated.chars().count(), MAX_CONTENT_CHARS);
    }

    #[test]
    fn extract_prompt_demands_verbatim_and_allows_empty() {
        let prompt = PromptBuilder::build(
            PromptTask::Extract,
            "H",
            None,
            &GenerationSettings::default(),
            "content",
            None,
        );
        assert!(prompt.user.contains("verbatim"));
        assert!(prompt.user.contains("empty questions array"));
        assert!(prompt.system.contains("NEVER invent"));
        // extraction never carries a binding count
        assert!(!prompt.user.contains("EXACTLY"));
    }

    #[test]
    fn category_whitelist_demands_exactly_one_choice() {
        let categories = vec!["Math".to_string(), "History".to_string()];
        let prompt = PromptBuilder::build(
            PromptTask::Generate,
            "H",
            None,
            &GenerationSettings::default(),
            "content",
            Some(&categories),
        );
        assert!(prompt.user.contains("selectedCategory"));
        assert!(prompt.user.contains("Math, History"));
        assert!(prompt.user.contains("pick the closest one"));
    }

    #[test]
    fn no_category_section_without_whitelist() {
        let prompt = PromptBuilder::build(
            PromptTask::Generate,
            "H",
            None,
            &GenerationSettings::default(),
            "content",
            Some(&[]),
        );
        assert!(!prompt.user.contains("selectedCategory"));
    }

    #[test]
    fn question_kind_filter_is_embedded() {
        let settings = GenerationSettings {
            question_kind: Some(QuestionKind::TrueFalse),
            ..GenerationSettings::default()
        };
        let prompt =
            PromptBuilder::build(PromptTask::Generate, "H", None, &settings, "c", None);
        assert!(prompt.user.contains("TRUE_FALSE"));
    }

    #[test]
    fn prompt_is_deterministic() {
        let build = || {
            PromptBuilder::build(
                PromptTask::Generate,
                "H",
                Some("desc"),
                &GenerationSettings::default(),
                "content",
                None,
            )
        };
        let a = build();
        let b = build();
        assert_eq!(a.system, b.system);
        assert_eq!(a.user, b.user);
    }
}
