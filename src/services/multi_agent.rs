use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::constants::prompts;
use crate::errors::AppResult;
use crate::models::domain::{GenerationSettings, Question};
use crate::services::gateway::{ChatGateway, CompletionRequest};
use crate::services::parser::{self, ParseMode};
use crate::services::prompt_builder::{clamp_count, truncate_content};

/// One named step in the authoring workflow.
#[derive(Clone, Copy, Debug)]
pub struct AgentStep {
    pub name: &'static str,
    system_prompt: &'static str,
    /// Only the formatter must emit machine-parseable JSON.
    force_json: bool,
}

/// Fixed step sequence. The Formatter is always last; its message content is
/// the final text handed to the response parser.
pub const WORKFLOW_STEPS: [AgentStep; 4] = [
    AgentStep {
        name: "outline",
        system_prompt: prompts::OUTLINE_AGENT_PROMPT,
        force_json: false,
    },
    AgentStep {
        name: "author",
        system_prompt: prompts::AUTHOR_AGENT_PROMPT,
        force_json: false,
    },
    AgentStep {
        name: "reviewer",
        system_prompt: prompts::REVIEWER_AGENT_PROMPT,
        force_json: false,
    },
    AgentStep {
        name: "formatter",
        system_prompt: prompts::FORMATTER_AGENT_PROMPT,
        force_json: true,
    },
];

pub struct WorkflowOutcome {
    pub questions: Vec<Question>,
    /// Raw per-step outputs keyed by step name, for logging/inspection.
    pub step_results: HashMap<String, Value>,
}

/// Sequential multi-agent quiz authoring: outline, author, review, format.
/// Each step is one gateway call whose user message embeds the previous
/// step's output.
pub struct MultiAgentWorkflow {
    gateway: Arc<dyn ChatGateway>,
    default_model: String,
}

impl MultiAgentWorkflow {
    pub fn new(gateway: Arc<dyn ChatGateway>, default_model: String) -> Self {
        MultiAgentWorkflow {
            gateway,
            default_model,
        }
    }

    pub async fn run(
        &self,
        header: &str,
        description: Option<&str>,
        settings: &GenerationSettings,
        content: &str,
        model: Option<&str>,
        api_key_override: Option<&str>,
    ) -> AppResult<WorkflowOutcome> {
        let model = model.unwrap_or(&self.default_model);
        let count = clamp_count(settings.number_of_questions);

        let mut step_results: HashMap<String, Value> = HashMap::new();
        let mut previous_output = String::new();

        for step in WORKFLOW_STEPS {
            let user = self.build_step_input(step.name, header, description, count, content,
                &previous_output);

            let mut request =
                CompletionRequest::new(model, step.system_prompt.to_string(), user);
            request.force_json = step.force_json;
            request.api_key_override = api_key_override.map(String::from);

            log::info!("Running multi-agent step '{}'", step.name);
            let output = self.gateway.complete(&request).await?;
            step_results.insert(step.name.to_string(), Value::String(output.clone()));
            previous_output = output;
        }

        // previous_output is now the formatter's message content
        let questions = parser::parse_questions(
            &previous_output,
            ParseMode::Generate {
                expected_count: Some(count),
            },
        )?;

        Ok(WorkflowOutcome {
            questions,
            step_results,
        })
    }

    fn build_step_input(
        &self,
        step_name: &str,
        header: &str,
        description: Option<&str>,
        count: u8,
        content: &str,
        previous_output: &str,
    ) -> String {
        let mut user = String::new();
        user.push_str("## TASK\n\n");
        user.push_str(&format!("Quiz header: {}\n", header));
        if let Some(description) = description.filter(|d| !d.trim().is_empty()) {
            user.push_str(&format!("Quiz description: {}\n", description));
        }
        user.push_str(&format!("Question slots: {}\n", count));

        match step_name {
            "outline" => {
                user.push_str("\n## SOURCE CONTENT\n\n");
                user.push_str(&truncate_content(content));
            }
            "formatter" => {
                user.push_str("\n## OUTPUT JSON SHAPE\n\n");
                user.push_str(prompts::QUESTION_JSON_SHAPE);
                user.push_str("\n\n## REVIEWED QUESTIONS\n\n");
                user.push_str(previous_output);
            }
            _ => {
                user.push_str("\n## PREVIOUS STEP OUTPUT\n\n");
                user.push_str(previous_output);
            }
        }
        user
    }
}
