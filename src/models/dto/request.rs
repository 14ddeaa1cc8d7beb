use serde::Deserialize;
use validator::Validate;

use crate::models::domain::GenerationSettings;

/// Body for `POST /ai/generate-questions`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuestionsRequest {
    #[validate(length(min = 1, max = 200))]
    pub header: String,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    #[validate(length(min = 1))]
    pub content: String,

    /// Overrides the server-configured gateway key for this call.
    #[validate(length(min = 8, max = 200))]
    pub api_key: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub model: Option<String>,

    pub settings: Option<GenerationSettings>,

    /// Optional category whitelist; the model must pick exactly one.
    pub categories: Option<Vec<String>>,
}

/// Body for `POST /ai/extract-questions-ai`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExtractQuestionsRequest {
    #[validate(length(min = 1, max = 200))]
    pub header: String,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    #[validate(length(min = 1))]
    pub content: String,

    #[validate(length(min = 8, max = 200))]
    pub api_key: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub model: Option<String>,

    pub settings: Option<GenerationSettings>,
}

/// Body for `POST /ai/generate-questions-from-file`.
/// `file_content` is base64 of the raw file bytes.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateFromFileRequest {
    #[validate(length(min = 1, max = 200))]
    pub header: String,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    #[validate(length(min = 1, max = 255))]
    pub file_name: String,

    #[validate(length(min = 1))]
    pub file_content: String,

    #[validate(length(min = 8, max = 200))]
    pub api_key: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub model: Option<String>,

    pub settings: Option<GenerationSettings>,
}

/// Body for `POST /ai/generate-title-description`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TitleDescriptionRequest {
    #[validate(length(min = 1))]
    pub content: String,

    /// Question prompts to summarize alongside the content sample.
    #[serde(default)]
    pub questions: Vec<String>,

    /// Language code or "auto".
    #[validate(length(min = 2, max = 16))]
    pub target_language: Option<String>,

    #[validate(length(min = 8, max = 200))]
    pub api_key: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub model: Option<String>,
}

/// Body for `POST /ai/multi-agent-quiz`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MultiAgentQuizRequest {
    #[validate(length(min = 1, max = 200))]
    pub header: String,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    #[validate(length(min = 1))]
    pub content: String,

    #[validate(length(min = 8, max = 200))]
    pub api_key: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub model: Option<String>,

    pub settings: Option<GenerationSettings>,
}
