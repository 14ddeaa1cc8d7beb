use serde::Serialize;

use crate::models::domain::{Question, QuestionSet, TitleDescription};

/// Success envelope for the question-producing endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionsResponse {
    pub success: bool,
    pub questions: Vec<Question>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_category: Option<String>,
}

impl QuestionsResponse {
    pub fn new(questions: Vec<Question>, selected_category: Option<String>) -> Self {
        QuestionsResponse {
            success: true,
            questions,
            selected_category,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleDescriptionResponse {
    pub success: bool,
    pub title: String,
    pub description: String,
}

impl From<TitleDescription> for TitleDescriptionResponse {
    fn from(value: TitleDescription) -> Self {
        TitleDescriptionResponse {
            success: true,
            title: value.title,
            description: value.description,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftResponse {
    pub success: bool,
    pub draft: Option<QuestionSet>,
}
