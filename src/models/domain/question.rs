use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionKind {
    MultipleChoice,
    TrueFalse,
    FillBlank,
    FreeResponse,
}

impl QuestionKind {
    /// Parses a kind name coming from model output, remapping the legacy
    /// aliases (`SHORT_ANSWER`, `ESSAY`, `MATCHING`) onto the canonical four
    /// kinds. Unknown names fall back to multiple choice.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_uppercase().as_str() {
            "MULTIPLE_CHOICE" => QuestionKind::MultipleChoice,
            "TRUE_FALSE" => QuestionKind::TrueFalse,
            "FILL_BLANK" => QuestionKind::FillBlank,
            "FREE_RESPONSE" => QuestionKind::FreeResponse,
            "SHORT_ANSWER" => QuestionKind::FillBlank,
            "ESSAY" => QuestionKind::FreeResponse,
            // lossy fallback, matching questions cannot be represented
            "MATCHING" => QuestionKind::MultipleChoice,
            _ => QuestionKind::MultipleChoice,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_uppercase().as_str() {
            "MEDIUM" => Difficulty::Medium,
            "HARD" => Difficulty::Hard,
            _ => Difficulty::Easy,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub id: String,
    pub text: String,
    pub is_correct: bool,
    pub order_index: i16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub difficulty: Difficulty,
    pub points: i16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Empty only for FILL_BLANK/FREE_RESPONSE, which carry the expected
    /// value in `short_answer_text` instead.
    pub answers: Vec<Answer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_answer_text: Option<String>,
    pub order_index: i16,
}

impl Question {
    pub fn new(text: impl Into<String>, kind: QuestionKind) -> Self {
        Question {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            kind,
            difficulty: Difficulty::Easy,
            points: 1,
            explanation: None,
            tags: Vec::new(),
            answers: Vec::new(),
            short_answer_text: None,
            order_index: 0,
        }
    }

    pub fn correct_answer_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_correct).count()
    }
}
