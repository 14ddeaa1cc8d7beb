use serde::{Deserialize, Serialize};

use super::question::{Difficulty, Question, QuestionKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Private,
    Public,
    Unlisted,
}

/// How strictly the requested question count binds the generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CountMode {
    Exact,
    UpTo,
}

/// Flat generation/behaviour configuration carried by a question set.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationSettings {
    pub visibility: Visibility,
    /// BCP-47-ish language code, or "auto" to detect from content.
    pub language: String,
    pub question_kind: Option<QuestionKind>,
    pub number_of_questions: u8,
    pub count_mode: CountMode,
    pub difficulty: Option<Difficulty>,
    pub shuffle_questions: bool,
    pub shuffle_answers: bool,
    pub time_limit_minutes: Option<u16>,
    pub passing_score: Option<u8>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        GenerationSettings {
            visibility: Visibility::Private,
            language: "auto".to_string(),
            question_kind: None,
            number_of_questions: 5,
            count_mode: CountMode::Exact,
            difficulty: None,
            shuffle_questions: false,
            shuffle_answers: false,
            time_limit_minutes: None,
            passing_score: None,
        }
    }
}

/// The editable quiz draft. Only these fields survive a restart; transient
/// editor flags live in the store, not here.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSet {
    pub title: String,
    pub description: String,
    pub questions: Vec<Question>,
    pub settings: GenerationSettings,
}

impl QuestionSet {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        QuestionSet {
            title: title.into(),
            description: description.into(),
            questions: Vec::new(),
            settings: GenerationSettings::default(),
        }
    }
}

/// A generated title/description pair produced by the enrichment call.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct TitleDescription {
    pub title: String,
    pub description: String,
}
