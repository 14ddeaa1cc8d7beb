use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::errors::ParseError;
use crate::models::domain::{
    Answer, Difficulty, Question, QuestionKind, TitleDescription,
};

/// Distinguishes the two correctness contracts: an empty `questions` array is
/// a valid extraction result, while a generate-mode count mismatch is logged
/// but not fatal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseMode {
    Generate { expected_count: Option<u8> },
    Extract,
}

/// Model output is untrusted free text; every field is optional here and
/// normalization fills the canonical defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawQuestion {
    id: Option<String>,
    text: Option<String>,
    /// Some models answer with `question` instead of `text`.
    question: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    difficulty: Option<String>,
    points: Option<i64>,
    explanation: Option<String>,
    tags: Option<Vec<String>>,
    answers: Option<Vec<RawAnswer>>,
    short_answer_text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawAnswer {
    id: Option<String>,
    text: Option<String>,
    is_correct: Option<bool>,
    order_index: Option<i64>,
    explanation: Option<String>,
}

/// Parses raw gateway text into canonical questions.
pub fn parse_questions(raw: &str, mode: ParseMode) -> Result<Vec<Question>, ParseError> {
    let root = parse_json_root(raw)?;

    let questions_value = match root.get("questions") {
        Some(Value::Array(items)) => items,
        _ => return Err(ParseError::MissingQuestionsField),
    };

    let mut questions = Vec::with_capacity(questions_value.len());
    for item in questions_value {
        if !item.is_object() {
            log::warn!("Skipping non-object entry in questions array");
            continue;
        }
        let raw_question: RawQuestion = match serde_json::from_value(item.clone()) {
            Ok(q) => q,
            Err(e) => {
                log::warn!("Skipping malformed question entry: {}", e);
                continue;
            }
        };
        let position = questions.len();
        questions.push(normalize_question(raw_question, position));
    }

    if let ParseMode::Generate {
        expected_count: Some(expected),
    } = mode
    {
        // Lenient by design: the caller receives whatever came back.
        if questions.len() != expected as usize {
            log::warn!(
                "Model returned {} questions, {} were requested",
                questions.len(),
                expected
            );
        }
    }

    Ok(questions)
}

/// Pulls the category the model picked when a whitelist was supplied.
pub fn parse_selected_category(raw: &str) -> Option<String> {
    let root = parse_json_root(raw).ok()?;
    root.get("selectedCategory")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Parses the `{title, description}` enrichment output. Missing fields
/// default to empty strings; anything non-JSON is still a hard failure.
pub fn parse_title_description(raw: &str) -> Result<TitleDescription, ParseError> {
    let root = parse_json_root(raw)?;
    let field = |name: &str| {
        root.get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string()
    };
    Ok(TitleDescription {
        title: field("title"),
        description: field("description"),
    })
}

fn parse_json_root(raw: &str) -> Result<Value, ParseError> {
    let cleaned = strip_code_fences(raw);
    serde_json::from_str(cleaned).map_err(|e| ParseError::NotJson(e.to_string()))
}

/// Models routinely wrap JSON in ```json fences despite instructions.
static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:json)?\s*(.*?)\s*```$").expect("valid fence regex"));

fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    match CODE_FENCE.captures(trimmed).and_then(|caps| caps.get(1)) {
        Some(inner) => inner.as_str(),
        None => trimmed,
    }
}

fn normalize_question(raw: RawQuestion, position: usize) -> Question {
    let kind = raw
        .kind
        .as_deref()
        .map(QuestionKind::parse_lenient)
        .unwrap_or(QuestionKind::MultipleChoice);

    let answers = match kind {
        // short-answer kinds carry the expected value separately
        QuestionKind::FillBlank | QuestionKind::FreeResponse => Vec::new(),
        _ => raw
            .answers
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(i, a)| normalize_answer(a, i))
            .collect(),
    };

    Question {
        id: raw.id.filter(|s| !s.trim().is_empty()).unwrap_or_else(new_id),
        text: raw.text.or(raw.question).unwrap_or_default(),
        kind,
        difficulty: raw
            .difficulty
            .as_deref()
            .map(Difficulty::parse_lenient)
            .unwrap_or(Difficulty::Easy),
        points: raw.points.map(|p| p.clamp(1, i16::MAX as i64) as i16).unwrap_or(1),
        explanation: raw.explanation.filter(|s| !s.trim().is_empty()),
        tags: raw.tags.unwrap_or_default(),
        answers,
        short_answer_text: raw.short_answer_text.filter(|s| !s.trim().is_empty()),
        order_index: position as i16,
    }
}

fn normalize_answer(raw: RawAnswer, position: usize) -> Answer {
    Answer {
        id: raw.id.filter(|s| !s.trim().is_empty()).unwrap_or_else(new_id),
        text: raw.text.unwrap_or_default(),
        is_correct: raw.is_correct.unwrap_or(false),
        order_index: raw
            .order_index
            .map(|i| i.clamp(0, i16::MAX as i64) as i16)
            .unwrap_or(position as i16),
        explanation: raw.explanation.filter(|s| !s.trim().is_empty()),
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}
