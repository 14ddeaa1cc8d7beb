use std::path::PathBuf;

use tokio::sync::RwLock;

use crate::errors::{AppError, AppResult};
use crate::models::domain::{
    Answer, Difficulty, GenerationSettings, Question, QuestionKind, QuestionSet,
};

/// Shallow-merge patch for the draft's top-level fields.
#[derive(Clone, Debug, Default)]
pub struct DraftPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub settings: Option<GenerationSettings>,
}

/// Shallow-merge patch for a single question.
#[derive(Clone, Debug, Default)]
pub struct QuestionPatch {
    pub text: Option<String>,
    pub kind: Option<QuestionKind>,
    pub difficulty: Option<Difficulty>,
    pub points: Option<i16>,
    pub explanation: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub answers: Option<Vec<Answer>>,
    pub short_answer_text: Option<Option<String>>,
}

/// Holds the single editable quiz draft. The write lock serializes racing
/// pipeline runs: the last `set_draft` to acquire it wins, wholesale.
///
/// Only `{title, description, questions, settings}` are persisted; transient
/// editor flags never reach disk because they are not part of `QuestionSet`.
pub struct DraftStore {
    inner: RwLock<Option<QuestionSet>>,
    persist_path: Option<PathBuf>,
}

impl DraftStore {
    pub fn new(persist_path: Option<PathBuf>) -> Self {
        let initial = persist_path.as_deref().and_then(|path| {
            let data = std::fs::read_to_string(path).ok()?;
            match serde_json::from_str::<QuestionSet>(&data) {
                Ok(set) => Some(set),
                Err(e) => {
                    log::warn!("Ignoring corrupt draft file {}: {}", path.display(), e);
                    None
                }
            }
        });

        DraftStore {
            inner: RwLock::new(initial),
            persist_path,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(None)
    }

    pub async fn get(&self) -> Option<QuestionSet> {
        self.inner.read().await.clone()
    }

    /// Replaces the current draft wholesale (last-writer-wins).
    pub async fn set_draft(&self, mut set: QuestionSet) {
        reindex(&mut set.questions);
        let mut guard = self.inner.write().await;
        *guard = Some(set);
        self.persist(guard.as_ref()).await;
    }

    pub async fn reset(&self) {
        let mut guard = self.inner.write().await;
        *guard = None;
        self.persist(None).await;
    }

    pub async fn update_draft(&self, patch: DraftPatch) -> AppResult<QuestionSet> {
        let mut guard = self.inner.write().await;
        let draft = guard
            .as_mut()
            .ok_or_else(|| AppError::NotFound("No draft in progress".to_string()))?;

        if let Some(title) = patch.title {
            draft.title = title;
        }
        if let Some(description) = patch.description {
            draft.description = description;
        }
        if let Some(settings) = patch.settings {
            draft.settings = settings;
        }

        let updated = draft.clone();
        self.persist(guard.as_ref()).await;
        Ok(updated)
    }

    pub async fn add_question(&self, question: Question) -> AppResult<QuestionSet> {
        let mut guard = self.inner.write().await;
        let draft = guard
            .as_mut()
            .ok_or_else(|| AppError::NotFound("No draft in progress".to_string()))?;

        if draft.questions.iter().any(|q| q.id == question.id) {
            return Err(AppError::AlreadyExists(format!(
                "Question with id '{}' already in draft",
                question.id
            )));
        }

        draft.questions.push(question);
        reindex(&mut draft.questions);

        let updated = draft.clone();
        self.persist(guard.as_ref()).await;
        Ok(updated)
    }

    pub async fn update_question(&self, id: &str, patch: QuestionPatch) -> AppResult<Question> {
        let mut guard = self.inner.write().await;
        let draft = guard
            .as_mut()
            .ok_or_else(|| AppError::NotFound("No draft in progress".to_string()))?;

        let question = draft
            .questions
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Question with id '{}' not found", id)))?;

        if let Some(text) = patch.text {
            question.text = text;
        }
        if let Some(kind) = patch.kind {
            question.kind = kind;
        }
        if let Some(difficulty) = patch.difficulty {
            question.difficulty = difficulty;
        }
        if let Some(points) = patch.points {
            question.points = points.max(1);
        }
        if let Some(explanation) = patch.explanation {
            question.explanation = explanation;
        }
        if let Some(tags) = patch.tags {
            question.tags = tags;
        }
        if let Some(answers) = patch.answers {
            question.answers = answers;
            for (i, answer) in question.answers.iter_mut().enumerate() {
                answer.order_index = i as i16;
            }
        }
        if let Some(short_answer_text) = patch.short_answer_text {
            question.short_answer_text = short_answer_text;
        }

        let updated = question.clone();
        self.persist(guard.as_ref()).await;
        Ok(updated)
    }

    pub async fn delete_question(&self, id: &str) -> AppResult<QuestionSet> {
        let mut guard = self.inner.write().await;
        let draft = guard
            .as_mut()
            .ok_or_else(|| AppError::NotFound("No draft in progress".to_string()))?;

        let before = draft.questions.len();
        draft.questions.retain(|q| q.id != id);
        if draft.questions.len() == before {
            return Err(AppError::NotFound(format!(
                "Question with id '{}' not found",
                id
            )));
        }
        reindex(&mut draft.questions);

        let updated = draft.clone();
        self.persist(guard.as_ref()).await;
        Ok(updated)
    }

    pub async fn move_question(&self, from: usize, to: usize) -> AppResult<QuestionSet> {
        let mut guard = self.inner.write().await;
        let draft = guard
            .as_mut()
            .ok_or_else(|| AppError::NotFound("No draft in progress".to_string()))?;

        let len = draft.questions.len();
        if from >= len || to >= len {
            return Err(AppError::validation(format!(
                "Move out of bounds: from={}, to={}, len={}",
                from, to, len
            )));
        }

        let question = draft.questions.remove(from);
        draft.questions.insert(to, question);
        reindex(&mut draft.questions);

        let updated = draft.clone();
        self.persist(guard.as_ref()).await;
        Ok(updated)
    }

    async fn persist(&self, draft: Option<&QuestionSet>) {
        let Some(path) = &self.persist_path else {
            return;
        };
        let result = match draft {
            Some(set) => match serde_json::to_vec_pretty(set) {
                Ok(data) => tokio::fs::write(path, data).await,
                Err(e) => {
                    log::error!("Failed to serialize draft: {}", e);
                    return;
                }
            },
            None => match tokio::fs::remove_file(path).await {
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                other => other,
            },
        };
        if let Err(e) = result {
            log::error!("Failed to persist draft to {}: {}", path.display(), e);
        }
    }
}

/// Keeps `order_index` a contiguous 0-based sequence after any mutation.
fn reindex(questions: &mut [Question]) {
    for (i, question) in questions.iter_mut().enumerate() {
        question.order_index = i as i16;
    }
}
