use std::sync::Arc;

use base64::Engine;

use crate::errors::{AppError, AppResult};
use crate::models::domain::{GenerationSettings, Question, QuestionSet, TitleDescription};
use crate::models::dto::request::{
    ExtractQuestionsRequest, GenerateFromFileRequest, GenerateQuestionsRequest,
    MultiAgentQuizRequest, TitleDescriptionRequest,
};
use crate::services::extractor::{self, ExtractedContent};
use crate::services::gateway::{Attachment, ChatGateway, CompletionRequest};
use crate::services::multi_agent::MultiAgentWorkflow;
use crate::services::parser::{self, ParseMode};
use crate::services::prompt_builder::{clamp_count, PromptBuilder, PromptTask};
use crate::services::title_service::{TitleDescriptionService, TitleOptions};
use crate::store::{CacheKey, CacheValue, DraftPatch, DraftStore, OperationKind, ResultCache};

#[derive(Debug)]
pub struct QuestionsResult {
    pub questions: Vec<Question>,
    pub selected_category: Option<String>,
    /// Plain text recovered from an uploaded file, exposed so the HTTP edge
    /// can run title enrichment on it. `None` for direct-content requests
    /// (callers already hold the content) and for attachment uploads.
    pub extracted_text: Option<String>,
}

/// Orchestrates one pipeline invocation: extract file, build prompt, call
/// gateway, parse, populate the draft. Title enrichment is exposed as a
/// separate best-effort call so the HTTP edge can fire it without blocking
/// the primary response.
pub struct PipelineService {
    gateway: Arc<dyn ChatGateway>,
    cache: Arc<ResultCache>,
    drafts: Arc<DraftStore>,
    title_service: TitleDescriptionService,
    multi_agent: MultiAgentWorkflow,
    default_model: String,
}

impl PipelineService {
    pub fn new(
        gateway: Arc<dyn ChatGateway>,
        cache: Arc<ResultCache>,
        drafts: Arc<DraftStore>,
        default_model: String,
        title_model: String,
    ) -> Self {
        PipelineService {
            title_service: TitleDescriptionService::new(
                gateway.clone(),
                cache.clone(),
                title_model,
            ),
            multi_agent: MultiAgentWorkflow::new(gateway.clone(), default_model.clone()),
            gateway,
            cache,
            drafts,
            default_model,
        }
    }

    pub fn drafts(&self) -> &Arc<DraftStore> {
        &self.drafts
    }

    pub async fn generate_questions(
        &self,
        request: &GenerateQuestionsRequest,
    ) -> AppResult<QuestionsResult> {
        let settings = request.settings.clone().unwrap_or_default();
        self.run_text_pipeline(
            PromptTask::Generate,
            OperationKind::Generate,
            &request.header,
            request.description.as_deref(),
            &settings,
            &request.content,
            request.categories.as_deref(),
            request.model.as_deref(),
            request.api_key.as_deref(),
        )
        .await
    }

    pub async fn extract_questions(
        &self,
        request: &ExtractQuestionsRequest,
    ) -> AppResult<QuestionsResult> {
        let settings = request.settings.clone().unwrap_or_default();
        self.run_text_pipeline(
            PromptTask::Extract,
            OperationKind::Extract,
            &request.header,
            request.description.as_deref(),
            &settings,
            &request.content,
            None,
            request.model.as_deref(),
            request.api_key.as_deref(),
        )
        .await
    }

    pub async fn generate_from_file(
        &self,
        request: &GenerateFromFileRequest,
    ) -> AppResult<QuestionsResult> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&request.file_content)
            .map_err(|_| AppError::validation("fileContent is not valid base64"))?;

        let settings = request.settings.clone().unwrap_or_default();

        match extractor::extract_content(&request.file_name, &bytes)? {
            ExtractedContent::Text(text) => {
                let mut result = self
                    .run_text_pipeline(
                        PromptTask::Generate,
                        OperationKind::Generate,
                        &request.header,
                        request.description.as_deref(),
                        &settings,
                        &text,
                        None,
                        request.model.as_deref(),
                        request.api_key.as_deref(),
                    )
                    .await?;
                result.extracted_text = Some(text);
                Ok(result)
            }
            ExtractedContent::Attachment(attachment) => {
                self.run_attachment_pipeline(request, &settings, attachment)
                    .await
            }
        }
    }

    pub async fn generate_title_description(
        &self,
        request: &TitleDescriptionRequest,
    ) -> AppResult<TitleDescription> {
        let options = TitleOptions {
            target_language: request.target_language.clone(),
            model: request.model.clone(),
            api_key_override: request.api_key.clone(),
        };
        self.title_service
            .generate(&request.content, &request.questions, &options)
            .await
    }

    pub async fn multi_agent_quiz(
        &self,
        request: &MultiAgentQuizRequest,
    ) -> AppResult<QuestionsResult> {
        let settings = request.settings.clone().unwrap_or_default();
        let settings_fp = self.settings_fingerprint(&settings, None, request.model.as_deref())?;
        let cache_key = CacheKey::new(OperationKind::MultiAgent, &request.content, &settings_fp);

        if let Some(CacheValue::Questions(questions)) = self.cache.get(&cache_key).await {
            log::info!("Multi-agent cache hit, skipping workflow");
            // the draft still moves to this generation
            self.populate_draft(
                request.header.clone(),
                request.description.clone(),
                questions.clone(),
                settings,
            )
            .await;
            return Ok(QuestionsResult {
                questions,
                selected_category: None,
                extracted_text: None,
            });
        }

        let outcome = self
            .multi_agent
            .run(
                &request.header,
                request.description.as_deref(),
                &settings,
                &request.content,
                request.model.as_deref(),
                request.api_key.as_deref(),
            )
            .await?;

        for step_name in outcome.step_results.keys() {
            log::debug!("Multi-agent step '{}' completed", step_name);
        }

        self.cache
            .insert(cache_key, CacheValue::Questions(outcome.questions.clone()))
            .await;
        self.populate_draft(request.header.clone(), request.description.clone(),
            outcome.questions.clone(), settings).await;

        Ok(QuestionsResult {
            questions: outcome.questions,
            selected_category: None,
            extracted_text: None,
        })
    }

    /// Best-effort draft enrichment. Never fails the caller: errors are
    /// logged and the draft keeps its fallback title/description.
    pub async fn enrich_draft_title(
        &self,
        content: String,
        question_texts: Vec<String>,
        options: TitleOptions,
    ) {
        match self
            .title_service
            .generate(&content, &question_texts, &options)
            .await
        {
            Ok(generated) => {
                let patch = DraftPatch {
                    title: Some(generated.title),
                    description: Some(generated.description),
                    settings: None,
                };
                if let Err(e) = self.drafts.update_draft(patch).await {
                    log::warn!("Draft replaced before title enrichment applied: {}", e);
                }
            }
            Err(e) => {
                log::warn!("Title/description enrichment failed, keeping fallback: {}", e);
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn run_text_pipeline(
        &self,
        task: PromptTask,
        operation: OperationKind,
        header: &str,
        description: Option<&str>,
        settings: &GenerationSettings,
        content: &str,
        categories: Option<&[String]>,
        model: Option<&str>,
        api_key: Option<&str>,
    ) -> AppResult<QuestionsResult> {
        let settings_fp = self.settings_fingerprint(settings, categories, model)?;
        let cache_key = CacheKey::new(operation, content, &settings_fp);

        if let Some(CacheValue::Questions(questions)) = self.cache.get(&cache_key).await {
            log::info!("Pipeline cache hit for {:?}, skipping gateway call", operation);
            // the cache only spares the gateway call; the draft still moves
            // to this generation
            self.populate_draft(
                header.to_string(),
                description.map(String::from),
                questions.clone(),
                settings.clone(),
            )
            .await;
            return Ok(QuestionsResult {
                questions,
                selected_category: None,
                extracted_text: None,
            });
        }

        let prompt = PromptBuilder::build(task, header, description, settings, content, categories);

        let mut completion = CompletionRequest::new(
            model.unwrap_or(&self.default_model),
            prompt.system,
            prompt.user,
        );
        completion.api_key_override = api_key.map(String::from);

        let raw = self.gateway.complete(&completion).await?;

        let mode = match task {
            PromptTask::Generate => ParseMode::Generate {
                expected_count: Some(clamp_count(settings.number_of_questions)),
            },
            PromptTask::Extract => ParseMode::Extract,
        };
        let questions = parser::parse_questions(&raw, mode)?;
        let selected_category = categories
            .filter(|c| !c.is_empty())
            .and_then(|_| parser::parse_selected_category(&raw));

        self.cache
            .insert(cache_key, CacheValue::Questions(questions.clone()))
            .await;
        self.populate_draft(
            header.to_string(),
            description.map(String::from),
            questions.clone(),
            settings.clone(),
        )
        .await;

        Ok(QuestionsResult {
            questions,
            selected_category,
            extracted_text: None,
        })
    }

    async fn run_attachment_pipeline(
        &self,
        request: &GenerateFromFileRequest,
        settings: &GenerationSettings,
        attachment: Attachment,
    ) -> AppResult<QuestionsResult> {
        let settings_fp =
            self.settings_fingerprint(settings, None, request.model.as_deref())?;
        // the base64 payload stands in for content in the cache key
        let cache_key = CacheKey::new(
            OperationKind::Generate,
            &attachment.data_base64,
            &settings_fp,
        );

        if let Some(CacheValue::Questions(questions)) = self.cache.get(&cache_key).await {
            log::info!("Pipeline cache hit for attachment, skipping gateway call");
            self.populate_draft(
                request.header.clone(),
                request.description.clone(),
                questions.clone(),
                settings.clone(),
            )
            .await;
            return Ok(QuestionsResult {
                questions,
                selected_category: None,
                extracted_text: None,
            });
        }

        let prompt = PromptBuilder::build(
            PromptTask::Generate,
            &request.header,
            request.description.as_deref(),
            settings,
            "The source material is the attached document.",
            None,
        );

        let mut completion = CompletionRequest::new(
            request.model.as_deref().unwrap_or(&self.default_model),
            prompt.system,
            prompt.user,
        );
        completion.attachment = Some(attachment);
        completion.api_key_override = request.api_key.clone();

        let raw = self.gateway.complete(&completion).await?;
        let questions = parser::parse_questions(
            &raw,
            ParseMode::Generate {
                expected_count: Some(clamp_count(settings.number_of_questions)),
            },
        )?;

        self.cache
            .insert(cache_key, CacheValue::Questions(questions.clone()))
            .await;
        self.populate_draft(
            request.header.clone(),
            request.description.clone(),
            questions.clone(),
            settings.clone(),
        )
        .await;

        Ok(QuestionsResult {
            questions,
            selected_category: None,
            extracted_text: None,
        })
    }

    /// Replaces the draft wholesale; a new generation discards the previous
    /// draft (last-writer-wins under the store's write lock).
    async fn populate_draft(
        &self,
        header: String,
        description: Option<String>,
        questions: Vec<Question>,
        settings: GenerationSettings,
    ) {
        self.drafts
            .set_draft(QuestionSet {
                title: header,
                description: description.unwrap_or_default(),
                questions,
                settings,
            })
            .await;
    }

    fn settings_fingerprint(
        &self,
        settings: &GenerationSettings,
        categories: Option<&[String]>,
        model: Option<&str>,
    ) -> AppResult<String> {
        let mut canonical = serde_json::to_string(settings)?;
        if let Some(categories) = categories {
            canonical.push('|');
            canonical.push_str(&categories.join(","));
        }
        canonical.push('|');
        canonical.push_str(model.unwrap_or(&self.default_model));
        Ok(canonical)
    }
}
