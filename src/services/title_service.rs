use std::sync::Arc;

use crate::errors::AppResult;
use crate::models::domain::TitleDescription;
use crate::services::gateway::{ChatGateway, CompletionRequest};
use crate::services::language;
use crate::services::parser;
use crate::services::prompt_builder::PromptBuilder;
use crate::store::{CacheKey, CacheValue, OperationKind, ResultCache};

/// Content sample passed to the enrichment prompt; a fraction of the main
/// prompt budget is plenty for a title.
const TITLE_SAMPLE_CHARS: usize = 1_500;

#[derive(Clone, Debug, Default)]
pub struct TitleOptions {
    /// Language code or "auto".
    pub target_language: Option<String>,
    pub model: Option<String>,
    pub api_key_override: Option<String>,
}

/// Secondary LLM call deriving a human-readable title and description from
/// the generated question set. Best-effort enrichment; callers must never
/// fail the primary result on its account.
pub struct TitleDescriptionService {
    gateway: Arc<dyn ChatGateway>,
    cache: Arc<ResultCache>,
    default_model: String,
}

impl TitleDescriptionService {
    pub fn new(
        gateway: Arc<dyn ChatGateway>,
        cache: Arc<ResultCache>,
        default_model: String,
    ) -> Self {
        TitleDescriptionService {
            gateway,
            cache,
            default_model,
        }
    }

    pub async fn generate(
        &self,
        content: &str,
        question_texts: &[String],
        options: &TitleOptions,
    ) -> AppResult<TitleDescription> {
        let target = options.target_language.as_deref().unwrap_or("auto");
        let lang = language::resolve(target, content);

        let model = options
            .model
            .clone()
            .unwrap_or_else(|| self.default_model.clone());

        let cache_content = format!("{}\n{}", content, question_texts.join("\n"));
        let cache_key = CacheKey::new(
            OperationKind::TitleDescription,
            &cache_content,
            &format!("{}:{}", lang.code(), model),
        );
        if let Some(CacheValue::TitleDescription(cached)) = self.cache.get(&cache_key).await {
            log::debug!("Title/description cache hit");
            return Ok(cached);
        }

        let sample: String = content.chars().take(TITLE_SAMPLE_CHARS).collect();
        let prompt = PromptBuilder::build_title_description(&sample, question_texts, lang.name());

        let mut request = CompletionRequest::new(model, prompt.system, prompt.user);
        request.max_tokens = 512;
        request.api_key_override = options.api_key_override.clone();

        let raw = self.gateway.complete(&request).await?;
        let result = parser::parse_title_description(&raw)?;

        self.cache
            .insert(cache_key, CacheValue::TitleDescription(result.clone()))
            .await;

        Ok(result)
    }
}
