use actix_web::{get, post, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    errors::AppError,
    models::dto::{
        request::{
            ExtractQuestionsRequest, GenerateFromFileRequest, GenerateQuestionsRequest,
            MultiAgentQuizRequest, TitleDescriptionRequest,
        },
        response::{DraftResponse, QuestionsResponse, TitleDescriptionResponse},
    },
    services::TitleOptions,
};

#[get("/health")]
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

#[post("/ai/generate-questions")]
async fn generate_questions(
    state: web::Data<AppState>,
    request: web::Json<GenerateQuestionsRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let result = state.pipeline_service.generate_questions(&request).await?;

    spawn_title_enrichment(&state, &request.content, &result.questions, request.api_key.clone());

    Ok(HttpResponse::Ok().json(QuestionsResponse::new(
        result.questions,
        result.selected_category,
    )))
}

#[post("/ai/extract-questions-ai")]
async fn extract_questions(
    state: web::Data<AppState>,
    request: web::Json<ExtractQuestionsRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let result = state.pipeline_service.extract_questions(&request).await?;

    // a legitimate empty extraction result does not need a title
    if !result.questions.is_empty() {
        spawn_title_enrichment(&state, &request.content, &result.questions, request.api_key.clone());
    }

    Ok(HttpResponse::Ok().json(QuestionsResponse::new(result.questions, None)))
}

#[post("/ai/generate-questions-from-file")]
async fn generate_questions_from_file(
    state: web::Data<AppState>,
    request: web::Json<GenerateFromFileRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let result = state.pipeline_service.generate_from_file(&request).await?;

    // attachment uploads carry no text sample to derive a title from
    if let Some(text) = &result.extracted_text {
        spawn_title_enrichment(&state, text, &result.questions, request.api_key.clone());
    }

    Ok(HttpResponse::Ok().json(QuestionsResponse::new(result.questions, None)))
}

#[post("/ai/generate-title-description")]
async fn generate_title_description(
    state: web::Data<AppState>,
    request: web::Json<TitleDescriptionRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let result = state
        .pipeline_service
        .generate_title_description(&request)
        .await?;

    Ok(HttpResponse::Ok().json(TitleDescriptionResponse::from(result)))
}

#[post("/ai/multi-agent-quiz")]
async fn multi_agent_quiz(
    state: web::Data<AppState>,
    request: web::Json<MultiAgentQuizRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let result = state.pipeline_service.multi_agent_quiz(&request).await?;

    spawn_title_enrichment(&state, &request.content, &result.questions, request.api_key.clone());

    Ok(HttpResponse::Ok().json(QuestionsResponse::new(result.questions, None)))
}

#[get("/ai/draft")]
async fn get_draft(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let draft = state.drafts.get().await;
    Ok(HttpResponse::Ok().json(DraftResponse {
        success: true,
        draft,
    }))
}

#[post("/ai/draft/reset")]
async fn reset_draft(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    state.drafts.reset().await;
    Ok(HttpResponse::Ok().json(DraftResponse {
        success: true,
        draft: None,
    }))
}

/// Fires the best-effort title/description enrichment without blocking the
/// response. Failures inside are logged and swallowed by the pipeline.
fn spawn_title_enrichment(
    state: &web::Data<AppState>,
    content: &str,
    questions: &[crate::models::domain::Question],
    api_key: Option<String>,
) {
    if questions.is_empty() {
        return;
    }
    let pipeline = state.pipeline_service.clone();
    let content = content.to_string();
    let question_texts: Vec<String> = questions.iter().map(|q| q.text.clone()).collect();
    let options = TitleOptions {
        target_language: None,
        model: None,
        api_key_override: api_key,
    };

    tokio::spawn(async move {
        pipeline
            .enrich_draft_title(content, question_texts, options)
            .await;
    });
}
