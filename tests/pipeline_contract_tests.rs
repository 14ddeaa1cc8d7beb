use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use tokio::sync::Mutex;

use quizforge_server::{
    errors::{AppError, GatewayError, ParseError},
    models::domain::{GenerationSettings, QuestionKind, QuestionSet},
    models::dto::request::{
        ExtractQuestionsRequest, GenerateFromFileRequest, GenerateQuestionsRequest,
        MultiAgentQuizRequest, TitleDescriptionRequest,
    },
    services::{ChatGateway, CompletionRequest, PipelineService, TitleOptions},
    store::{DraftStore, ResultCache},
};

/// Scripted gateway: pops pre-loaded responses and records every request it
/// sees, so tests can assert call counts and payloads without any network.
struct ScriptedGateway {
    responses: Mutex<VecDeque<Result<String, GatewayError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedGateway {
    fn new(responses: Vec<Result<String, GatewayError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    async fn request_at(&self, index: usize) -> CompletionRequest {
        self.requests.lock().await[index].clone()
    }
}

#[async_trait]
impl ChatGateway for ScriptedGateway {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GatewayError> {
        self.requests.lock().await.push(request.clone());
        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or(Err(GatewayError::EmptyResponse))
    }
}

struct Harness {
    gateway: Arc<ScriptedGateway>,
    drafts: Arc<DraftStore>,
    pipeline: PipelineService,
}

fn harness(responses: Vec<Result<String, GatewayError>>) -> Harness {
    let gateway = ScriptedGateway::new(responses);
    let drafts = Arc::new(DraftStore::in_memory());
    let pipeline = PipelineService::new(
        gateway.clone(),
        Arc::new(ResultCache::default()),
        drafts.clone(),
        "test-model".to_string(),
        "test-title-model".to_string(),
    );
    Harness {
        gateway,
        drafts,
        pipeline,
    }
}

fn questions_json(count: usize) -> String {
    let questions: Vec<serde_json::Value> = (0..count)
        .map(|i| {
            serde_json::json!({
                "text": format!("Question {}?", i),
                "type": "MULTIPLE_CHOICE",
                "answers": [
                    {"text": "right", "isCorrect": true},
                    {"text": "wrong"}
                ]
            })
        })
        .collect();
    serde_json::json!({ "questions": questions }).to_string()
}

fn generate_request(content: &str, count: u8) -> GenerateQuestionsRequest {
    GenerateQuestionsRequest {
        header: "Arithmetic quiz".to_string(),
        description: Some("Basics".to_string()),
        content: content.to_string(),
        api_key: None,
        model: None,
        settings: Some(GenerationSettings {
            number_of_questions: count,
            ..GenerationSettings::default()
        }),
        categories: None,
    }
}

fn extract_request(content: &str) -> ExtractQuestionsRequest {
    ExtractQuestionsRequest {
        header: "Extracted quiz".to_string(),
        description: None,
        content: content.to_string(),
        api_key: None,
        model: None,
        settings: None,
    }
}

#[tokio::test]
async fn generate_populates_draft_with_parsed_questions() {
    let h = harness(vec![Ok(questions_json(3))]);

    let result = h
        .pipeline
        .generate_questions(&generate_request("Addition facts", 3))
        .await
        .unwrap();

    assert_eq!(result.questions.len(), 3);
    assert_eq!(h.gateway.call_count().await, 1);

    let draft = h.drafts.get().await.expect("draft should be populated");
    assert_eq!(draft.title, "Arithmetic quiz");
    assert_eq!(draft.description, "Basics");
    assert_eq!(draft.questions.len(), 3);
    let orders: Vec<i16> = draft.questions.iter().map(|q| q.order_index).collect();
    assert_eq!(orders, vec![0, 1, 2]);

    // the prompt embedded the binding count
    let request = h.gateway.request_at(0).await;
    assert!(request.user_prompt.contains("EXACTLY 3 questions"));
}

#[tokio::test]
async fn extract_with_empty_result_is_success_not_error() {
    let h = harness(vec![Ok(r#"{"questions": []}"#.to_string())]);

    let result = h
        .pipeline
        .extract_questions(&extract_request("prose with no questions"))
        .await
        .unwrap();

    assert!(result.questions.is_empty());
}

#[tokio::test]
async fn generate_count_mismatch_is_lenient() {
    // five requested, the model returns two
    let h = harness(vec![Ok(questions_json(2))]);

    let result = h
        .pipeline
        .generate_questions(&generate_request("content", 5))
        .await
        .unwrap();

    assert_eq!(result.questions.len(), 2);
}

#[tokio::test]
async fn unparseable_output_fails_and_leaves_existing_draft_untouched() {
    let h = harness(vec![Ok("not json".to_string())]);

    let previous = QuestionSet::new("Existing", "Untouched");
    h.drafts.set_draft(previous.clone()).await;

    let err = h
        .pipeline
        .generate_questions(&generate_request("content", 3))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Parse(ParseError::NotJson(_))
    ));
    let draft = h.drafts.get().await.unwrap();
    assert_eq!(draft.title, "Existing");
}

#[tokio::test]
async fn missing_questions_field_is_fatal_in_extract_mode_too() {
    let h = harness(vec![Ok(r#"{"data": []}"#.to_string())]);

    let err = h
        .pipeline
        .extract_questions(&extract_request("content"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Parse(ParseError::MissingQuestionsField)
    ));
}

#[tokio::test]
async fn identical_inputs_hit_the_cache() {
    let h = harness(vec![Ok(questions_json(2)), Ok(questions_json(2))]);
    let request = generate_request("same content", 2);

    let first = h.pipeline.generate_questions(&request).await.unwrap();
    let second = h.pipeline.generate_questions(&request).await.unwrap();

    assert_eq!(first.questions, second.questions);
    // second run never reached the gateway
    assert_eq!(h.gateway.call_count().await, 1);
}

#[tokio::test]
async fn cache_hit_still_moves_the_draft_to_this_generation() {
    let h = harness(vec![Ok(questions_json(2)), Ok(questions_json(3))]);

    let mut first = generate_request("alpha content", 2);
    first.header = "First quiz".to_string();
    let mut second = generate_request("beta content", 2);
    second.header = "Second quiz".to_string();

    h.pipeline.generate_questions(&first).await.unwrap();
    h.pipeline.generate_questions(&second).await.unwrap();

    // repeating the first request is served from cache
    let repeated = h.pipeline.generate_questions(&first).await.unwrap();
    assert_eq!(repeated.questions.len(), 2);
    assert_eq!(h.gateway.call_count().await, 2);

    // the draft must match what the endpoint just returned
    let draft = h.drafts.get().await.unwrap();
    assert_eq!(draft.title, "First quiz");
    assert_eq!(draft.questions.len(), 2);
}

#[tokio::test]
async fn different_settings_do_not_share_cache_entries() {
    let h = harness(vec![Ok(questions_json(2)), Ok(questions_json(3))]);

    h.pipeline
        .generate_questions(&generate_request("same content", 2))
        .await
        .unwrap();
    let second = h
        .pipeline
        .generate_questions(&generate_request("same content", 3))
        .await
        .unwrap();

    assert_eq!(second.questions.len(), 3);
    assert_eq!(h.gateway.call_count().await, 2);
}

#[tokio::test]
async fn generate_and_extract_never_share_cache_entries() {
    let h = harness(vec![
        Ok(questions_json(1)),
        Ok(r#"{"questions": []}"#.to_string()),
    ]);

    // default settings on both, identical content
    let mut generate = generate_request("shared content", 5);
    generate.settings = None;
    h.pipeline.generate_questions(&generate).await.unwrap();

    let extracted = h
        .pipeline
        .extract_questions(&extract_request("shared content"))
        .await
        .unwrap();

    assert!(extracted.questions.is_empty());
    assert_eq!(h.gateway.call_count().await, 2);
}

#[tokio::test]
async fn quota_exhaustion_surfaces_without_retries() {
    let h = harness(vec![
        Err(GatewayError::QuotaExhausted("billing limit".to_string())),
        Ok(questions_json(1)),
    ]);

    let err = h
        .pipeline
        .generate_questions(&generate_request("content", 1))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Gateway(GatewayError::QuotaExhausted(_))
    ));
    assert_eq!(h.gateway.call_count().await, 1);
}

#[tokio::test]
async fn selected_category_is_returned_when_whitelist_given() {
    let response = serde_json::json!({
        "questions": [{"text": "Q?", "answers": [{"text": "a", "isCorrect": true}]}],
        "selectedCategory": "Mathematics"
    })
    .to_string();
    let h = harness(vec![Ok(response)]);

    let mut request = generate_request("content", 1);
    request.categories = Some(vec!["Mathematics".to_string(), "History".to_string()]);

    let result = h.pipeline.generate_questions(&request).await.unwrap();
    assert_eq!(result.selected_category.as_deref(), Some("Mathematics"));

    let sent = h.gateway.request_at(0).await;
    assert!(sent.user_prompt.contains("selectedCategory"));
    assert!(sent.user_prompt.contains("Mathematics, History"));
}

#[tokio::test]
async fn markdown_file_is_extracted_then_generated() {
    let h = harness(vec![Ok(questions_json(1))]);

    let markdown = "# Fractions\n\nHalves and quarters.";
    let request = GenerateFromFileRequest {
        header: "Fractions".to_string(),
        description: None,
        file_name: "notes.md".to_string(),
        file_content: base64::engine::general_purpose::STANDARD.encode(markdown),
        api_key: None,
        model: None,
        settings: None,
    };

    let result = h.pipeline.generate_from_file(&request).await.unwrap();
    assert_eq!(result.questions.len(), 1);
    // the recovered text comes back so the caller can enrich the title
    assert!(result
        .extracted_text
        .as_deref()
        .is_some_and(|t| t.contains("Halves and quarters.")));

    let sent = h.gateway.request_at(0).await;
    assert!(sent.user_prompt.contains("Fractions"));
    assert!(sent.user_prompt.contains("Halves and quarters."));
    assert!(sent.attachment.is_none());
}

#[tokio::test]
async fn pdf_file_is_sent_as_attachment() {
    let h = harness(vec![Ok(questions_json(1))]);

    let request = GenerateFromFileRequest {
        header: "Scanned quiz".to_string(),
        description: None,
        file_name: "scan.pdf".to_string(),
        file_content: base64::engine::general_purpose::STANDARD.encode(b"%PDF-1.4 fake"),
        api_key: None,
        model: None,
        settings: None,
    };

    let result = h.pipeline.generate_from_file(&request).await.unwrap();
    assert_eq!(result.questions.len(), 1);
    // no text sample exists for title enrichment on this path
    assert!(result.extracted_text.is_none());

    let sent = h.gateway.request_at(0).await;
    let attachment = sent.attachment.expect("pdf should ride as an attachment");
    assert_eq!(attachment.mime_type, "application/pdf");
}

#[tokio::test]
async fn invalid_base64_file_content_is_a_validation_error() {
    let h = harness(vec![]);

    let request = GenerateFromFileRequest {
        header: "H".to_string(),
        description: None,
        file_name: "notes.txt".to_string(),
        file_content: "!!!not-base64!!!".to_string(),
        api_key: None,
        model: None,
        settings: None,
    };

    let err = h.pipeline.generate_from_file(&request).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError { .. }));
    assert_eq!(h.gateway.call_count().await, 0);
}

#[tokio::test]
async fn unsupported_file_format_never_reaches_the_gateway() {
    let h = harness(vec![]);

    let request = GenerateFromFileRequest {
        header: "H".to_string(),
        description: None,
        file_name: "sheet.xlsx".to_string(),
        file_content: base64::engine::general_purpose::STANDARD.encode(b"PK"),
        api_key: None,
        model: None,
        settings: None,
    };

    let err = h.pipeline.generate_from_file(&request).await.unwrap_err();
    assert!(matches!(err, AppError::FileParse(_)));
    assert_eq!(h.gateway.call_count().await, 0);
}

#[tokio::test]
async fn multi_agent_runs_all_steps_and_parses_formatter_output() {
    let h = harness(vec![
        Ok("outline of facts".to_string()),
        Ok("drafted questions".to_string()),
        Ok("reviewed questions".to_string()),
        Ok(questions_json(2)),
    ]);

    let request = MultiAgentQuizRequest {
        header: "Workflow quiz".to_string(),
        description: None,
        content: "source material".to_string(),
        api_key: None,
        model: None,
        settings: Some(GenerationSettings {
            number_of_questions: 2,
            ..GenerationSettings::default()
        }),
    };

    let result = h.pipeline.multi_agent_quiz(&request).await.unwrap();

    assert_eq!(result.questions.len(), 2);
    assert_eq!(h.gateway.call_count().await, 4);

    // intermediate steps feed forward; only the formatter demands JSON
    let reviewer = h.gateway.request_at(2).await;
    assert!(reviewer.user_prompt.contains("drafted questions"));
    assert!(!reviewer.force_json);
    let formatter = h.gateway.request_at(3).await;
    assert!(formatter.user_prompt.contains("reviewed questions"));
    assert!(formatter.force_json);
}

#[tokio::test]
async fn multi_agent_step_failure_aborts_the_workflow() {
    let h = harness(vec![
        Ok("outline".to_string()),
        Err(GatewayError::ServerError("upstream down".to_string())),
    ]);

    let request = MultiAgentQuizRequest {
        header: "H".to_string(),
        description: None,
        content: "content".to_string(),
        api_key: None,
        model: None,
        settings: None,
    };

    let err = h.pipeline.multi_agent_quiz(&request).await.unwrap_err();
    assert!(matches!(err, AppError::Gateway(GatewayError::ServerError(_))));
    assert_eq!(h.gateway.call_count().await, 2);
    assert!(h.drafts.get().await.is_none());
}

#[tokio::test]
async fn title_enrichment_updates_the_draft() {
    let h = harness(vec![Ok(
        r#"{"title": "Fractions Basics", "description": "Halves and quarters"}"#.to_string(),
    )]);

    let mut draft = QuestionSet::new("fallback header", "");
    draft
        .questions
        .push(quizforge_server::models::domain::Question::new(
            "Q?",
            QuestionKind::MultipleChoice,
        ));
    h.drafts.set_draft(draft).await;

    h.pipeline
        .enrich_draft_title(
            "Halves and quarters content".to_string(),
            vec!["Q?".to_string()],
            TitleOptions::default(),
        )
        .await;

    let draft = h.drafts.get().await.unwrap();
    assert_eq!(draft.title, "Fractions Basics");
    assert_eq!(draft.description, "Halves and quarters");
    // questions survive enrichment untouched
    assert_eq!(draft.questions.len(), 1);
}

#[tokio::test]
async fn title_enrichment_failure_is_swallowed() {
    let h = harness(vec![Err(GatewayError::ServerError("boom".to_string()))]);

    h.drafts
        .set_draft(QuestionSet::new("fallback header", "fallback description"))
        .await;

    // must not panic or propagate
    h.pipeline
        .enrich_draft_title("content".to_string(), vec![], TitleOptions::default())
        .await;

    let draft = h.drafts.get().await.unwrap();
    assert_eq!(draft.title, "fallback header");
    assert_eq!(draft.description, "fallback description");
}

#[tokio::test]
async fn title_description_endpoint_path_detects_language() {
    let h = harness(vec![Ok(
        r#"{"title": "T", "description": "D"}"#.to_string()
    )]);

    let request = TitleDescriptionRequest {
        content: "Rust 是一种编程语言".to_string(),
        questions: vec!["什么是 Rust?".to_string()],
        target_language: None,
        api_key: None,
        model: None,
    };

    let result = h
        .pipeline
        .generate_title_description(&request)
        .await
        .unwrap();
    assert_eq!(result.title, "T");

    let sent = h.gateway.request_at(0).await;
    assert!(sent.user_prompt.contains("Target language: Chinese"));
}
