use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};

use crate::errors::GatewayError;

/// Inline attachment for multimodal models, already base64-encoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    pub mime_type: String,
    pub data_base64: String,
}

#[derive(Clone, Debug)]
pub struct CompletionRequest {
    pub model: String,
    pub system_prompt: String,
    pub user_prompt: String,
    pub attachment: Option<Attachment>,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Ask the endpoint for a JSON object response when it supports it.
    pub force_json: bool,
    /// Per-request key overriding the configured one.
    pub api_key_override: Option<String>,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, system_prompt: String, user_prompt: String) -> Self {
        CompletionRequest {
            model: model.into(),
            system_prompt,
            user_prompt,
            attachment: None,
            temperature: 0.7,
            max_tokens: 4096,
            force_json: true,
            api_key_override: None,
        }
    }
}

/// The external chat-completion service, seen from the pipeline.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatGateway: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GatewayError>;
}

/// Bounded retry for transient rate limiting. Only `RateLimited` is
/// retryable; quota exhaustion and every other failure surface immediately.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Exponential backoff: base, 2*base, 4*base, ...
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(retry)
    }
}

/// Runs `op` under `policy`. Cancellation is cooperative: dropping the
/// returned future aborts the in-flight attempt and any pending backoff
/// sleep.
pub async fn with_retry<F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<String, GatewayError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, GatewayError>>,
{
    let mut retry = 0;
    loop {
        match op().await {
            Err(GatewayError::RateLimited) if retry < policy.max_retries => {
                let delay = policy.delay_for(retry);
                log::warn!(
                    "Gateway rate limited, retry {}/{} after {:?}",
                    retry + 1,
                    policy.max_retries,
                    delay
                );
                tokio::time::sleep(delay).await;
                retry += 1;
            }
            other => return other,
        }
    }
}

/// reqwest-backed implementation speaking the OpenAI-compatible
/// `POST {base_url}/chat/completions` contract.
pub struct HttpChatGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    timeout: Duration,
    retry_policy: RetryPolicy,
}

impl HttpChatGateway {
    pub fn new(base_url: impl Into<String>, api_key: SecretString, timeout: Duration) -> Self {
        HttpChatGateway {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key,
            timeout,
            retry_policy: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    fn build_body(request: &CompletionRequest) -> Value {
        let user_content = match &request.attachment {
            None => json!(request.user_prompt),
            Some(attachment) => json!([
                { "type": "text", "text": request.user_prompt },
                {
                    "type": "image_url",
                    "image_url": {
                        "url": format!(
                            "data:{};base64,{}",
                            attachment.mime_type, attachment.data_base64
                        )
                    }
                }
            ]),
        };

        let mut body = json!({
            "model": request.model,
            "messages": [
                { "role": "system", "content": request.system_prompt },
                { "role": "user", "content": user_content }
            ],
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });
        if request.force_json {
            body["response_format"] = json!({ "type": "json_object" });
        }
        body
    }

    async fn send_once(&self, request: &CompletionRequest) -> Result<String, GatewayError> {
        let key = request
            .api_key_override
            .clone()
            .unwrap_or_else(|| self.api_key.expose_secret().to_string());

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(key)
            .timeout(self.timeout)
            .json(&Self::build_body(request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout
                } else {
                    GatewayError::ServerError(e.to_string())
                }
            })?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if status.is_success() {
            return extract_completion_text(&body);
        }

        Err(classify_error_status(status.as_u16(), &body))
    }
}

#[async_trait]
impl ChatGateway for HttpChatGateway {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GatewayError> {
        with_retry(&self.retry_policy, || self.send_once(request)).await
    }
}

fn extract_completion_text(body: &Value) -> Result<String, GatewayError> {
    let content = body
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .unwrap_or_default();

    if content.trim().is_empty() {
        return Err(GatewayError::EmptyResponse);
    }
    Ok(content.to_string())
}

/// Maps an error status plus the `{error: {message, code?}}` body onto the
/// gateway failure taxonomy. A 429 carrying a quota code is terminal and must
/// never be retried.
fn classify_error_status(status: u16, body: &Value) -> GatewayError {
    let message = body
        .pointer("/error/message")
        .and_then(Value::as_str)
        .unwrap_or("no error details")
        .to_string();
    let code = body
        .pointer("/error/code")
        .and_then(Value::as_str)
        .unwrap_or_default();

    match status {
        401 => GatewayError::InvalidApiKey,
        429 if is_quota_code(code, &message) => GatewayError::QuotaExhausted(message),
        429 => GatewayError::RateLimited,
        400..=499 => GatewayError::BadRequest(message),
        _ => GatewayError::ServerError(message),
    }
}

fn is_quota_code(code: &str, message: &str) -> bool {
    matches!(code, "insufficient_quota" | "quota_exceeded" | "billing_hard_limit_reached")
        || message.to_lowercase().contains("quota")
}
