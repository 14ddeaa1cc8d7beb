use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

/// Failures raised by the chat-completion gateway (upstream LLM service).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Quota exhausted: {0}")]
    QuotaExhausted(String),

    #[error("Rate limited by upstream after retries")]
    RateLimited,

    #[error("Upstream rejected request: {0}")]
    BadRequest(String),

    #[error("Upstream server error: {0}")]
    ServerError(String),

    #[error("Gateway request timed out")]
    Timeout,

    #[error("Gateway returned an empty completion")]
    EmptyResponse,
}

/// Failures raised while turning raw model output into questions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Model output is not valid JSON: {0}")]
    NotJson(String),

    #[error("Model output has no 'questions' array")]
    MissingQuestionsField,
}

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Validation error: {message}")]
    ValidationError {
        message: String,
        details: Vec<String>,
    },

    #[error("File parse error: {0}")]
    FileParse(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Generation failed: {0}")]
    Parse(#[from] ParseError),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::ValidationError {
            message: message.into(),
            details: Vec::new(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::AlreadyExists(_) => "ALREADY_EXISTS",
            AppError::ValidationError { .. } => "VALIDATION_ERROR",
            AppError::FileParse(_) => "FILE_PARSE_ERROR",
            AppError::Gateway(GatewayError::InvalidApiKey) => "INVALID_API_KEY",
            AppError::Gateway(GatewayError::QuotaExhausted(_)) => "QUOTA_EXHAUSTED",
            AppError::Gateway(GatewayError::RateLimited) => "RATE_LIMITED",
            AppError::Gateway(_) => "GATEWAY_ERROR",
            AppError::Parse(_) => "GENERATION_FAILED",
            AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    fn details(&self) -> Option<Vec<String>> {
        match self {
            AppError::ValidationError { details, .. } if !details.is_empty() => {
                Some(details.clone())
            }
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AlreadyExists(_) => StatusCode::CONFLICT,
            AppError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            AppError::FileParse(_) => StatusCode::BAD_REQUEST,
            AppError::Gateway(GatewayError::InvalidApiKey) => StatusCode::UNAUTHORIZED,
            // 429 preserved so clients can apply their own backoff
            AppError::Gateway(GatewayError::RateLimited) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Gateway(GatewayError::QuotaExhausted(_)) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Gateway(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Parse(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            success: false,
            error: self.to_string(),
            code: self.error_code(),
            details: self.details(),
        })
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let details = err
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    format!("{}: {}", field, message)
                })
            })
            .collect();

        AppError::ValidationError {
            message: "Request validation failed".to_string(),
            details,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InternalError(format!("JSON serialization error: {}", err))
    }
}

pub type AppResult<T> = Result<T, AppError>;
