pub mod extractor;
pub mod gateway;
pub mod language;
pub mod multi_agent;
pub mod parser;
pub mod pipeline_service;
pub mod prompt_builder;
pub mod title_service;

pub use gateway::{ChatGateway, CompletionRequest, HttpChatGateway, RetryPolicy};
pub use pipeline_service::PipelineService;
pub use title_service::{TitleDescriptionService, TitleOptions};
