use std::env;

use secrecy::SecretString;

#[derive(Clone, Debug)]
pub struct Config {
    pub gateway_base_url: String,
    pub gateway_api_key: SecretString,
    pub model: String,
    pub title_model: String,
    pub gateway_timeout_secs: u64,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub draft_store_path: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            gateway_base_url: env::var("GATEWAY_BASE_URL")
                .unwrap_or_else(|_| "https://openrouter.ai/api/v1".to_string()),
            gateway_api_key: SecretString::from(
                env::var("GATEWAY_API_KEY").unwrap_or_else(|_| "dev_api_key".to_string()),
            ),
            model: env::var("GATEWAY_MODEL")
                .unwrap_or_else(|_| "openai/gpt-4o-mini".to_string()),
            title_model: env::var("GATEWAY_TITLE_MODEL")
                .unwrap_or_else(|_| "openai/gpt-4o-mini".to_string()),
            gateway_timeout_secs: env::var("GATEWAY_TIMEOUT_SECS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(90),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            draft_store_path: env::var("DRAFT_STORE_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty()),
        }
    }

    /// Validate that production-critical configuration is set
    /// Panics if required secrets are using default values
    pub fn validate_for_production(&self) {
        use secrecy::ExposeSecret;

        let api_key = self.gateway_api_key.expose_secret();

        if api_key == "dev_api_key" || api_key.is_empty() {
            panic!(
                "FATAL: GATEWAY_API_KEY is using the default value! Set GATEWAY_API_KEY to your gateway key."
            );
        }

        if !self.gateway_base_url.starts_with("https://") {
            panic!(
                "FATAL: GATEWAY_BASE_URL must use https in production, got '{}'.",
                self.gateway_base_url
            );
        }
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            gateway_base_url: "https://gateway.invalid/api/v1".to_string(),
            gateway_api_key: SecretString::from("test_api_key".to_string()),
            model: "test-model".to_string(),
            title_model: "test-title-model".to_string(),
            gateway_timeout_secs: 5,
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            draft_store_path: None,
        }
    }
}
