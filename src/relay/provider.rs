// ABOUTME: Generation service factory — creates the right client based on config.
// ABOUTME: Supports gemini (stateless) and responses (stateful).

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::config::{Credentials, LlmConfig};
use crate::error::ConfigurationError;
use crate::relay::gemini::GeminiService;
use crate::relay::responses::ResponsesService;
use crate::relay::{ContextMode, GenerationService};

/// Build the shared HTTP client. The relay enforces the per-turn timeout; the
/// client only bounds connection setup.
pub fn build_http_client() -> Client {
    Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Create a generation service based on the provider name in config.
pub fn create_service(
    config: &LlmConfig,
    credentials: &Credentials,
    system_instruction: Option<String>,
) -> Result<Arc<dyn GenerationService>, ConfigurationError> {
    let client = build_http_client();
    let api_key = credentials.api_key.clone();

    let service: Arc<dyn GenerationService> = match config.provider.as_str() {
        "gemini" => {
            let mut service = GeminiService::new(client, api_key, &config.model)
                .with_generation(config.temperature, config.max_output_tokens)
                .with_system_instruction(system_instruction);
            if let Some(url) = config.gemini.base_url.as_deref().filter(|s| !s.is_empty()) {
                service = service.with_base_url(url);
            }
            Arc::new(service)
        }
        "responses" => {
            let mut service = ResponsesService::new(client, api_key, &config.model)
                .with_generation(config.temperature, config.max_output_tokens)
                .with_instructions(system_instruction);
            if let Some(url) = config
                .responses
                .base_url
                .as_deref()
                .filter(|s| !s.is_empty())
            {
                service = service.with_base_url(url);
            }
            Arc::new(service)
        }
        other => return Err(ConfigurationError::UnknownProvider(other.to_string())),
    };

    if config.context == ContextMode::Stateful && !service.retains_context() {
        return Err(ConfigurationError::StatefulUnsupported(
            config.provider.clone(),
        ));
    }

    Ok(service)
}
