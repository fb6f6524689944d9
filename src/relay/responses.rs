// ABOUTME: OpenAI Responses API generation service — server-side conversation state.
// ABOUTME: Each reply id is handed back as the context handle for the next turn.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use crate::error::UpstreamError;
use crate::relay::{Generation, GenerationRequest, GenerationService};
use crate::session::{ContextHandle, Role};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Client for `POST /v1/responses`.
pub struct ResponsesService {
    client: Client,
    api_key: Secret<String>,
    base_url: String,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
    instructions: Option<String>,
}

#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: Vec<InputItem<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    instructions: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous_response_id: Option<&'a str>,
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
struct InputItem<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ResponsesResponse {
    id: Option<String>,
    #[serde(default)]
    output: Vec<OutputItem>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: Vec<OutputContent>,
}

#[derive(Debug, Deserialize)]
struct OutputContent {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl ResponsesService {
    pub fn new(client: Client, api_key: Secret<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            temperature: 0.7,
            max_output_tokens: 1024,
            instructions: None,
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_generation(mut self, temperature: f32, max_output_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_output_tokens = max_output_tokens;
        self
    }

    pub fn with_instructions(mut self, instructions: Option<String>) -> Self {
        self.instructions = instructions.filter(|s| !s.trim().is_empty());
        self
    }

    fn build_request<'a>(&'a self, request: &'a GenerationRequest) -> ResponsesRequest<'a> {
        let mut input: Vec<InputItem<'a>> = request
            .history
            .iter()
            .map(|msg| InputItem {
                role: match msg.role() {
                    Role::User => "user",
                    Role::Assistant => "assistant",
                },
                content: msg.text(),
            })
            .collect();
        input.push(InputItem {
            role: "user",
            content: &request.prompt,
        });

        ResponsesRequest {
            model: &self.model,
            input,
            instructions: self.instructions.as_deref(),
            previous_response_id: request.context.as_ref().map(ContextHandle::as_str),
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        }
    }

    fn extract(response: ResponsesResponse) -> Result<Generation, UpstreamError> {
        if let Some(err) = response.error {
            return Err(UpstreamError::Service(err.message));
        }

        let text = response
            .output
            .into_iter()
            .filter(|item| item.kind == "message")
            .flat_map(|item| item.content)
            .filter(|c| c.kind == "output_text")
            .filter_map(|c| c.text)
            .collect::<Vec<_>>()
            .join("\n");

        if text.trim().is_empty() {
            return Err(UpstreamError::EmptyReply);
        }

        Ok(Generation {
            text,
            context: response.id.map(ContextHandle::new),
        })
    }
}

#[async_trait]
impl GenerationService for ResponsesService {
    fn name(&self) -> &str {
        "OpenAI"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn retains_context(&self) -> bool {
        true
    }

    async fn generate(&self, request: GenerationRequest) -> Result<Generation, UpstreamError> {
        let url = format!("{}/v1/responses", self.base_url);
        let body = self.build_request(&request);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let raw = response.text().await?;
        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body: raw,
            });
        }

        let parsed: ResponsesResponse =
            serde_json::from_str(&raw).map_err(|e| UpstreamError::Malformed(e.to_string()))?;
        Self::extract(parsed)
    }
}
