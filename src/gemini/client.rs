//! HTTP client for the Gemini API

use std::future::Future;
use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode};

use super::error::GeminiError;
use super::models::{
    DEFAULT_MODEL, ErrorEnvelope, GenerateContentRequest, GenerateContentResponse,
    ListModelsResponse, ModelInfo,
};
use crate::chat::{Message, ReplyGenerator};

/// Gemini API base URL
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Persona instruction sent with every reply request
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are PeaceNet AI, an empathetic and supportive \
companion. Respond with warmth, validate feelings, and offer practical, safety-minded guidance. \
Keep responses concise and avoid judgment, but if the user taped a message in tunisian language, \
respond in tunisian language.";

/// Connection settings, fixed for the life of the process
#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub base_url: String,
    pub model: String,
    pub system_instruction: String,
    /// Per-request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            timeout: Some(Duration::from_secs(120)),
        }
    }
}

/// Gemini API client
pub struct GeminiClient {
    /// HTTP client
    client: Client,
    /// API key; a missing key fails each request, not construction
    api_key: Option<String>,
    settings: GeminiSettings,
}

impl GeminiClient {
    /// Create a client; `api_key` may be absent
    pub fn new(settings: GeminiSettings, api_key: Option<String>) -> Result<Self, GeminiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self { client, api_key, settings })
    }

    pub fn settings(&self) -> &GeminiSettings {
        &self.settings
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn api_key(&self) -> Result<&str, GeminiError> {
        self.api_key.as_deref().ok_or(GeminiError::ApiKeyNotFound)
    }

    fn base_url(&self) -> &str {
        self.settings.base_url.trim_end_matches('/')
    }

    /// `{base}/models/{model}:generateContent`, accepting bare model names
    fn generate_url(&self) -> String {
        let model = self.settings.model.trim_start_matches('/');
        if model.starts_with("models/") {
            format!("{}/{}:generateContent", self.base_url(), model)
        } else {
            format!("{}/models/{}:generateContent", self.base_url(), model)
        }
    }

    /// Build the request body for a transcript
    pub fn build_request(&self, messages: &[Message]) -> GenerateContentRequest {
        GenerateContentRequest::new(messages).with_system(self.settings.system_instruction.clone())
    }

    /// Send a single generateContent request
    pub async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GeminiError> {
        let api_key = self.api_key()?;

        let response = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await?;

        let response = check_status(response).await?;
        let body = response.text().await?;
        let parsed: GenerateContentResponse = serde_json::from_str(&body)?;

        if let Some(usage) = &parsed.usage_metadata {
            tracing::debug!(
                "Gemini usage: {} prompt tokens, {} reply tokens",
                usage.prompt_token_count,
                usage.candidates_token_count
            );
        }
        Ok(parsed)
    }

    /// List every model visible to the key, following pagination
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, GeminiError> {
        let api_key = self.api_key()?;
        let url = format!("{}/models", self.base_url());

        let models = collect_pages(|page_token| {
            let mut request = self.client.get(&url).header("x-goog-api-key", api_key);
            if let Some(token) = page_token {
                request = request.query(&[("pageToken", token)]);
            }
            async move {
                let response = check_status(request.send().await?).await?;
                let page: ListModelsResponse = serde_json::from_str(&response.text().await?)?;
                Ok::<_, GeminiError>(page)
            }
        })
        .await?;

        tracing::debug!("Listed {} Gemini models", models.len());
        Ok(models)
    }
}

/// Fetch pages until one comes back without a next page token
async fn collect_pages<F, Fut>(mut fetch: F) -> Result<Vec<ModelInfo>, GeminiError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<ListModelsResponse, GeminiError>>,
{
    let mut models = Vec::new();
    let mut page_token = None;

    loop {
        let page = fetch(page_token.take()).await?;
        models.extend(page.models);

        match page.next_page_token.filter(|t| !t.is_empty()) {
            Some(token) => page_token = Some(token),
            None => return Ok(models),
        }
    }
}

impl ReplyGenerator for GeminiClient {
    type Error = GeminiError;

    async fn generate(&self, messages: &[Message]) -> Result<String, GeminiError> {
        let request = self.build_request(messages);
        let response = self.generate_content(&request).await?;

        if let Some(reason) = response.block_reason() {
            return Err(GeminiError::Blocked(reason.to_string()));
        }
        response.text().map(|t| t.trim().to_string()).ok_or(GeminiError::EmptyResponse)
    }
}

/// Map non-success statuses to errors
async fn check_status(response: Response) -> Result<Response, GeminiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = retry_after(response.headers());
    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, retry_after, &body))
}

/// Seconds from a `Retry-After` header, if present and numeric
fn retry_after(headers: &HeaderMap) -> Option<u64> {
    headers.get(RETRY_AFTER).and_then(|v| v.to_str().ok()).and_then(|s| s.trim().parse().ok())
}

/// Error for a non-success status
fn status_error(status: StatusCode, retry_after: Option<u64>, body: &str) -> GeminiError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return GeminiError::RateLimited { retry_after_seconds: retry_after.unwrap_or(60) };
    }
    GeminiError::ApiError { status: status.as_u16(), message: error_message(body) }
}

/// Pull the human-readable message out of an error body
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}
