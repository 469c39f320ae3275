//! Data models for Gemini API requests and responses

use serde::{Deserialize, Serialize};

use crate::chat::{Message, Role};

/// Default generation model
pub const DEFAULT_MODEL: &str = "models/gemini-2.5-flash";

/// Speaker tag in Gemini's content format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContentRole {
    User,
    Model,
}

impl From<Role> for ContentRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => Self::User,
            Role::Assistant => Self::Model,
        }
    }
}

/// One piece of a content entry
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Part {
    /// Text payload (non-text parts deserialize with `None`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()) }
    }
}

/// A turn in the conversation, or the system instruction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Content {
    /// Absent for the system instruction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<ContentRole>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// Text content without a role
    pub fn instruction(text: impl Into<String>) -> Self {
        Self { role: None, parts: vec![Part::text(text)] }
    }
}

impl From<&Message> for Content {
    fn from(message: &Message) -> Self {
        Self { role: Some(message.role.into()), parts: vec![Part::text(message.content.clone())] }
    }
}

/// Request body for `models/*:generateContent`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Persona instruction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    /// Conversation in order
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    /// Create a request from a transcript
    pub fn new(messages: &[Message]) -> Self {
        Self { system_instruction: None, contents: messages.iter().map(Content::from).collect() }
    }

    /// Set the system instruction
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system_instruction = Some(Content::instruction(system));
        self
    }
}

/// A generated answer
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
}

/// Why a prompt was refused
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

/// Token usage statistics
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

/// Response from `generateContent`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
    pub usage_metadata: Option<UsageMetadata>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, parts joined; `None` without candidates
    pub fn text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        let text = candidate
            .content
            .as_ref()
            .map(|c| c.parts.iter().filter_map(|p| p.text.as_deref()).collect::<String>())
            .unwrap_or_default();
        Some(text)
    }

    /// Block reason reported for the prompt, if any
    pub fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback.as_ref().and_then(|f| f.block_reason.as_deref())
    }
}

/// A model available to the API key
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
    pub input_token_limit: Option<u32>,
    pub output_token_limit: Option<u32>,
}

impl ModelInfo {
    /// Whether the model can serve chat replies
    pub fn supports_generate_content(&self) -> bool {
        self.supported_generation_methods.iter().any(|m| m == "generateContent")
    }
}

/// One page of `GET /models`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListModelsResponse {
    #[serde(default)]
    pub models: Vec<ModelInfo>,
    pub next_page_token: Option<String>,
}

/// Error envelope returned with non-success statuses
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::chat::MessageId;

    fn message(role: Role, content: &str) -> Message {
        Message { id: MessageId(2), role, content: content.to_string(), created_at: 0 }
    }

    #[test]
    fn request_maps_roles_and_system() {
        let messages = vec![message(Role::Assistant, "Hi there."), message(Role::User, "Help")];
        let request = GenerateContentRequest::new(&messages).with_system("Be kind");

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "systemInstruction": {"parts": [{"text": "Be kind"}]},
                "contents": [
                    {"role": "model", "parts": [{"text": "Hi there."}]},
                    {"role": "user", "parts": [{"text": "Help"}]}
                ]
            })
        );
    }

    #[test]
    fn response_joins_text_parts() {
        let data = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "You are "}, {"text": "not alone."}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 4}
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(data).unwrap();
        assert_eq!(response.text().as_deref(), Some("You are not alone."));
        assert_eq!(response.usage_metadata.map(|u| u.candidates_token_count), Some(4));
    }

    #[test]
    fn candidate_without_content_is_empty_text() {
        let data = r#"{"candidates": [{"finishReason": "SAFETY"}]}"#;
        let response: GenerateContentResponse = serde_json::from_str(data).unwrap();
        assert_eq!(response.text().as_deref(), Some(""));
    }

    #[test]
    fn blocked_prompt_has_no_text() {
        let data = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let response: GenerateContentResponse = serde_json::from_str(data).unwrap();
        assert_eq!(response.text(), None);
        assert_eq!(response.block_reason(), Some("SAFETY"));
    }

    #[test]
    fn models_page_parses() {
        let data = r#"{
            "models": [{
                "name": "models/gemini-2.5-flash",
                "displayName": "Gemini 2.5 Flash",
                "supportedGenerationMethods": ["generateContent", "countTokens"],
                "inputTokenLimit": 1048576
            }],
            "nextPageToken": "abc"
        }"#;
        let page: ListModelsResponse = serde_json::from_str(data).unwrap();
        assert_eq!(page.models.len(), 1);
        assert!(page.models[0].supports_generate_content());
        assert_eq!(page.next_page_token.as_deref(), Some("abc"));
    }
}
