//! Gemini API integration module
//!
//! Provides API key management and the HTTP client that answers support
//! chat turns through Google's generateContent endpoint.

pub mod auth;
pub mod client;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use auth::{ApiKeyManager, KeySource};
pub use client::{GeminiClient, GeminiSettings};
pub use error::GeminiError;
pub use models::{GenerateContentRequest, GenerateContentResponse, ModelInfo};
