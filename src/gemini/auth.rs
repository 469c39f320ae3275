//! API key resolution: environment first, then the system keyring

use keyring::Entry;

use super::error::GeminiError;

/// Service name for keyring storage
const SERVICE_NAME: &str = "peacenet";
/// Entry name for the API key
const API_KEY_ENTRY: &str = "gemini-api-key";
/// Environment variables checked in order
pub const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "VITE_GEMINI_API_KEY"];

/// Where a resolved key came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    Environment(&'static str),
    Keyring,
}

/// Manages the Gemini API key
pub struct ApiKeyManager;

impl ApiKeyManager {
    /// Find a key in the process environment or the keyring
    pub fn resolve() -> Option<(String, KeySource)> {
        Self::resolve_with(|name| std::env::var(name).ok(), || Self::get_api_key().ok())
    }

    /// Resolution order with injectable lookups
    fn resolve_with(
        env: impl Fn(&str) -> Option<String>,
        keyring: impl FnOnce() -> Option<String>,
    ) -> Option<(String, KeySource)> {
        for &name in API_KEY_ENV_VARS {
            if let Some(key) = env(name).map(|k| k.trim().to_string()).filter(|k| !k.is_empty()) {
                return Some((key, KeySource::Environment(name)));
            }
        }
        keyring().map(|key| (key, KeySource::Keyring))
    }

    /// Get the API key from system keyring
    pub fn get_api_key() -> Result<String, GeminiError> {
        let entry = Entry::new(SERVICE_NAME, API_KEY_ENTRY)
            .map_err(|e| GeminiError::KeyringError(e.to_string()))?;

        entry.get_password().map_err(|e| match e {
            keyring::Error::NoEntry => GeminiError::ApiKeyNotFound,
            _ => GeminiError::KeyringError(e.to_string()),
        })
    }

    /// Store the API key in system keyring
    pub fn set_api_key(key: &str) -> Result<(), GeminiError> {
        let key = key.trim();
        if !Self::validate_key_format(key) {
            return Err(GeminiError::InvalidApiKey);
        }

        let entry = Entry::new(SERVICE_NAME, API_KEY_ENTRY)
            .map_err(|e| GeminiError::KeyringError(e.to_string()))?;

        entry.set_password(key).map_err(|e| GeminiError::KeyringError(e.to_string()))
    }

    /// Delete the stored API key
    pub fn delete_api_key() -> Result<(), GeminiError> {
        let entry = Entry::new(SERVICE_NAME, API_KEY_ENTRY)
            .map_err(|e| GeminiError::KeyringError(e.to_string()))?;

        entry.delete_credential().map_err(|e| match e {
            keyring::Error::NoEntry => GeminiError::ApiKeyNotFound,
            _ => GeminiError::KeyringError(e.to_string()),
        })
    }

    /// Validate API key format
    fn validate_key_format(key: &str) -> bool {
        // Google API keys start with "AIza"
        key.starts_with("AIza") && key.len() > 20 && key.chars().all(|c| c.is_ascii_graphic())
    }

    /// Mask an API key for display (show first 8 and last 4 chars)
    pub fn mask_key(key: &str) -> String {
        let chars: Vec<char> = key.chars().collect();
        if chars.len() <= 12 {
            return "*".repeat(chars.len());
        }
        let prefix: String = chars[..8].iter().collect();
        let suffix: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", prefix, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_key_format() {
        assert!(ApiKeyManager::validate_key_format("AIzaSyA-abcdefghijklmnopqrstuvwxyz12"));
        assert!(!ApiKeyManager::validate_key_format("sk-ant-REDACTED"));
        assert!(!ApiKeyManager::validate_key_format("AIzaShort"));
        assert!(!ApiKeyManager::validate_key_format("AIzaSyA-abcdefghijklmnopqrstuvw\u{e9}yz1"));
    }

    #[test]
    fn mask_key() {
        let masked = ApiKeyManager::mask_key("AIzaSyA-abcdefghijklmnopqrstuvwxyz12");
        assert!(masked.starts_with("AIzaSyA-"));
        assert!(masked.ends_with("yz12"));
        assert!(masked.contains("..."));
        assert_eq!(ApiKeyManager::mask_key("short"), "*****");
    }

    #[test]
    fn mask_key_handles_non_ascii() {
        let masked = ApiKeyManager::mask_key("AIzaSyA-abcdefghijklmnopqrstuvw\u{e9}yz1");
        assert_eq!(masked, "AIzaSyA-...\u{e9}yz1");
        assert_eq!(ApiKeyManager::mask_key("\u{e9}\u{e9}\u{e9}"), "***");
    }

    #[test]
    fn environment_wins_over_keyring() {
        let found = ApiKeyManager::resolve_with(
            |name| (name == "VITE_GEMINI_API_KEY").then(|| "from-env".to_string()),
            || Some("from-keyring".to_string()),
        );
        assert_eq!(
            found,
            Some(("from-env".to_string(), KeySource::Environment("VITE_GEMINI_API_KEY")))
        );
    }

    #[test]
    fn blank_environment_falls_back_to_keyring() {
        let found = ApiKeyManager::resolve_with(
            |_| Some("   ".to_string()),
            || Some("from-keyring".to_string()),
        );
        assert_eq!(found, Some(("from-keyring".to_string(), KeySource::Keyring)));
    }

    #[test]
    fn nothing_configured() {
        assert_eq!(ApiKeyManager::resolve_with(|_| None, || None), None);
    }
}
