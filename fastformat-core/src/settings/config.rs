use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::FormatError;

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "API_KEY";

/// Secondary variable checked when [`API_KEY_ENV`] is unset.
pub const FALLBACK_API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Model used for the three-way rewrite
    #[serde(default = "default_text_model")]
    pub text_model: String,

    /// Model used for speech synthesis
    #[serde(default = "default_speech_model")]
    pub speech_model: String,

    /// Prebuilt voice name passed to the speech model
    #[serde(default = "default_voice")]
    pub voice: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Where saved audio files go. Defaults to the current directory.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_text_model() -> String {
    "gemini-flash-lite-latest".to_string()
}

fn default_speech_model() -> String {
    "gemini-2.5-flash-preview-tts".to_string()
}

fn default_voice() -> String {
    "Kore".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            text_model: default_text_model(),
            speech_model: default_speech_model(),
            voice: default_voice(),
            base_url: default_base_url(),
            output_dir: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Read the API key from the process environment.
pub fn resolve_api_key() -> Result<String, FormatError> {
    resolve_api_key_with(|name| std::env::var(name).ok())
}

/// Same as [`resolve_api_key`] with an injectable lookup.
pub fn resolve_api_key_with<F>(lookup: F) -> Result<String, FormatError>
where
    F: Fn(&str) -> Option<String>,
{
    [API_KEY_ENV, FALLBACK_API_KEY_ENV]
        .iter()
        .filter_map(|name| lookup(name))
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
        .ok_or(FormatError::MissingCredential)
}
