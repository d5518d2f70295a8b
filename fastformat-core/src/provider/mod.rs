pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::FormatError;
use crate::rewrite::RewriteResult;

pub use gemini::{GeminiConfig, GeminiProvider};
pub use mock::{MockBehavior, MockProvider};

/// Prebuilt voice used for speech synthesis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub name: String,
}

impl Voice {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for Voice {
    fn default() -> Self {
        Self::new("Kore")
    }
}

/// Inline audio returned by the speech service, still base64 encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpeechPayload {
    pub base64: Option<String>,
    pub mime_type: Option<String>,
}

/// Produces the three rewritten versions of a message
#[async_trait]
pub trait RewriteProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn rewrite(&self, text: &str) -> Result<RewriteResult, FormatError>;
}

/// Turns text into raw speech audio
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn default_voice(&self) -> Voice;

    async fn synthesize(&self, text: &str, voice: &Voice) -> Result<SpeechPayload, FormatError>;
}
