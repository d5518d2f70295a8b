//! Google Gemini `generateContent` client for rewriting and speech

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use super::{RewriteProvider, SpeechPayload, SpeechProvider, Voice};
use crate::error::FormatError;
use crate::rewrite::{build_prompt, parse_rewrite, response_schema, RewriteResult};
use crate::settings::{resolve_api_key, Settings};

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub text_model: String,
    pub speech_model: String,
    pub voice: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Build from settings, taking the API key from the environment.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            api_key: resolve_api_key().ok(),
            base_url: settings.base_url.clone(),
            text_model: settings.text_model.clone(),
            speech_model: settings.speech_model.clone(),
            voice: settings.voice.clone(),
            timeout: settings.request_timeout(),
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

#[derive(Clone)]
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> Result<Self, FormatError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn api_key(&self) -> Result<&str, FormatError> {
        match self.config.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(FormatError::MissingCredential),
        }
    }

    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, FormatError> {
        let api_key = self.api_key()?;
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        );

        debug!(%url, "Sending Gemini request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                debug!(?e, "Gemini API call failed");
                FormatError::Transport(e.to_string())
            })?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            debug!(?status, ?response_text, "Gemini API returned error");
            return Err(FormatError::Upstream {
                status: status.as_u16(),
                body: response_text,
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            FormatError::MalformedResponse(format!("unexpected response shape: {e}"))
        })
    }
}

#[async_trait]
impl RewriteProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "Gemini"
    }

    async fn rewrite(&self, text: &str) -> Result<RewriteResult, FormatError> {
        let request = GenerateContentRequest {
            contents: vec![RequestContent::text(build_prompt(text))],
            generation_config: GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(response_schema()),
                ..Default::default()
            },
        };

        info!(model = %self.config.text_model, chars = text.len(), "Requesting rewrite");
        let response = self.generate(&self.config.text_model, &request).await?;

        let text = response.text().ok_or(FormatError::UpstreamEmpty)?;
        parse_rewrite(&text)
    }
}

#[async_trait]
impl SpeechProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "Gemini"
    }

    fn default_voice(&self) -> Voice {
        Voice::new(self.config.voice.clone())
    }

    async fn synthesize(&self, text: &str, voice: &Voice) -> Result<SpeechPayload, FormatError> {
        let request = GenerateContentRequest {
            contents: vec![RequestContent::text(text.to_string())],
            generation_config: GenerationConfig {
                response_modalities: Some(vec!["AUDIO".to_string()]),
                speech_config: Some(SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: voice.name.clone(),
                        },
                    },
                }),
                ..Default::default()
            },
        };

        info!(model = %self.config.speech_model, voice = %voice.name, "Requesting speech");
        let response = self.generate(&self.config.speech_model, &request).await?;

        Ok(response.inline_audio())
    }
}

// Gemini API types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

impl RequestContent {
    fn text(text: String) -> Self {
        Self {
            parts: vec![RequestPart { text }],
        }
    }
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speech_config: Option<SpeechConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig {
    voice_config: VoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig {
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig {
    voice_name: String,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    data: Option<String>,
}

impl GenerateContentResponse {
    fn first_parts(&self) -> &[ResponsePart] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or_default()
    }

    /// Concatenated text parts of the first candidate.
    fn text(&self) -> Option<String> {
        let text: String = self
            .first_parts()
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }

    fn inline_audio(&self) -> SpeechPayload {
        self.first_parts()
            .iter()
            .filter_map(|p| p.inline_data.as_ref())
            .find(|d| d.data.as_deref().is_some_and(|s| !s.is_empty()))
            .map(|d| SpeechPayload {
                base64: d.data.clone(),
                mime_type: d.mime_type.clone(),
            })
            .unwrap_or_default()
    }
}
