use async_trait::async_trait;
use base64::Engine;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{RewriteProvider, SpeechPayload, SpeechProvider, Voice};
use crate::error::FormatError;
use crate::rewrite::{parse_rewrite, RewriteResult};

/// Mock behavior for the mock provider
#[derive(Debug, Clone, Default)]
pub enum MockBehavior {
    /// Rewrite echoes the input into each variant; speech returns a short tone
    #[default]
    Success,
    /// Rewrite parses this raw model text
    RawText(String),
    /// Speech returns these PCM bytes
    Pcm(Vec<u8>),
    /// Speech returns this payload untouched
    Payload(SpeechPayload),
    /// Every call fails with this error
    Fail(FormatError),
    /// Wait before answering with the inner behavior
    Delayed(Duration, Box<MockBehavior>),
    /// Pops one behavior per call, then falls back to `Success`
    Queue(Vec<MockBehavior>),
}

/// Mock rewrite/speech provider for testing
#[derive(Clone, Default)]
pub struct MockProvider {
    behavior: Arc<Mutex<MockBehavior>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockProvider {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior: Arc::new(Mutex::new(behavior)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn set_behavior(&self, behavior: MockBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Texts passed to `rewrite`/`synthesize`, in call order
    pub fn captured_texts(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Samples of a quiet 1 kHz square wave at the speech profile
    pub fn tone(samples: usize) -> Vec<u8> {
        (0..samples)
            .flat_map(|i| {
                let value: i16 = if (i / 12) % 2 == 0 { 1000 } else { -1000 };
                value.to_le_bytes()
            })
            .collect()
    }

    fn next_behavior(&self, text: &str) -> MockBehavior {
        self.calls.lock().unwrap().push(text.to_string());
        let mut behavior = self.behavior.lock().unwrap();
        if let MockBehavior::Queue(queue) = &mut *behavior {
            if queue.is_empty() {
                return MockBehavior::Success;
            }
            return queue.remove(0);
        }
        behavior.clone()
    }

    async fn resolve(mut behavior: MockBehavior) -> MockBehavior {
        loop {
            match behavior {
                MockBehavior::Delayed(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    behavior = *inner;
                }
                other => return other,
            }
        }
    }
}

#[async_trait]
impl RewriteProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn rewrite(&self, text: &str) -> Result<RewriteResult, FormatError> {
        let behavior = Self::resolve(self.next_behavior(text)).await;
        match behavior {
            MockBehavior::RawText(raw) => parse_rewrite(&raw),
            MockBehavior::Fail(err) => Err(err),
            _ => Ok(RewriteResult {
                email: format!("Dear team, {text}"),
                sms: text.to_string(),
                whatsapp: format!("{text} 👍"),
            }),
        }
    }
}

#[async_trait]
impl SpeechProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn default_voice(&self) -> Voice {
        Voice::default()
    }

    async fn synthesize(&self, text: &str, _voice: &Voice) -> Result<SpeechPayload, FormatError> {
        let behavior = Self::resolve(self.next_behavior(text)).await;
        let pcm = match behavior {
            MockBehavior::Payload(payload) => return Ok(payload),
            MockBehavior::Fail(err) => return Err(err),
            MockBehavior::Pcm(pcm) => pcm,
            _ => Self::tone(240),
        };
        Ok(SpeechPayload {
            base64: Some(base64::engine::general_purpose::STANDARD.encode(pcm)),
            mime_type: Some("audio/L16;codec=pcm;rate=24000".to_string()),
        })
    }
}
