use tracing::{debug, error, info};

use crate::audio::{AudioHandle, AudioStore, Playback, Player, WAV_MIME};
use crate::error::FormatError;
use crate::provider::{SpeechProvider, Voice};
use crate::speech::synthesize_wav;
use crate::variant::Variant;

/// Audio state owned by a single card
#[derive(Default)]
pub struct VariantAudio {
    handle: Option<AudioHandle>,
    busy: bool,
    playback: Option<Playback>,
    error: Option<FormatError>,
}

/// Result of toggling playback on a card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Playing,
    Stopped,
}

/// A speech request detached from its card so several cards can be in
/// flight at once. Hand the outcome back with [`VariantCard::finish_audio`].
#[derive(Debug, Clone)]
pub struct AudioRequest {
    variant: Variant,
    text: String,
    revision: u64,
}

impl AudioRequest {
    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub async fn run(
        &self,
        speech: &dyn SpeechProvider,
        voice: &Voice,
    ) -> Result<Vec<u8>, FormatError> {
        synthesize_wav(speech, &self.text, voice).await
    }
}

/// One displayed variant: its text plus its own audio state.
pub struct VariantCard {
    variant: Variant,
    content: String,
    revision: u64,
    audio: VariantAudio,
    store: AudioStore,
}

impl VariantCard {
    pub fn new(variant: Variant, store: AudioStore) -> Self {
        Self {
            variant,
            content: String::new(),
            revision: 0,
            audio: VariantAudio::default(),
            store,
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }

    pub fn audio_handle(&self) -> Option<&AudioHandle> {
        self.audio.handle.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.audio.busy
    }

    pub fn is_playing(&self) -> bool {
        self.audio
            .playback
            .as_ref()
            .is_some_and(|p| !p.is_finished())
    }

    /// Last audio or playback failure on this card
    pub fn error(&self) -> Option<&FormatError> {
        self.audio.error.as_ref()
    }

    /// Replace the text. Any audio made for the old text is released and any
    /// speech request still in flight for it will be discarded. The card stays
    /// busy until that request is handed back.
    pub fn set_content(&mut self, content: &str) {
        if content == self.content {
            return;
        }
        self.content = content.to_string();
        self.revision += 1;
        self.release_audio();
        self.audio.error = None;
    }

    pub fn clear(&mut self) {
        self.set_content("");
    }

    pub fn begin_audio(&mut self) -> Result<AudioRequest, FormatError> {
        if !self.has_content() {
            return Err(FormatError::NothingToSpeak);
        }
        if self.audio.busy {
            return Err(FormatError::Busy);
        }

        self.audio.busy = true;
        self.audio.error = None;
        Ok(AudioRequest {
            variant: self.variant,
            text: self.content.clone(),
            revision: self.revision,
        })
    }

    /// Apply the outcome of a request started with [`Self::begin_audio`].
    ///
    /// Returns `Ok(None)` when the text changed while the request was in
    /// flight; the audio is dropped without ever becoming a resource.
    pub fn finish_audio(
        &mut self,
        request: AudioRequest,
        outcome: Result<Vec<u8>, FormatError>,
    ) -> Result<Option<AudioHandle>, FormatError> {
        if request.variant != self.variant {
            debug!(
                variant = %self.variant,
                request = %request.variant,
                "Ignoring audio for another card"
            );
            return Ok(None);
        }
        self.audio.busy = false;

        if request.revision != self.revision {
            debug!(variant = %self.variant, "Discarding audio for outdated text");
            return Ok(None);
        }

        match outcome {
            Ok(wav) => {
                self.release_audio();
                let handle = self.store.create(wav, WAV_MIME);
                info!(variant = %self.variant, %handle, "Audio ready");
                self.audio.handle = Some(handle.clone());
                Ok(Some(handle))
            }
            Err(e) => {
                error!(variant = %self.variant, ?e, "Failed to generate audio");
                self.audio.error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Generate audio for the current text, replacing any previous audio.
    pub async fn generate_audio(
        &mut self,
        speech: &dyn SpeechProvider,
        voice: &Voice,
    ) -> Result<Option<AudioHandle>, FormatError> {
        let request = self.begin_audio()?;
        let outcome = request.run(speech, voice).await;
        self.finish_audio(request, outcome)
    }

    /// Stop if playing; otherwise play, generating the audio first when none
    /// exists yet. Playback starts only once the resource has been created.
    pub async fn toggle_playback(
        &mut self,
        speech: &dyn SpeechProvider,
        voice: &Voice,
        player: &dyn Player,
    ) -> Result<PlayState, FormatError> {
        if self.is_playing() {
            self.stop();
            return Ok(PlayState::Stopped);
        }

        if self.audio.handle.is_none() && self.generate_audio(speech, voice).await?.is_none() {
            return Ok(PlayState::Stopped);
        }

        self.play(player)
    }

    /// Play the audio that already exists for this card.
    pub fn play(&mut self, player: &dyn Player) -> Result<PlayState, FormatError> {
        let resource = self
            .audio
            .handle
            .as_ref()
            .and_then(|handle| self.store.get(handle))
            .ok_or_else(|| {
                FormatError::PlaybackFailure("no audio has been generated".to_string())
            })?;

        self.audio.playback = None;
        match player.play(&resource) {
            Ok(playback) => {
                self.audio.playback = Some(playback);
                Ok(PlayState::Playing)
            }
            Err(e) => {
                error!(variant = %self.variant, ?e, "Playback error");
                self.audio.error = Some(e.clone());
                Err(e)
            }
        }
    }

    pub fn stop(&mut self) {
        self.audio.playback = None;
    }

    /// Wait until the current playback, if any, has finished.
    pub async fn wait_for_playback(&self) {
        if let Some(playback) = &self.audio.playback {
            playback.wait().await;
        }
    }

    fn release_audio(&mut self) {
        self.audio.playback = None;
        if let Some(handle) = self.audio.handle.take() {
            self.store.revoke(&handle);
        }
    }
}

impl Drop for VariantCard {
    fn drop(&mut self) {
        self.release_audio();
    }
}
