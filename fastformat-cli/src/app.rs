use anyhow::{Context, Result};
use fastformat_core::audio::Player;
use fastformat_core::provider::GeminiConfig;
use fastformat_core::session::PlayState;
use fastformat_core::share::{share_or_copy, Clipboard, ShareOutcome, TerminalClipboard};
use fastformat_core::{
    AudioHandle, AudioStore, FormatError, GeminiProvider, RewriteProvider, SettingsManager,
    SpeechProvider, Translator, Variant, Voice,
};
use futures::future::join_all;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::formatter::Formatter;

/// Command line overrides applied on top of the settings file
#[derive(Debug, Default)]
pub struct AppOptions {
    pub settings_path: Option<PathBuf>,
    pub voice: Option<String>,
    pub out_dir: Option<PathBuf>,
}

/// Everything one CLI session works with: the translator state, the provider
/// and the local audio output.
pub struct App<P = GeminiProvider> {
    translator: Translator,
    store: AudioStore,
    provider: P,
    voice: Voice,
    out_dir: PathBuf,
    player: Option<Box<dyn Player>>,
    clipboard: Box<dyn Clipboard>,
    formatter: Formatter,
}

impl App<GeminiProvider> {
    pub fn new(options: AppOptions) -> Result<Self> {
        let settings_manager = match options.settings_path {
            Some(path) => SettingsManager::from_path(path)?,
            None => SettingsManager::new()?,
        };
        let settings = settings_manager.settings();
        info!(path = ?settings_manager.path(), "Loaded settings");

        let config = GeminiConfig::from_settings(&settings);
        if config.api_key.is_none() {
            warn!("No API key in the environment; requests will fail until one is set");
        }
        let provider = GeminiProvider::new(config).context("Failed to create Gemini client")?;

        let voice = Voice::new(options.voice.unwrap_or_else(|| settings.voice.clone()));
        let out_dir = options.out_dir.unwrap_or_else(|| settings.output_dir());

        Ok(Self::with_provider(provider, voice, out_dir).with_player(default_player()))
    }
}

impl<P> App<P>
where
    P: RewriteProvider + SpeechProvider + 'static,
{
    pub fn with_provider(provider: P, voice: Voice, out_dir: PathBuf) -> Self {
        let store = AudioStore::new();
        Self {
            translator: Translator::new(store.clone()),
            store,
            provider,
            voice,
            out_dir,
            player: None,
            clipboard: Box::new(TerminalClipboard::new(std::io::stdout())),
            formatter: Formatter::new(),
        }
    }

    pub fn with_player(mut self, player: Option<Box<dyn Player>>) -> Self {
        self.player = player;
        self
    }

    pub fn with_clipboard(mut self, clipboard: Box<dyn Clipboard>) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn with_formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn formatter(&self) -> &Formatter {
        &self.formatter
    }

    #[cfg(test)]
    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    #[cfg(test)]
    pub fn store(&self) -> &AudioStore {
        &self.store
    }

    /// Rewrite `text` and print the cards or the error banner. Returns true
    /// when there is a result to show.
    pub async fn rewrite(&mut self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }

        self.formatter.print_system("Rewriting...");
        self.translator.rewrite(&self.provider, text).await;

        if let Some(banner) = self.translator.banner() {
            self.formatter.print_error(&banner);
            return false;
        }
        self.formatter.print_cards(self.translator.cards());
        self.translator.result().is_some()
    }

    /// Generate speech for several variants at once. Each variant succeeds or
    /// fails on its own.
    pub async fn speak(
        &mut self,
        variants: &[Variant],
    ) -> Vec<(Variant, Result<Option<AudioHandle>, FormatError>)> {
        let mut results = Vec::new();
        let mut requests = Vec::new();
        let mut seen = Vec::new();

        for &variant in variants {
            if seen.contains(&variant) {
                continue;
            }
            seen.push(variant);
            match self.translator.card_mut(variant).begin_audio() {
                Ok(request) => requests.push(request),
                Err(e) => results.push((variant, Err(e))),
            }
        }

        let outcomes = join_all(
            requests
                .iter()
                .map(|request| request.run(&self.provider, &self.voice)),
        )
        .await;

        for (request, outcome) in requests.into_iter().zip(outcomes) {
            let variant = request.variant();
            let result = self.translator.card_mut(variant).finish_audio(request, outcome);
            results.push((variant, result));
        }
        results
    }

    /// Save the variant's audio into the output directory.
    pub fn save(&self, variant: Variant) -> Result<PathBuf> {
        let handle = self
            .translator
            .card(variant)
            .audio_handle()
            .with_context(|| format!("No audio for {variant} yet; try :speak {}", variant.key()))?;
        self.store.save(handle, &self.out_dir, variant)
    }

    /// Stop the variant if it is playing, otherwise play it, generating the
    /// audio first when needed.
    pub async fn toggle_play(&mut self, variant: Variant) -> Result<PlayState, FormatError> {
        let player = self.player.as_deref().ok_or_else(no_player)?;
        self.translator
            .card_mut(variant)
            .toggle_playback(&self.provider, &self.voice, player)
            .await
    }

    /// Play existing audio and wait for it to end.
    pub async fn play_and_wait(&mut self, variant: Variant) -> Result<(), FormatError> {
        let player = self.player.as_deref().ok_or_else(no_player)?;
        let card = self.translator.card_mut(variant);
        card.play(player)?;
        card.wait_for_playback().await;
        Ok(())
    }

    pub fn copy(&self, variant: Variant) -> Result<bool> {
        let text = self.translator.card(variant).content();
        if text.is_empty() {
            return Ok(false);
        }
        self.clipboard.copy(text)?;
        Ok(true)
    }

    /// A terminal has no share sheet, so sharing falls back to the clipboard.
    pub fn share(&self, variant: Variant) -> Result<ShareOutcome> {
        let text = self.translator.card(variant).content();
        share_or_copy(None, self.clipboard.as_ref(), variant, text)
    }

    pub fn clear(&mut self) {
        self.translator.clear();
    }

    /// Rewrite once, then speak, save and optionally play the requested variants.
    pub async fn run_once(&mut self, text: &str, speak: &[Variant], play: bool) -> Result<()> {
        if text.trim().is_empty() {
            anyhow::bail!("Nothing to rewrite");
        }
        if !self.rewrite(text).await {
            anyhow::bail!("Rewrite failed");
        }

        let wanted = if play && speak.is_empty() {
            Variant::all().to_vec()
        } else {
            speak.to_vec()
        };
        if wanted.is_empty() {
            return Ok(());
        }

        self.formatter.print_system("Generating audio...");
        let mut ready = Vec::new();
        for (variant, result) in self.speak(&wanted).await {
            match result {
                Ok(Some(_)) => {
                    let path = self.save(variant)?;
                    self.formatter
                        .print_system(&format!("Saved {variant} audio to {}", path.display()));
                    ready.push(variant);
                }
                Ok(None) => {}
                Err(e) => self.formatter.print_error(&format!("{variant}: {e}")),
            }
        }

        if play {
            for variant in ready {
                self.formatter.print_system(&format!("Playing {variant}..."));
                if let Err(e) = self.play_and_wait(variant).await {
                    self.formatter.print_error(&format!("{variant}: {e}"));
                }
            }
        }
        Ok(())
    }
}

fn no_player() -> FormatError {
    FormatError::PlaybackFailure("audio playback is not available".to_string())
}

#[cfg(feature = "playback")]
fn default_player() -> Option<Box<dyn Player>> {
    use fastformat_core::audio::playback::DevicePlayer;

    match DevicePlayer::new() {
        Ok(player) => Some(Box::new(player)),
        Err(e) => {
            warn!(?e, "No audio output device");
            None
        }
    }
}

#[cfg(not(feature = "playback"))]
fn default_player() -> Option<Box<dyn Player>> {
    None
}
