//! WAV encoding, audio resources and playback

#[cfg(feature = "playback")]
pub mod playback;
pub mod resource;
pub mod wav;

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::FormatError;
use resource::AudioResource;

pub use resource::{AudioHandle, AudioStore, WAV_MIME};
pub use wav::{encode_speech_wav, encode_wav, AudioFormat};

/// Something that can start playing an audio resource
pub trait Player {
    fn play(&self, resource: &AudioResource) -> Result<Playback, FormatError>;
}

/// Audio playback handle - dropping stops playback
pub struct Playback {
    finished: Arc<AtomicBool>,
    _guard: Option<Box<dyn Any>>,
}

impl Playback {
    /// `finished` is set by whoever drives the output. `guard` is kept alive
    /// for as long as the playback is.
    pub fn new(finished: Arc<AtomicBool>, guard: Option<Box<dyn Any>>) -> Self {
        Self {
            finished,
            _guard: guard,
        }
    }

    /// Check if playback has finished
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    /// Wait for playback to complete
    pub async fn wait(&self) {
        while !self.is_finished() {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }
}
