//! Speech request to playable WAV bytes

use base64::Engine;
use tracing::{error, warn};

use crate::audio::wav::{encode_wav, AudioFormat};
use crate::error::FormatError;
use crate::provider::{SpeechPayload, SpeechProvider, Voice};

/// Ask `provider` to speak `text` and wrap the returned PCM in a WAV container.
pub async fn synthesize_wav(
    provider: &dyn SpeechProvider,
    text: &str,
    voice: &Voice,
) -> Result<Vec<u8>, FormatError> {
    let payload = provider.synthesize(text, voice).await.map_err(|e| {
        error!(?e, provider = provider.name(), "Audio generation error");
        e
    })?;
    let pcm = decode_payload(&payload)?;
    Ok(encode_wav(&pcm, AudioFormat::SPEECH))
}

/// Decode the base64 body and drop a trailing partial sample frame.
pub fn decode_payload(payload: &SpeechPayload) -> Result<Vec<u8>, FormatError> {
    let encoded = payload
        .base64
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(FormatError::UpstreamEmpty)?;

    let mut pcm = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| FormatError::MalformedResponse(format!("invalid audio payload: {e}")))?;

    let aligned = AudioFormat::SPEECH.aligned_len(pcm.len());
    if aligned != pcm.len() {
        warn!(
            len = pcm.len(),
            aligned, "Audio payload ends with a partial sample, truncating"
        );
        pcm.truncate(aligned);
    }

    if pcm.is_empty() {
        return Err(FormatError::UpstreamEmpty);
    }
    Ok(pcm)
}
