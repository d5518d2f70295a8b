//! Canonical 44-byte RIFF/WAVE container for linear PCM

use serde::{Deserialize, Serialize};

pub const WAV_HEADER_LEN: usize = 44;

/// Linear PCM layout of a sample buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
}

impl AudioFormat {
    /// The profile produced by the speech model: 24 kHz, mono, signed 16-bit LE.
    pub const SPEECH: AudioFormat = AudioFormat {
        sample_rate: 24_000,
        channels: 1,
        bits_per_sample: 16,
    };

    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * self.channels as u32 * self.bits_per_sample as u32 / 8
    }

    pub fn block_align(&self) -> u16 {
        self.channels * self.bits_per_sample / 8
    }

    /// Largest prefix length of `len` that holds only whole sample frames.
    pub fn aligned_len(&self, len: usize) -> usize {
        let block = self.block_align() as usize;
        if block == 0 {
            return len;
        }
        len - len % block
    }
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self::SPEECH
    }
}

/// Wrap `data` in a WAV header describing `format`.
///
/// Every input byte is copied after the header, so the output is always
/// `44 + data.len()` bytes long. Sizes beyond what RIFF can express saturate
/// at `u32::MAX`.
pub fn encode_wav(data: &[u8], format: AudioFormat) -> Vec<u8> {
    let data_len = u32::try_from(data.len()).unwrap_or(u32::MAX);
    let chunk_size = data_len.saturating_add(36);

    let mut out = Vec::with_capacity(WAV_HEADER_LEN + data.len());

    // RIFF chunk descriptor
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&chunk_size.to_le_bytes());
    out.extend_from_slice(b"WAVE");

    // fmt sub-chunk
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&format.channels.to_le_bytes());
    out.extend_from_slice(&format.sample_rate.to_le_bytes());
    out.extend_from_slice(&format.byte_rate().to_le_bytes());
    out.extend_from_slice(&format.block_align().to_le_bytes());
    out.extend_from_slice(&format.bits_per_sample.to_le_bytes());

    // data sub-chunk
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.extend_from_slice(data);

    out
}

/// Split a canonical 44-byte-header WAV file into its format and sample data.
///
/// Only the layout produced by [`encode_wav`] is understood. The data slice is
/// clamped to the bytes actually present.
pub fn parse_wav(bytes: &[u8]) -> Option<(AudioFormat, &[u8])> {
    if bytes.len() < WAV_HEADER_LEN
        || &bytes[0..4] != b"RIFF"
        || &bytes[8..12] != b"WAVE"
        || &bytes[12..16] != b"fmt "
        || &bytes[36..40] != b"data"
    {
        return None;
    }

    let u16_at = |offset: usize| u16::from_le_bytes([bytes[offset], bytes[offset + 1]]);
    let u32_at = |offset: usize| {
        u32::from_le_bytes([
            bytes[offset],
            bytes[offset + 1],
            bytes[offset + 2],
            bytes[offset + 3],
        ])
    };

    if u16_at(20) != 1 {
        return None;
    }

    let format = AudioFormat {
        channels: u16_at(22),
        sample_rate: u32_at(24),
        bits_per_sample: u16_at(34),
    };
    let declared = u32_at(40) as usize;
    let body = &bytes[WAV_HEADER_LEN..];
    Some((format, &body[..declared.min(body.len())]))
}

/// Convenience for the speech profile.
pub fn encode_speech_wav(data: &[u8]) -> Vec<u8> {
    encode_wav(data, AudioFormat::SPEECH)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    fn u16_at(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes(bytes[offset..offset + 2].try_into().unwrap())
    }

    #[test]
    fn test_speech_profile_derived_fields() {
        assert_eq!(AudioFormat::SPEECH.byte_rate(), 48_000);
        assert_eq!(AudioFormat::SPEECH.block_align(), 2);
    }

    #[test]
    fn test_empty_payload_is_bare_header() {
        let wav = encode_speech_wav(&[]);
        assert_eq!(wav.len(), WAV_HEADER_LEN);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(u32_at(&wav, 4), 36);
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(u32_at(&wav, 40), 0);
    }

    #[test]
    fn test_header_fields_at_fixed_offsets() {
        let wav = encode_speech_wav(&[1, 2, 3, 4]);
        assert_eq!(u32_at(&wav, 16), 16);
        assert_eq!(u16_at(&wav, 20), 1);
        assert_eq!(u16_at(&wav, 22), 1);
        assert_eq!(u32_at(&wav, 24), 24_000);
        assert_eq!(u32_at(&wav, 28), 48_000);
        assert_eq!(u16_at(&wav, 32), 2);
        assert_eq!(u16_at(&wav, 34), 16);
    }

    #[test]
    fn test_one_second_of_speech() {
        let pcm = vec![0x11u8; 48_000];
        let wav = encode_speech_wav(&pcm);
        assert_eq!(wav.len(), 48_044);
        assert_eq!(&wav[40..44], &[0x80, 0xBB, 0x00, 0x00]);
        assert_eq!(u32_at(&wav, 4), 48_036);
        assert_eq!(&wav[44..], pcm.as_slice());
    }

    #[test]
    fn test_odd_length_is_copied_verbatim() {
        let wav = encode_speech_wav(&[9, 8, 7]);
        assert_eq!(wav.len(), 47);
        assert_eq!(u32_at(&wav, 40), 3);
        assert_eq!(&wav[44..], &[9, 8, 7]);
    }

    #[test]
    fn test_aligned_len() {
        assert_eq!(AudioFormat::SPEECH.aligned_len(0), 0);
        assert_eq!(AudioFormat::SPEECH.aligned_len(5), 4);
        assert_eq!(AudioFormat::SPEECH.aligned_len(6), 6);

        let stereo = AudioFormat {
            sample_rate: 44_100,
            channels: 2,
            bits_per_sample: 16,
        };
        assert_eq!(stereo.aligned_len(7), 4);
    }

    #[test]
    fn test_parse_reads_back_encoded_file() {
        let pcm = [1u8, 0, 2, 0, 3, 0];
        let wav = encode_speech_wav(&pcm);
        let (format, data) = parse_wav(&wav).unwrap();
        assert_eq!(format, AudioFormat::SPEECH);
        assert_eq!(data, &pcm);
    }

    #[test]
    fn test_parse_rejects_foreign_bytes() {
        assert!(parse_wav(b"RIFF").is_none());
        let mut wav = encode_speech_wav(&[0, 0]);
        wav[8..12].copy_from_slice(b"AVI ");
        assert!(parse_wav(&wav).is_none());
    }

    #[test]
    fn test_other_formats_fill_header() {
        let stereo = AudioFormat {
            sample_rate: 44_100,
            channels: 2,
            bits_per_sample: 16,
        };
        let wav = encode_wav(&[0; 8], stereo);
        assert_eq!(u16_at(&wav, 22), 2);
        assert_eq!(u32_at(&wav, 24), 44_100);
        assert_eq!(u32_at(&wav, 28), 176_400);
        assert_eq!(u16_at(&wav, 32), 4);
    }
}
