//! `fastformat encode`: wrap raw speech PCM in a WAV container

use anyhow::{Context, Result};
use fastformat_core::{encode_wav, AudioFormat};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Encode `input` with the speech format and write it to `output`. Returns the
/// number of bytes written.
pub fn encode_file(input: &Path, output: &Path) -> Result<usize> {
    let pcm = fs::read(input).with_context(|| format!("Failed to read PCM from {input:?}"))?;

    let format = AudioFormat::SPEECH;
    if format.aligned_len(pcm.len()) != pcm.len() {
        warn!(
            len = pcm.len(),
            "PCM length is not a whole number of samples; keeping every byte"
        );
    }

    let wav = encode_wav(&pcm, format);
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {parent:?}"))?;
    }
    fs::write(output, &wav).with_context(|| format!("Failed to write WAV to {output:?}"))?;

    info!(?input, ?output, bytes = wav.len(), "Encoded PCM file");
    Ok(wav.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastformat_core::audio::wav::parse_wav;
    use tempfile::TempDir;

    #[test]
    fn test_encodes_raw_file() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("raw.pcm");
        let output = dir.path().join("nested").join("out.wav");
        fs::write(&input, vec![7u8; 480]).unwrap();

        let written = encode_file(&input, &output).unwrap();
        assert_eq!(written, 524);

        let bytes = fs::read(&output).unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        let (format, pcm) = parse_wav(&bytes).unwrap();
        assert_eq!(format, AudioFormat::SPEECH);
        assert_eq!(pcm, vec![7u8; 480].as_slice());
    }

    #[test]
    fn test_missing_input_is_reported() {
        let dir = TempDir::new().unwrap();
        let err = encode_file(&dir.path().join("nope.pcm"), &dir.path().join("out.wav"))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read PCM"));
    }
}
