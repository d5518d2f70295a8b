//! Referenceable audio resources with explicit release
//!
//! Encoded WAV bytes are registered in an [`AudioStore`] and referred to by an
//! [`AudioHandle`]. Whoever creates a handle must revoke it once it is
//! superseded; [`AudioStore::live_count`] makes leaks visible.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::debug;
use uuid::Uuid;

use crate::variant::Variant;

pub const WAV_MIME: &str = "audio/wav";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AudioHandle(String);

impl AudioHandle {
    fn fresh() -> Self {
        Self(format!("fastformat-audio:{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AudioHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct AudioResource {
    pub bytes: Arc<Vec<u8>>,
    pub mime_type: &'static str,
}

#[derive(Clone, Default)]
pub struct AudioStore {
    inner: Arc<Mutex<HashMap<AudioHandle, AudioResource>>>,
}

impl AudioStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, bytes: Vec<u8>, mime_type: &'static str) -> AudioHandle {
        let handle = AudioHandle::fresh();
        let resource = AudioResource {
            bytes: Arc::new(bytes),
            mime_type,
        };
        self.inner
            .lock()
            .expect("Audio store lock poisoned")
            .insert(handle.clone(), resource);
        debug!(%handle, "Created audio resource");
        handle
    }

    pub fn get(&self, handle: &AudioHandle) -> Option<AudioResource> {
        self.inner
            .lock()
            .expect("Audio store lock poisoned")
            .get(handle)
            .cloned()
    }

    /// Release a handle. Returns false if it was unknown or already released.
    pub fn revoke(&self, handle: &AudioHandle) -> bool {
        let removed = self
            .inner
            .lock()
            .expect("Audio store lock poisoned")
            .remove(handle)
            .is_some();
        if removed {
            debug!(%handle, "Revoked audio resource");
        }
        removed
    }

    pub fn live_count(&self) -> usize {
        self.inner.lock().expect("Audio store lock poisoned").len()
    }

    /// Write the resource to `<dir>/<variant>-audio.wav`.
    pub fn save(&self, handle: &AudioHandle, dir: &Path, variant: Variant) -> Result<PathBuf> {
        let resource = self
            .get(handle)
            .with_context(|| format!("Audio resource {handle} has been released"))?;

        fs::create_dir_all(dir).with_context(|| format!("Failed to create directory: {dir:?}"))?;
        let path = dir.join(variant.audio_file_name());
        fs::write(&path, resource.bytes.as_slice())
            .with_context(|| format!("Failed to write audio to {path:?}"))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_get_revoke() {
        let store = AudioStore::new();
        let handle = store.create(vec![1, 2, 3], WAV_MIME);

        assert!(handle.as_str().starts_with("fastformat-audio:"));
        assert_eq!(store.live_count(), 1);
        assert_eq!(store.get(&handle).unwrap().bytes.as_slice(), &[1, 2, 3]);

        assert!(store.revoke(&handle));
        assert!(!store.revoke(&handle));
        assert!(store.get(&handle).is_none());
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn test_handles_are_unique() {
        let store = AudioStore::new();
        let a = store.create(vec![], WAV_MIME);
        let b = store.create(vec![], WAV_MIME);
        assert_ne!(a, b);
        assert_eq!(store.live_count(), 2);
    }

    #[test]
    fn test_save_uses_variant_file_name() {
        let temp_dir = TempDir::new().unwrap();
        let store = AudioStore::new();
        let handle = store.create(vec![7; 10], WAV_MIME);

        let path = store
            .save(&handle, temp_dir.path(), Variant::WhatsApp)
            .unwrap();

        assert_eq!(path, temp_dir.path().join("whatsapp-audio.wav"));
        assert_eq!(std::fs::read(path).unwrap(), vec![7; 10]);
    }

    #[test]
    fn test_save_after_revoke_fails() {
        let temp_dir = TempDir::new().unwrap();
        let store = AudioStore::new();
        let handle = store.create(vec![7; 10], WAV_MIME);
        store.revoke(&handle);

        assert!(store.save(&handle, temp_dir.path(), Variant::Sms).is_err());
    }
}
