//! Share a variant's text, falling back to the clipboard

use anyhow::Result;
use base64::Engine;
use std::io::Write;
use tracing::{info, warn};

use crate::variant::Variant;

/// Platform share sheet
pub trait ShareTarget {
    fn share(&self, title: &str, text: &str) -> Result<()>;
}

pub trait Clipboard {
    fn copy(&self, text: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    /// Sharing was dismissed or failed; nothing else happened
    Skipped,
    Copied,
    /// Nothing to share
    Empty,
}

pub fn share_title(variant: Variant) -> String {
    format!("FastFormat - {}", variant.title())
}

/// Share `text` when a share target exists, otherwise copy it.
///
/// A missing share target is not an error. A share that fails is logged and
/// reported as skipped.
pub fn share_or_copy(
    target: Option<&dyn ShareTarget>,
    clipboard: &dyn Clipboard,
    variant: Variant,
    text: &str,
) -> Result<ShareOutcome> {
    if text.is_empty() {
        return Ok(ShareOutcome::Empty);
    }

    match target {
        Some(target) => match target.share(&share_title(variant), text) {
            Ok(()) => Ok(ShareOutcome::Shared),
            Err(e) => {
                info!(?e, "Share skipped");
                Ok(ShareOutcome::Skipped)
            }
        },
        None => {
            clipboard.copy(text)?;
            Ok(ShareOutcome::Copied)
        }
    }
}

/// Copies through the terminal with an OSC 52 escape sequence.
pub struct TerminalClipboard<W: Write> {
    out: std::sync::Mutex<W>,
}

impl<W: Write> TerminalClipboard<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: std::sync::Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write> Clipboard for TerminalClipboard<W> {
    fn copy(&self, text: &str) -> Result<()> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(text);
        let mut out = match self.out.lock() {
            Ok(out) => out,
            Err(poisoned) => {
                warn!("Clipboard writer lock poisoned");
                poisoned.into_inner()
            }
        };
        write!(out, "\x1b]52;c;{encoded}\x07")?;
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingClipboard {
        copied: RefCell<Vec<String>>,
    }

    impl Clipboard for RecordingClipboard {
        fn copy(&self, text: &str) -> Result<()> {
            self.copied.borrow_mut().push(text.to_string());
            Ok(())
        }
    }

    struct Sheet {
        fail: bool,
        shared: RefCell<Vec<(String, String)>>,
    }

    impl ShareTarget for Sheet {
        fn share(&self, title: &str, text: &str) -> Result<()> {
            if self.fail {
                anyhow::bail!("dismissed");
            }
            self.shared
                .borrow_mut()
                .push((title.to_string(), text.to_string()));
            Ok(())
        }
    }

    #[test]
    fn test_falls_back_to_copy_without_share_target() {
        let clipboard = RecordingClipboard::default();
        let outcome = share_or_copy(None, &clipboard, Variant::Sms, "on my way").unwrap();
        assert_eq!(outcome, ShareOutcome::Copied);
        assert_eq!(*clipboard.copied.borrow(), vec!["on my way".to_string()]);
    }

    #[test]
    fn test_shares_with_title() {
        let clipboard = RecordingClipboard::default();
        let sheet = Sheet {
            fail: false,
            shared: RefCell::new(Vec::new()),
        };
        let outcome = share_or_copy(Some(&sheet), &clipboard, Variant::Email, "Dear all").unwrap();
        assert_eq!(outcome, ShareOutcome::Shared);
        assert_eq!(
            sheet.shared.borrow()[0],
            ("FastFormat - Email".to_string(), "Dear all".to_string())
        );
        assert!(clipboard.copied.borrow().is_empty());
    }

    #[test]
    fn test_failed_share_is_skipped_not_copied() {
        let clipboard = RecordingClipboard::default();
        let sheet = Sheet {
            fail: true,
            shared: RefCell::new(Vec::new()),
        };
        let outcome = share_or_copy(Some(&sheet), &clipboard, Variant::Email, "x").unwrap();
        assert_eq!(outcome, ShareOutcome::Skipped);
        assert!(clipboard.copied.borrow().is_empty());
    }

    #[test]
    fn test_empty_text_does_nothing() {
        let clipboard = RecordingClipboard::default();
        let outcome = share_or_copy(None, &clipboard, Variant::Email, "").unwrap();
        assert_eq!(outcome, ShareOutcome::Empty);
        assert!(clipboard.copied.borrow().is_empty());
    }

    #[test]
    fn test_terminal_clipboard_writes_osc52() {
        let clipboard = TerminalClipboard::new(Vec::new());
        clipboard.copy("hi").unwrap();
        assert_eq!(clipboard.into_inner(), b"\x1b]52;c;aGk=\x07".to_vec());
    }
}
