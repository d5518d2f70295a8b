//! Request/response state behind the user interface
//!
//! A [`Translator`] owns the input, the current [`RewriteResult`] and an error
//! banner. Each variant is shown by a [`VariantCard`] that manages its own
//! speech request, audio resource and playback independently of its siblings.
//!
//! Requests are split into `begin_*`/`finish_*` halves so the async work does
//! not borrow the state. Outcomes that arrive after the state moved on are
//! discarded rather than applied.
//!
//! [`RewriteResult`]: crate::rewrite::RewriteResult

pub mod card;
pub mod translator;

pub use card::{AudioRequest, PlayState, VariantAudio, VariantCard};
pub use translator::{RewriteRequest, Translator};
