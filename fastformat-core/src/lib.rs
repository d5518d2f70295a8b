pub mod audio;
pub mod error;
pub mod provider;
pub mod rewrite;
pub mod session;
pub mod settings;
pub mod share;
pub mod speech;
pub mod variant;

pub use audio::{encode_wav, AudioFormat, AudioHandle, AudioStore};
pub use error::FormatError;
pub use provider::{GeminiProvider, RewriteProvider, SpeechProvider, Voice};
pub use rewrite::RewriteResult;
pub use session::{Translator, VariantCard};
pub use settings::{Settings, SettingsManager};
pub use variant::Variant;
