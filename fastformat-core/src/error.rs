use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("API_KEY is not set. Add your Gemini API key to the environment and try again.")]
    MissingCredential,

    #[error("The service returned no usable response. Please try again.")]
    UpstreamEmpty,

    #[error("Could not read the service response ({0}). Please try again.")]
    MalformedResponse(String),

    #[error("Playback failed: {0}")]
    PlaybackFailure(String),

    #[error("Service error {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Audio is already being generated for this message")]
    Busy,

    #[error("There is no text to read aloud")]
    NothingToSpeak,
}

impl FormatError {
    /// Extra guidance shown under the error banner, if any.
    pub fn remediation(&self) -> Option<&'static str> {
        match self {
            Self::MissingCredential => Some(
                "Local: export API_KEY=<your Gemini key> before starting fastformat.\n\
                 Hosted: add API_KEY to the deployment's environment variables and restart.",
            ),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for FormatError {
    fn from(source: serde_json::Error) -> Self {
        Self::MalformedResponse(source.to_string())
    }
}

impl From<reqwest::Error> for FormatError {
    fn from(source: reqwest::Error) -> Self {
        Self::Transport(source.to_string())
    }
}
