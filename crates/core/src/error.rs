use thiserror::Error;

/// Rejected user actions. Nothing in the session state is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Message is empty")]
    EmptyMessage,
    #[error("No archived chat at position {index} (archive holds {len})")]
    InvalidRestoreIndex { index: usize, len: usize },
    #[error("There is no assistant reply to voice")]
    NoAssistantReply,
}

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("Gemini API Error: API key is not configured")]
    MissingApiKey,
    #[error("Gemini API Error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Gemini API Error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Gemini API Error: response contained no text")]
    EmptyResponse,
}

#[derive(Debug, Error)]
pub enum SynthesizerError {
    #[error("ElevenLabs Exception: API key is not configured")]
    MissingApiKey,
    #[error("ElevenLabs Exception: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("ElevenLabs Error: {status} - {message}")]
    Status { status: u16, message: String },
    #[error("ElevenLabs Exception: failed to write audio file: {0}")]
    Io(#[from] std::io::Error),
}

/// Any failure surfaced by a controller action. None of them end the session.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Generator(#[from] GeneratorError),
    #[error(transparent)]
    Synthesizer(#[from] SynthesizerError),
}
