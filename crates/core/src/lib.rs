pub mod controller;
pub mod error;
pub mod generator;
pub mod message;
pub mod session_state;
pub mod synthesizer;
pub mod voice;

pub use controller::ChatController;
pub use error::{ChatError, GeneratorError, SynthesizerError, ValidationError};
pub use generator::{GeminiGenerator, TextGenerator};
pub use message::{ArchivedConversation, Conversation, Message, Role};
pub use session_state::{AudioRef, SessionState, VoiceStatus};
pub use synthesizer::{ElevenLabsSynthesizer, SpeechSynthesizer};
pub use voice::VoiceOption;
