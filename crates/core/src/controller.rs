use crate::error::{ChatError, ValidationError};
use crate::generator::TextGenerator;
use crate::message::{ArchivedConversation, Message, Role};
use crate::session_state::{SessionState, VoiceStatus};
use crate::synthesizer::SpeechSynthesizer;

/// Applies user actions to a [`SessionState`].
///
/// The controller owns the remote collaborators but never the state: callers
/// pass the session in for each action and render it afterwards. Every action
/// runs to completion before the next one is accepted, so no locking is needed.
///
/// On error the state is left exactly as it was at the point of failure.
pub struct ChatController<G, S> {
    generator: G,
    synthesizer: S,
}

impl<G, S> ChatController<G, S>
where
    G: TextGenerator,
    S: SpeechSynthesizer,
{
    pub fn new(generator: G, synthesizer: S) -> Self {
        Self {
            generator,
            synthesizer,
        }
    }

    /// Appends `text` as a user message and, if the generator answers, its reply.
    ///
    /// Empty input is rejected without touching the state. Whitespace is sent as-is.
    /// A generator failure keeps the user message and appends nothing else.
    pub async fn submit_user_message(
        &self,
        state: &mut SessionState,
        text: &str,
    ) -> Result<(), ChatError> {
        if text.is_empty() {
            return Err(ValidationError::EmptyMessage.into());
        }

        state.reset_voice();
        state.active.push(Message::user(text));
        tracing::debug!(messages = state.active.len(), "Appended user message");

        // Single-turn context: only this input goes to the generator.
        match self.generator.generate(text).await {
            Ok(reply) => {
                state.active.push(Message::assistant(reply));
                tracing::debug!(messages = state.active.len(), "Appended assistant reply");
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Text generation failed: {}", e);
                Err(e.into())
            }
        }
    }

    /// Archives a non-empty active conversation, then starts over.
    pub fn start_new_chat(&self, state: &mut SessionState) {
        if let Some(archived) = ArchivedConversation::from_conversation(&state.active) {
            tracing::info!(title = archived.title(), "Archived conversation");
            state.archive.push(archived);
        }
        state.active.clear();
        state.reset_voice();
    }

    /// Forgets every archived conversation. The active one is kept.
    pub fn clear_history(&self, state: &mut SessionState) {
        tracing::info!(cleared = state.archive.len(), "Cleared chat history");
        state.archive.clear();
    }

    /// Replaces the active conversation with a copy of `archive[index]`.
    ///
    /// The archive entry stays in place and can be restored again.
    pub fn restore_chat(&self, state: &mut SessionState, index: usize) -> Result<(), ChatError> {
        let archived = state
            .archive
            .get(index)
            .ok_or(ValidationError::InvalidRestoreIndex {
                index,
                len: state.archive.len(),
            })?;
        state.active = archived.messages().clone();
        tracing::debug!(index, messages = state.active.len(), "Restored archived conversation");
        Ok(())
    }

    /// Synthesizes the trailing assistant reply with `voice_id`.
    ///
    /// On success the audio becomes the session's `last_audio_ref`; on failure
    /// the voice status records the error and no audio is referenced.
    pub async fn generate_voice_for_last_reply(
        &self,
        state: &mut SessionState,
        voice_id: &str,
    ) -> Result<(), ChatError> {
        let reply = match state.active.last() {
            Some(message) if message.role() == Role::Assistant => message.content().to_string(),
            _ => return Err(ValidationError::NoAssistantReply.into()),
        };

        state.voice = VoiceStatus::Requesting;
        match self.synthesizer.synthesize(&reply, voice_id).await {
            Ok(audio) => {
                tracing::info!(path = %audio.path().display(), "Voice ready");
                state.voice = VoiceStatus::Ready(audio);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Voice generation failed: {}", e);
                state.voice = VoiceStatus::Failed(e.to_string());
                Err(e.into())
            }
        }
    }
}
