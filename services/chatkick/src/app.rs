//! The action loop body: apply one action, then redraw.

use crate::command::{Action, HELP};
use crate::player::AudioPlayer;
use crate::render;
use chatkick_core::voice::{self, VoiceOption};
use chatkick_core::{ChatController, ChatError, SessionState, SpeechSynthesizer, TextGenerator};
use std::future::Future;
use std::io::{self, Write};

const NO_AUDIO: &str = "There is no voice audio to play. Type /speak first.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    Finished,
    Interrupted,
}

/// Drives `session` until it finishes or `interrupt` resolves.
///
/// The whole session is raced, so an interrupt also cancels a remote call in
/// flight; the session future is dropped mid-action.
pub async fn run_until_interrupted<E, I>(
    session: impl Future<Output = Result<(), E>>,
    interrupt: I,
) -> Result<Shutdown, E>
where
    I: Future,
{
    tokio::select! {
        result = session => result.map(|()| Shutdown::Finished),
        _ = interrupt => Ok(Shutdown::Interrupted),
    }
}

/// One interactive session: the controller, its state, the voice picker and
/// the local audio player.
pub struct App<G, S> {
    controller: ChatController<G, S>,
    player: Box<dyn AudioPlayer>,
    state: SessionState,
    selected_voice: &'static VoiceOption,
}

impl<G, S> App<G, S>
where
    G: TextGenerator,
    S: SpeechSynthesizer,
{
    pub fn new(controller: ChatController<G, S>, player: Box<dyn AudioPlayer>) -> Self {
        Self {
            controller,
            player,
            state: SessionState::new(),
            selected_voice: voice::default_voice(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn selected_voice(&self) -> &'static VoiceOption {
        self.selected_voice
    }

    pub fn render<W: Write>(&self, out: &mut W) -> io::Result<()> {
        render::render(&self.state, self.selected_voice, out)
    }

    /// Applies `action`, redraws when the session changed, then shows any error.
    ///
    /// Failed actions never end the session; only `Quit` does.
    pub async fn apply<W: Write>(&mut self, action: Action, out: &mut W) -> io::Result<Flow> {
        let result = match action {
            Action::Submit(text) => {
                if !text.is_empty() {
                    render::render_notice("Thinking...", out)?;
                }
                self.controller
                    .submit_user_message(&mut self.state, &text)
                    .await
            }
            Action::NewChat => {
                self.controller.start_new_chat(&mut self.state);
                Ok(())
            }
            Action::ClearHistory => {
                self.controller.clear_history(&mut self.state);
                Ok(())
            }
            Action::RestoreChat(index) => self.controller.restore_chat(&mut self.state, index),
            Action::GenerateVoice => {
                if self.state.can_generate_voice() {
                    render::render_notice("Generating voice...", out)?;
                }
                self.controller
                    .generate_voice_for_last_reply(&mut self.state, self.selected_voice.voice_id)
                    .await
            }
            Action::SelectVoice(voice) => {
                tracing::debug!(voice = voice.name, "Selected voice");
                self.selected_voice = voice;
                Ok(())
            }
            Action::PlayAudio => {
                match self.state.last_audio_ref() {
                    Some(audio) => {
                        render::render_notice("Playing audio...", out)?;
                        if let Err(e) = self.player.play(audio).await {
                            tracing::warn!("Audio playback failed: {}", e);
                            render::render_error(&e, out)?;
                        }
                    }
                    None => render::render_error(&NO_AUDIO, out)?,
                }
                return Ok(Flow::Continue);
            }
            Action::ListVoices => {
                render::render_voices(self.selected_voice, out)?;
                return Ok(Flow::Continue);
            }
            Action::Help => {
                render::render_notice(HELP, out)?;
                return Ok(Flow::Continue);
            }
            Action::Quit => return Ok(Flow::Quit),
        };

        self.render(out)?;
        match result {
            // The frame already shows a failed voice request.
            Err(ChatError::Synthesizer(_)) | Ok(()) => {}
            Err(e) => render::render_error(&e, out)?,
        }
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{MockAudioPlayer, PlaybackError};
    use async_trait::async_trait;
    use chatkick_core::{AudioRef, GeneratorError, Message, SynthesizerError};
    use std::sync::{Arc, Mutex};

    struct EchoGenerator;

    #[async_trait]
    impl TextGenerator for EchoGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, GeneratorError> {
            match prompt {
                "fail" => return Err(GeneratorError::EmptyResponse),
                "hang" => return Ok(std::future::pending::<String>().await),
                _ => {}
            }
            Ok(format!("echo: {prompt}"))
        }
    }

    #[derive(Default)]
    struct RecordingSynthesizer {
        calls: Arc<Mutex<Vec<(String, String)>>>,
        status: Option<u16>,
    }

    #[async_trait]
    impl SpeechSynthesizer for RecordingSynthesizer {
        async fn synthesize(&self, text: &str, voice_id: &str) -> Result<AudioRef, SynthesizerError> {
            self.calls
                .lock()
                .unwrap()
                .push((text.to_string(), voice_id.to_string()));
            match self.status {
                Some(status) => Err(SynthesizerError::Status {
                    status,
                    message: "unauthorized".to_string(),
                }),
                None => Ok(AudioRef::new("audiofile.mp3", 4)),
            }
        }
    }

    fn app(synth: RecordingSynthesizer) -> App<EchoGenerator, RecordingSynthesizer> {
        let mut player = MockAudioPlayer::new();
        player.expect_play().never();
        app_with_player(synth, player)
    }

    fn app_with_player(
        synth: RecordingSynthesizer,
        player: MockAudioPlayer,
    ) -> App<EchoGenerator, RecordingSynthesizer> {
        App::new(ChatController::new(EchoGenerator, synth), Box::new(player))
    }

    async fn run(
        app: &mut App<EchoGenerator, RecordingSynthesizer>,
        action: Action,
    ) -> (Flow, String) {
        let mut out = Vec::new();
        let flow = app.apply(action, &mut out).await.unwrap();
        (flow, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn test_submit_renders_transcript() {
        let mut app = app(RecordingSynthesizer::default());

        let (flow, text) = run(&mut app, Action::Submit("Hello".to_string())).await;

        assert_eq!(flow, Flow::Continue);
        assert!(text.starts_with("Thinking..."));
        assert!(text.contains("🧑 Hello"));
        assert!(text.contains("🤖 echo: Hello"));
        assert!(text.contains("/speak"));
    }

    #[tokio::test]
    async fn test_empty_submit_shows_error_and_keeps_state() {
        let mut app = app(RecordingSynthesizer::default());

        let (_, text) = run(&mut app, Action::Submit(String::new())).await;

        assert!(!text.contains("Thinking..."));
        assert!(text.contains("❌ Message is empty"));
        assert!(app.state().active().is_empty());
    }

    #[tokio::test]
    async fn test_whitespace_submit_is_sent() {
        let mut app = app(RecordingSynthesizer::default());

        let (_, text) = run(&mut app, Action::Submit("  ".to_string())).await;

        assert!(text.starts_with("Thinking..."));
        assert!(text.contains("🤖 echo:   "));
        assert_eq!(app.state().active().len(), 2);
    }

    #[tokio::test]
    async fn test_generator_failure_is_surfaced_and_session_continues() {
        let mut app = app(RecordingSynthesizer::default());

        let (flow, text) = run(&mut app, Action::Submit("fail".to_string())).await;

        assert_eq!(flow, Flow::Continue);
        assert!(text.contains("❌ Gemini API Error"));
        assert_eq!(app.state().active().len(), 1);
    }

    #[tokio::test]
    async fn test_speak_uses_selected_voice() {
        let synth = RecordingSynthesizer::default();
        let calls = Arc::clone(&synth.calls);
        let mut app = app(synth);
        run(&mut app, Action::Submit("Hello".to_string())).await;
        run(&mut app, Action::SelectVoice(&voice::VOICE_CATALOG[4])).await;

        let (_, text) = run(&mut app, Action::GenerateVoice).await;

        assert!(text.contains("🔊 Audio: audiofile.mp3 (type /play to listen)"));
        assert_eq!(
            *calls.lock().unwrap(),
            vec![("echo: Hello".to_string(), "MF3mGyEYCl7XYWbV9V6O".to_string())]
        );
    }

    #[tokio::test]
    async fn test_speak_failure_shows_status() {
        let mut app = app(RecordingSynthesizer {
            status: Some(401),
            ..Default::default()
        });
        run(&mut app, Action::Submit("Hello".to_string())).await;

        let (_, text) = run(&mut app, Action::GenerateVoice).await;

        assert!(text.contains("401"));
        assert!(app.state().last_audio_ref().is_none());
    }

    #[tokio::test]
    async fn test_speak_without_reply_is_rejected() {
        let mut app = app(RecordingSynthesizer::default());

        let (_, text) = run(&mut app, Action::GenerateVoice).await;

        assert!(!text.contains("Generating voice..."));
        assert!(text.contains("❌ There is no assistant reply to voice"));
    }

    #[tokio::test]
    async fn test_play_sends_ready_audio_to_player() {
        let mut player = MockAudioPlayer::new();
        player
            .expect_play()
            .withf(|audio| audio.path() == std::path::Path::new("audiofile.mp3"))
            .returning(|_| Ok(()))
            .once();
        let mut app = app_with_player(RecordingSynthesizer::default(), player);
        run(&mut app, Action::Submit("Hello".to_string())).await;
        run(&mut app, Action::GenerateVoice).await;

        let (flow, text) = run(&mut app, Action::PlayAudio).await;

        assert_eq!(flow, Flow::Continue);
        assert!(text.contains("Playing audio..."));
        assert!(!text.contains("❌"));
        assert!(app.state().last_audio_ref().is_some());
    }

    #[tokio::test]
    async fn test_play_without_audio_is_rejected() {
        let mut app = app(RecordingSynthesizer::default());
        run(&mut app, Action::Submit("Hello".to_string())).await;

        let (_, text) = run(&mut app, Action::PlayAudio).await;

        assert!(!text.contains("Playing audio..."));
        assert!(text.contains("❌ There is no voice audio to play"));
    }

    #[tokio::test]
    async fn test_play_failure_is_shown_and_audio_kept() {
        let mut player = MockAudioPlayer::new();
        player
            .expect_play()
            .returning(|_| Err(PlaybackError::Output("no output device".to_string())));
        let mut app = app_with_player(RecordingSynthesizer::default(), player);
        run(&mut app, Action::Submit("Hello".to_string())).await;
        run(&mut app, Action::GenerateVoice).await;

        let (flow, text) = run(&mut app, Action::PlayAudio).await;

        assert_eq!(flow, Flow::Continue);
        assert!(text.contains("❌ Audio output failed: no output device"));
        assert!(app.state().last_audio_ref().is_some());
    }

    #[tokio::test]
    async fn test_new_chat_then_open_restores_transcript() {
        let mut app = app(RecordingSynthesizer::default());
        run(&mut app, Action::Submit("First question".to_string())).await;

        let (_, text) = run(&mut app, Action::NewChat).await;
        assert!(text.contains("[1] 💬 First question"));
        assert!(app.state().active().is_empty());

        run(&mut app, Action::RestoreChat(0)).await;
        assert_eq!(
            app.state().active().first(),
            Some(&Message::user("First question"))
        );

        let (_, text) = run(&mut app, Action::RestoreChat(5)).await;
        assert!(text.contains("❌ No archived chat at position 5"));
    }

    #[tokio::test]
    async fn test_list_and_help_do_not_redraw() {
        let mut app = app(RecordingSynthesizer::default());

        let (_, voices) = run(&mut app, Action::ListVoices).await;
        let (_, help) = run(&mut app, Action::Help).await;

        assert!(voices.contains("Voice Options"));
        assert!(!voices.contains("CHAT KICK"));
        assert!(help.contains("/speak"));
        assert!(!help.contains("CHAT KICK"));
    }

    #[tokio::test]
    async fn test_interrupt_cancels_pending_request() {
        let mut app = app(RecordingSynthesizer::default());
        let mut out = Vec::new();

        let shutdown = run_until_interrupted(
            async {
                app.apply(Action::Submit("hang".to_string()), &mut out).await?;
                Ok::<(), io::Error>(())
            },
            tokio::time::sleep(std::time::Duration::from_millis(20)),
        )
        .await
        .unwrap();

        assert_eq!(shutdown, Shutdown::Interrupted);
        assert!(String::from_utf8(out).unwrap().starts_with("Thinking..."));
        assert_eq!(app.state().active().len(), 1);
    }

    #[tokio::test]
    async fn test_finished_session_is_not_an_interrupt() {
        let shutdown = run_until_interrupted(
            async { Ok::<(), io::Error>(()) },
            std::future::pending::<()>(),
        )
        .await
        .unwrap();

        assert_eq!(shutdown, Shutdown::Finished);
    }

    #[tokio::test]
    async fn test_quit() {
        let mut app = app(RecordingSynthesizer::default());
        let (flow, text) = run(&mut app, Action::Quit).await;
        assert_eq!(flow, Flow::Quit);
        assert!(text.is_empty());
    }
}
