//! Local playback of synthesized audio.
//!
//! The default player hands the file to an external command. Building with the
//! `native-audio` feature adds [`RodioPlayer`], which decodes and plays the file
//! on the host's default output device.

use async_trait::async_trait;
use chatkick_core::AudioRef;
#[cfg(test)]
use mockall::automock;
use std::process::{ExitStatus, Stdio};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("Audio player command is empty")]
    EmptyCommand,
    #[error("Could not start audio player '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Audio player '{program}' exited with {status}")]
    Exited { program: String, status: ExitStatus },
    #[error("Audio output failed: {0}")]
    Output(String),
    #[error("Audio playback task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Plays an audio file to completion.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    async fn play(&self, audio: &AudioRef) -> Result<(), PlaybackError>;
}

/// Runs `program args... <path>` and waits for it to exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPlayer {
    program: String,
    args: Vec<String>,
}

impl CommandPlayer {
    /// Splits a command line such as `"mpv --no-video"` on whitespace.
    pub fn from_command_line(command_line: &str) -> Result<Self, PlaybackError> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or(PlaybackError::EmptyCommand)?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    pub fn platform_default() -> Self {
        let (program, args): (&str, &[&str]) = if cfg!(target_os = "macos") {
            ("afplay", &[])
        } else {
            ("ffplay", &["-nodisp", "-autoexit", "-loglevel", "quiet"])
        };
        Self {
            program: program.to_string(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl AudioPlayer for CommandPlayer {
    async fn play(&self, audio: &AudioRef) -> Result<(), PlaybackError> {
        tracing::debug!(program = %self.program, path = %audio.path().display(), "Starting audio player");
        let status = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .arg(audio.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|source| PlaybackError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(PlaybackError::Exited {
                program: self.program.clone(),
                status,
            });
        }
        Ok(())
    }
}

/// `RodioPlayer` when built with `native-audio`, otherwise the platform's command-line player.
#[cfg(feature = "native-audio")]
pub fn default_player() -> Box<dyn AudioPlayer> {
    Box::new(RodioPlayer)
}

#[cfg(not(feature = "native-audio"))]
pub fn default_player() -> Box<dyn AudioPlayer> {
    Box::new(CommandPlayer::platform_default())
}

/// Decodes the file with `rodio` and plays it on the default output device.
#[cfg(feature = "native-audio")]
#[derive(Debug, Default)]
pub struct RodioPlayer;

#[cfg(feature = "native-audio")]
#[async_trait]
impl AudioPlayer for RodioPlayer {
    async fn play(&self, audio: &AudioRef) -> Result<(), PlaybackError> {
        let path = audio.path().to_path_buf();
        // The output stream is not `Send`, so it lives entirely on the blocking thread.
        tokio::task::spawn_blocking(move || play_to_end(&path)).await?
    }
}

#[cfg(feature = "native-audio")]
fn play_to_end(path: &std::path::Path) -> Result<(), PlaybackError> {
    let (_stream, handle) = rodio::OutputStream::try_default().map_err(output_error)?;
    let sink = rodio::Sink::try_new(&handle).map_err(output_error)?;
    let file = std::fs::File::open(path).map_err(output_error)?;
    let source = rodio::Decoder::new(std::io::BufReader::new(file)).map_err(output_error)?;

    sink.append(source);
    sink.sleep_until_end();
    Ok(())
}

#[cfg(feature = "native-audio")]
fn output_error(e: impl std::fmt::Display) -> PlaybackError {
    PlaybackError::Output(e.to_string())
}
