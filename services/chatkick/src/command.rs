//! Maps one line of terminal input to one user action.

use chatkick_core::voice::{self, VoiceOption};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Submit(String),
    NewChat,
    ClearHistory,
    /// Zero-based archive index.
    RestoreChat(usize),
    ListVoices,
    SelectVoice(&'static VoiceOption),
    GenerateVoice,
    PlayAudio,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Unknown command '/{0}'. Type /help for the list of commands.")]
    Unknown(String),
    #[error("/{command} expects {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },
    #[error("'{0}' is not a chat number shown in the history")]
    InvalidChatNumber(String),
    #[error("No voice named or numbered '{0}'. Type /voices to list them.")]
    UnknownVoice(String),
}

pub const HELP: &str = "\
Type a message and press Enter to send it.
  /new          start a new chat (the current one moves to the history)
  /clear        clear the chat history
  /open N       reopen chat N from the history
  /voices       list the available voices
  /voice N|NAME select a voice
  /speak        generate voice for the last reply
  /play         play the generated voice
  /help         show this help
  /quit         leave";

/// Anything not starting with `/` is a message, including an empty line.
pub fn parse(line: &str) -> Result<Action, CommandError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(rest) = line.trim_start().strip_prefix('/') else {
        return Ok(Action::Submit(line.to_string()));
    };

    let (command, argument) = match rest.split_once(char::is_whitespace) {
        Some((command, argument)) => (command, argument.trim()),
        None => (rest, ""),
    };

    match command.to_ascii_lowercase().as_str() {
        "new" => Ok(Action::NewChat),
        "clear" => Ok(Action::ClearHistory),
        "open" => parse_chat_number(argument).map(Action::RestoreChat),
        "voices" => Ok(Action::ListVoices),
        "voice" => parse_voice(argument).map(Action::SelectVoice),
        "speak" => Ok(Action::GenerateVoice),
        "play" => Ok(Action::PlayAudio),
        "help" => Ok(Action::Help),
        "quit" | "exit" => Ok(Action::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

// History entries are shown numbered from 1.
fn parse_chat_number(argument: &str) -> Result<usize, CommandError> {
    if argument.is_empty() {
        return Err(CommandError::MissingArgument {
            command: "open",
            expected: "a chat number",
        });
    }
    match argument.parse::<usize>() {
        Ok(number) if number >= 1 => Ok(number - 1),
        _ => Err(CommandError::InvalidChatNumber(argument.to_string())),
    }
}

fn parse_voice(argument: &str) -> Result<&'static VoiceOption, CommandError> {
    if argument.is_empty() {
        return Err(CommandError::MissingArgument {
            command: "voice",
            expected: "a voice number or name",
        });
    }
    let by_number = argument
        .parse::<usize>()
        .ok()
        .and_then(|number| number.checked_sub(1))
        .and_then(voice::voice_at);
    by_number
        .or_else(|| voice::find_voice(argument))
        .ok_or_else(|| CommandError::UnknownVoice(argument.to_string()))
}
