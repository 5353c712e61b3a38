//! Terminal rendering of the session.
//!
//! Each call draws a complete frame from the state alone, mirroring a page
//! re-render: sidebar first, then the transcript, then voice controls.

use chatkick_core::voice::{VOICE_CATALOG, VoiceOption};
use chatkick_core::{Role, SessionState, VoiceStatus};
use std::fmt::Display;
use std::io::{self, Write};

pub const APP_TITLE: &str = "Chatkick";
const HEADING: &str = "🤖 CHAT KICK...";
const RULE: &str = "────────────────────────────────────────";

pub fn render<W: Write>(
    state: &SessionState,
    selected_voice: &VoiceOption,
    out: &mut W,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{RULE}")?;
    writeln!(out, "{APP_TITLE}  |  🎙️ Voice: {}", selected_voice.name)?;

    writeln!(out, "Chat History")?;
    if state.archive().is_empty() {
        writeln!(out, "  (none)")?;
    }
    for (number, chat) in state.archive().iter().enumerate() {
        writeln!(out, "  [{}] 💬 {}", number + 1, chat.title())?;
    }
    writeln!(out, "{RULE}")?;

    writeln!(out, "{HEADING}")?;
    for message in state.active() {
        let marker = match message.role() {
            Role::User => "🧑",
            Role::Assistant => "🤖",
        };
        writeln!(out, "{marker} {}", message.content())?;
    }

    match state.voice() {
        VoiceStatus::Ready(audio) => writeln!(
            out,
            "🔊 Audio: {} (type /play to listen)",
            audio.path().display()
        )?,
        VoiceStatus::Failed(error) => writeln!(out, "❌ {error}")?,
        VoiceStatus::Requesting => writeln!(out, "Generating voice...")?,
        VoiceStatus::Idle => {
            if state.can_generate_voice() {
                writeln!(out, "🔊 Generate Voice: type /speak")?;
            }
        }
    }
    writeln!(out, "{RULE}")?;
    out.flush()
}

pub fn render_voices<W: Write>(selected_voice: &VoiceOption, out: &mut W) -> io::Result<()> {
    writeln!(out, "🎙️ Voice Options")?;
    for (number, voice) in VOICE_CATALOG.iter().enumerate() {
        let mark = if voice == selected_voice { "*" } else { " " };
        writeln!(out, " {mark}[{}] {}", number + 1, voice.name)?;
    }
    out.flush()
}

pub fn render_error<W: Write>(error: &dyn Display, out: &mut W) -> io::Result<()> {
    writeln!(out, "❌ {error}")?;
    out.flush()
}

pub fn render_notice<W: Write>(notice: &str, out: &mut W) -> io::Result<()> {
    writeln!(out, "{notice}")?;
    out.flush()
}

pub fn render_prompt<W: Write>(out: &mut W) -> io::Result<()> {
    write!(out, "➤ ")?;
    out.flush()
}
