use crate::message::{ArchivedConversation, Conversation, Role};
use std::path::{Path, PathBuf};

/// Handle to the most recently synthesized audio file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioRef {
    path: PathBuf,
    size_bytes: usize,
}

impl AudioRef {
    pub fn new(path: impl Into<PathBuf>, size_bytes: usize) -> Self {
        Self {
            path: path.into(),
            size_bytes,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }
}

/// Voice generation progress for the last assistant reply.
///
/// Transitions happen only on explicit user action:
/// `Idle -> Requesting -> Ready | Failed`, and back to `Idle` when a new
/// message is submitted or a new chat is started.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum VoiceStatus {
    #[default]
    Idle,
    Requesting,
    Ready(AudioRef),
    Failed(String),
}

/// Everything the front-end needs to render one frame.
///
/// Lives only as long as the interactive session; nothing is persisted.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub(crate) active: Conversation,
    pub(crate) archive: Vec<ArchivedConversation>,
    pub(crate) voice: VoiceStatus,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> &Conversation {
        &self.active
    }

    /// Archived chats, oldest first.
    pub fn archive(&self) -> &[ArchivedConversation] {
        &self.archive
    }

    pub fn voice(&self) -> &VoiceStatus {
        &self.voice
    }

    pub fn last_audio_ref(&self) -> Option<&AudioRef> {
        match &self.voice {
            VoiceStatus::Ready(audio) => Some(audio),
            _ => None,
        }
    }

    /// True when the transcript ends with an assistant reply that can be voiced.
    pub fn can_generate_voice(&self) -> bool {
        self.active
            .last()
            .is_some_and(|message| message.role() == Role::Assistant)
    }

    pub(crate) fn reset_voice(&mut self) {
        self.voice = VoiceStatus::Idle;
    }
}
