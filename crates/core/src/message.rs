use serde::{Deserialize, Serialize};

/// Maximum number of characters kept from the first message when titling an archived chat.
pub const ARCHIVE_TITLE_MAX_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
}

/// A single entry in the transcript. Messages are never edited after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    role: Role,
    content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Messages in chronological order.
///
/// Turn alternation is not enforced: a failed generation leaves a user message
/// without a reply, and the next submission appends another user message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn first(&self) -> Option<&Message> {
        self.messages.first()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

impl From<Vec<Message>> for Conversation {
    fn from(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

impl<'a> IntoIterator for &'a Conversation {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

/// A snapshot of a past conversation kept in the sidebar for re-selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedConversation {
    title: String,
    messages: Conversation,
}

impl ArchivedConversation {
    /// Snapshots `conversation`, or returns `None` when there is nothing to archive.
    ///
    /// The title is the first [`ARCHIVE_TITLE_MAX_CHARS`] characters of the first
    /// message, whoever sent it.
    pub fn from_conversation(conversation: &Conversation) -> Option<Self> {
        let first = conversation.first()?;
        Some(Self {
            title: archive_title(first.content()),
            messages: conversation.clone(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn messages(&self) -> &Conversation {
        &self.messages
    }
}

fn archive_title(content: &str) -> String {
    content.chars().take(ARCHIVE_TITLE_MAX_CHARS).collect()
}
