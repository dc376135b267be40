use chrono::Utc;
use shared::domain::{ChatMessage, ChatMessageState, ChatRole, MessageId};

pub const PENDING_TEXT: &str = "Analyzing docs...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InquiryAnswer {
    pub text: String,
    pub sources: Option<String>,
}

/// Append-only chat history. Only pending bot messages may change, and only once.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    next_id: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, text: impl Into<String>) -> &ChatMessage {
        self.push(ChatRole::User, text.into(), ChatMessageState::Resolved)
    }

    pub fn push_pending_bot(&mut self) -> &ChatMessage {
        self.push(
            ChatRole::Bot,
            PENDING_TEXT.to_string(),
            ChatMessageState::Pending,
        )
    }

    /// Fills in a pending bot placeholder. Returns the updated message, or `None`
    /// if `id` is unknown or already resolved.
    pub fn resolve(&mut self, id: MessageId, answer: InquiryAnswer) -> Option<&ChatMessage> {
        let message = self
            .messages
            .iter_mut()
            .find(|message| message.id == id && message.role == ChatRole::Bot)?;
        if !message.is_pending() {
            return None;
        }
        message.text = answer.text;
        message.sources = answer.sources;
        message.state = ChatMessageState::Resolved;
        Some(&*message)
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn push(&mut self, role: ChatRole, text: String, state: ChatMessageState) -> &ChatMessage {
        self.next_id += 1;
        self.messages.push(ChatMessage {
            id: MessageId(self.next_id),
            role,
            text,
            sources: None,
            state,
            sent_at: Utc::now(),
        });
        let last = self.messages.len() - 1;
        &self.messages[last]
    }
}

#[cfg(test)]
#[path = "tests/transcript_tests.rs"]
mod tests;
