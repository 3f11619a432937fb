//! Bounded chat history and its prompt rendering.

use serde::Serialize;

use docqa_core::HistoryConfig;

/// Markers that start the citation suffix of an assistant answer.
const CITATION_MARKERS: [&str; 2] = ["\n\n**Document Pages:**", "\n\n**Web Sources:**"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Conversation so far, trimmed to the most recent messages.
#[derive(Debug, Clone)]
pub struct ChatHistory {
    messages: Vec<ChatMessage>,
    max_messages: usize,
    context_turns: usize,
}

impl Default for ChatHistory {
    fn default() -> Self {
        Self::new(&HistoryConfig::default())
    }
}

impl ChatHistory {
    pub fn new(config: &HistoryConfig) -> Self {
        Self {
            messages: Vec::new(),
            max_messages: config.max_messages,
            context_turns: config.context_turns,
        }
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

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(Role::User, content.into());
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(Role::Assistant, content.into());
    }

    fn push(&mut self, role: Role, content: String) {
        self.messages.push(ChatMessage { role, content });
        if self.messages.len() > self.max_messages {
            let excess = self.messages.len() - self.max_messages;
            self.messages.drain(..excess);
        }
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Render the last few turns for the prompt, without citation blocks.
    pub fn format_for_prompt(&self) -> String {
        if self.messages.is_empty() {
            return "No previous conversation.".to_string();
        }

        let keep = self.context_turns * 2;
        let start = self.messages.len().saturating_sub(keep);

        self.messages[start..]
            .iter()
            .map(|msg| match msg.role {
                Role::User => format!("User: {}", msg.content),
                Role::Assistant => format!("Assistant: {}", strip_citations(&msg.content)),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Cut an answer at its citation suffix.
pub fn strip_citations(content: &str) -> &str {
    CITATION_MARKERS.iter().fold(content, |text, marker| {
        text.split(marker).next().unwrap_or(text)
    })
}
