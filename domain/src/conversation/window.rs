//! The slice of transcript a provider sees for one turn.

use crate::core::ids::ParticipantId;
use crate::session::{MessageAuthor, SessionSnapshot};
use serde::{Deserialize, Serialize};

/// Default number of recent messages handed to a provider.
pub const DEFAULT_CONTEXT_MESSAGES: usize = 20;

/// How a window entry relates to the participant about to speak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowRole {
    /// Written by the speaker itself
    Own,
    /// Written by another participant
    Other,
    /// Host-supplied text
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowEntry {
    pub role: WindowRole,
    /// Display name of the author ("user" for host messages)
    pub speaker: String,
    pub content: String,
}

/// Most recent transcript messages, labelled from the speaker's point of view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationWindow {
    entries: Vec<WindowEntry>,
}

impl ConversationWindow {
    pub fn build(snapshot: &SessionSnapshot, speaker: &ParticipantId, max_messages: usize) -> Self {
        let skip = snapshot.messages.len().saturating_sub(max_messages);
        let entries = snapshot
            .messages
            .iter()
            .skip(skip)
            .map(|message| match &message.author {
                MessageAuthor::User => WindowEntry {
                    role: WindowRole::User,
                    speaker: "user".to_string(),
                    content: message.content.clone(),
                },
                MessageAuthor::Participant(id) => WindowEntry {
                    role: if id == speaker {
                        WindowRole::Own
                    } else {
                        WindowRole::Other
                    },
                    speaker: snapshot
                        .participant(id)
                        .map(|p| p.name.clone())
                        .unwrap_or_else(|| id.to_string()),
                    content: message.content.clone(),
                },
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[WindowEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&WindowEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Plain-text rendering, one `speaker: content` block per entry.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{}: {}", e.speaker, e.content))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::participant::Participant;
    use crate::session::TranscriptMessage;

    fn snapshot() -> SessionSnapshot {
        let mut snapshot = SessionSnapshot::new("s");
        snapshot.participants = vec![
            Participant::agent("a", "echo", "m").with_name("Alice"),
            Participant::agent("b", "echo", "m").with_name("Bob"),
        ];
        snapshot.messages = vec![
            TranscriptMessage::from_user("Discuss tabs vs spaces"),
            TranscriptMessage::from_participant("a", "Tabs."),
            TranscriptMessage::from_participant("b", "Spaces."),
        ];
        snapshot
    }

    #[test]
    fn test_roles_relative_to_speaker() {
        let window = ConversationWindow::build(&snapshot(), &"a".into(), 20);
        let roles: Vec<WindowRole> = window.entries().iter().map(|e| e.role).collect();
        assert_eq!(
            roles,
            vec![WindowRole::User, WindowRole::Own, WindowRole::Other]
        );
        assert_eq!(window.entries()[2].speaker, "Bob");
    }

    #[test]
    fn test_window_keeps_most_recent() {
        let window = ConversationWindow::build(&snapshot(), &"a".into(), 2);
        assert_eq!(window.len(), 2);
        assert_eq!(window.entries()[0].content, "Tabs.");
        assert_eq!(window.last().unwrap().content, "Spaces.");
    }

    #[test]
    fn test_render() {
        let window = ConversationWindow::build(&snapshot(), &"b".into(), 1);
        assert_eq!(window.render(), "Bob: Spaces.");
    }

    #[test]
    fn test_departed_author_falls_back_to_id() {
        let mut snapshot = snapshot();
        snapshot
            .messages
            .push(TranscriptMessage::from_participant("gone", "bye"));
        let window = ConversationWindow::build(&snapshot, &"a".into(), 20);
        assert_eq!(window.last().unwrap().speaker, "gone");
    }
}
