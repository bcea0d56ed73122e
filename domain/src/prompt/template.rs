//! Prompt templates for rotation turns

use crate::participant::Participant;
use crate::session::SessionSnapshot;

/// Templates for generating the per-turn system prompt
pub struct PromptTemplate;

impl PromptTemplate {
    /// Default system prompt naming the speaker and the other participants
    pub fn conversation_system(speaker: &str, others: &[&str]) -> String {
        let others = if others.is_empty() {
            "the other participants".to_string()
        } else {
            others.join(", ")
        };
        format!(
            r#"You are {speaker}, one voice in an ongoing multi-party conversation with {others}.
Read the conversation so far and contribute your next message.
Respond only as {speaker}; do not write lines for anyone else.
Keep your reply focused and conversational."#
        )
    }

    /// System prompt for `participant` within `snapshot`.
    ///
    /// The participant's own prompt wins over the default template.
    pub fn system_prompt_for(participant: &Participant, snapshot: &SessionSnapshot) -> String {
        if let Some(prompt) = participant
            .system_prompt
            .as_deref()
            .filter(|p| !p.trim().is_empty())
        {
            return prompt.to_string();
        }
        let others: Vec<&str> = snapshot
            .eligible_participants()
            .into_iter()
            .filter(|p| p.id != participant.id)
            .map(|p| p.name.as_str())
            .collect();
        Self::conversation_system(&participant.name, &others)
    }
}
