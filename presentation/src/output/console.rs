//! Console output formatter for conversations

use colloquy_domain::{
    ConversationStats, LoopExit, LoopPhase, Participant, ParticipantId, SessionId, SkipReason,
};
use colored::Colorize;

/// Formats conversation events for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Banner printed before the first turn
    pub fn header(session: &SessionId, prompt: &str, roster: &[Participant]) -> String {
        let mut output = String::new();
        let line = "=".repeat(60);
        output.push_str(&format!(
            "{}\n{:^60}\n{}\n\n",
            line.cyan(),
            "Colloquy".bold(),
            line.cyan()
        ));
        output.push_str(&format!("{} {}\n", "Session:".cyan().bold(), session));
        output.push_str(&format!("{} {}\n", "Prompt:".cyan().bold(), prompt));
        output.push_str(&format!("{}\n", "Participants:".cyan().bold()));
        for participant in roster {
            output.push_str(&format!("  * {}\n", Self::describe(participant)));
        }
        output
    }

    /// `name [role, provider/model]`
    pub fn describe(participant: &Participant) -> String {
        if participant.is_moderator() {
            format!("{} [{}]", participant.name, participant.role)
        } else {
            format!(
                "{} [{}, {}/{}]",
                participant.name, participant.role, participant.provider, participant.model
            )
        }
    }

    pub fn turn(participant: &Participant, content: &str) -> String {
        format!(
            "\n{}\n{}\n",
            format!("── {} ──", participant.name).yellow().bold(),
            content
        )
    }

    pub fn turn_failed(participant: &Participant, error: &str) -> String {
        format!(
            "\n{}\nError: {}\n",
            format!("── {} ──", participant.name).red().bold(),
            error
        )
    }

    pub fn skipped(participant: &ParticipantId, reason: SkipReason) -> String {
        format!("  {} {} ({})", "-".dimmed(), participant, reason.as_str().dimmed())
    }

    pub fn interrupted(participant: &ParticipantId) -> String {
        format!("  {} {} was interrupted", "!".yellow(), participant)
    }

    pub fn loop_exit(session: &SessionId, exit: &LoopExit) -> String {
        let status = if exit.is_terminal() {
            "ended".green().bold()
        } else {
            "halted".yellow().bold()
        };
        format!("\n{} {} {}: {}", "->".cyan(), session, status, exit)
    }

    /// Summary printed when the run ends
    pub fn stats(stats: &ConversationStats) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n{}\n{}\n", "Session Stats".cyan().bold(), "-".repeat(40)));
        output.push_str(&format!("  {:<18} {}\n", "Messages:", stats.message_count));
        output.push_str(&format!(
            "  {:<18} {}\n",
            "Phase:",
            Self::phase(stats.phase)
        ));
        output.push_str(&format!(
            "  {:<18} {}\n",
            "Last speaker:",
            Self::optional(stats.last_generated_by.as_ref())
        ));
        output.push_str(&format!(
            "  {:<18} {}\n",
            "Interrupted:",
            match &stats.interrupted_participant {
                Some(id) if stats.interrupted => id.to_string(),
                _ => "no".to_string(),
            }
        ));
        output
    }

    pub fn stats_json(stats: &ConversationStats) -> String {
        serde_json::to_string_pretty(stats).unwrap_or_else(|_| "{}".to_string())
    }

    fn phase(phase: LoopPhase) -> &'static str {
        match phase {
            LoopPhase::Init => "init",
            LoopPhase::Running => "running",
            LoopPhase::Paused => "paused",
            LoopPhase::Stopped => "stopped",
        }
    }

    fn optional(id: Option<&ParticipantId>) -> String {
        id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
