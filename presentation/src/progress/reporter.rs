//! Progress reporting for running conversations

use crate::config::OutputConfig;
use crate::output::console::ConsoleFormatter;
use colloquy_application::ports::progress::ConversationProgress;
use colloquy_domain::{LoopExit, Participant, ParticipantId, SessionId, SkipReason};

/// Prints every turn to stdout as it lands.
///
/// Failures go through the same channel; retries are only visible in the logs.
pub struct ProgressReporter {
    config: OutputConfig,
}

impl ProgressReporter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    fn skip_line(&self, participant: &ParticipantId, reason: SkipReason) -> Option<String> {
        self.config
            .show_skips
            .then(|| ConsoleFormatter::skipped(participant, reason))
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(OutputConfig::default())
    }
}

impl ConversationProgress for ProgressReporter {
    fn on_turn_complete(&self, _session: &SessionId, participant: &Participant, content: &str) {
        println!("{}", ConsoleFormatter::turn(participant, content));
    }

    fn on_turn_failed(&self, _session: &SessionId, participant: &Participant, error: &str) {
        println!("{}", ConsoleFormatter::turn_failed(participant, error));
    }

    fn on_turn_skipped(
        &self,
        _session: &SessionId,
        participant: &ParticipantId,
        reason: SkipReason,
    ) {
        if let Some(line) = self.skip_line(participant, reason) {
            println!("{}", line);
        }
    }

    fn on_interrupted(&self, _session: &SessionId, participant: &ParticipantId) {
        println!("{}", ConsoleFormatter::interrupted(participant));
    }

    fn on_loop_exit(&self, session: &SessionId, exit: &LoopExit) {
        println!("{}", ConsoleFormatter::loop_exit(session, exit));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skips_hidden_by_default() {
        let reporter = ProgressReporter::default();
        assert!(
            reporter
                .skip_line(&"a".into(), SkipReason::SelfReplyCooldown)
                .is_none()
        );
    }

    #[test]
    fn test_skips_shown_when_enabled() {
        let reporter = ProgressReporter::new(OutputConfig {
            show_skips: true,
            ..OutputConfig::default()
        });
        let line = reporter
            .skip_line(&"a".into(), SkipReason::ErrorStatus)
            .unwrap();
        assert!(line.contains("error_status"));
    }
}
