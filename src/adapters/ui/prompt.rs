//! Scripted prompt: answers confirmations from a queue and records alerts.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::ports::{UserAlert, UserPrompt};

#[derive(Debug, Default)]
struct PromptState {
    answers: VecDeque<bool>,
    default_answer: bool,
    confirmations: Vec<String>,
    alerts: Vec<UserAlert>,
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompt {
    inner: Arc<Mutex<PromptState>>,
}

impl ScriptedPrompt {
    /// Declines every confirmation until told otherwise.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts every confirmation.
    pub fn accepting() -> Self {
        let prompt = Self::new();
        prompt.state().default_answer = true;
        prompt
    }

    /// Queues the answer for the next confirmation.
    pub fn answer_next(&self, answer: bool) {
        self.state().answers.push_back(answer);
    }

    pub fn confirmations(&self) -> Vec<String> {
        self.state().confirmations.clone()
    }

    pub fn alerts(&self) -> Vec<UserAlert> {
        self.state().alerts.clone()
    }

    pub fn last_alert(&self) -> Option<UserAlert> {
        self.state().alerts.last().cloned()
    }

    fn state(&self) -> MutexGuard<'_, PromptState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl UserPrompt for ScriptedPrompt {
    async fn confirm(&self, message: &str) -> bool {
        let mut state = self.state();
        state.confirmations.push(message.to_string());
        let default = state.default_answer;
        state.answers.pop_front().unwrap_or(default)
    }

    fn alert(&self, alert: UserAlert) {
        tracing::info!(severity = ?alert.severity, message = %alert.message, "Alert shown");
        self.state().alerts.push(alert);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::AlertSeverity;

    #[tokio::test]
    async fn queued_answers_come_before_the_default() {
        let prompt = ScriptedPrompt::accepting();
        prompt.answer_next(false);

        assert!(!prompt.confirm("first?").await);
        assert!(prompt.confirm("second?").await);
        assert_eq!(prompt.confirmations(), vec!["first?", "second?"]);
    }

    #[test]
    fn alerts_are_recorded() {
        let prompt = ScriptedPrompt::new();
        prompt.alert(UserAlert::critical("Payment successful, but..."));
        assert_eq!(prompt.last_alert().unwrap().severity, AlertSeverity::Critical);
    }
}
