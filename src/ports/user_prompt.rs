//! User prompt port - confirmation dialogs and alerts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Info,
    Error,
    /// Money has moved but the result could not be confirmed.
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAlert {
    pub severity: AlertSeverity,
    pub message: String,
}

impl UserAlert {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: AlertSeverity::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: AlertSeverity::Error,
            message: message.into(),
        }
    }

    pub fn critical(message: impl Into<String>) -> Self {
        Self {
            severity: AlertSeverity::Critical,
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait UserPrompt: Send + Sync {
    /// Asks the viewer to confirm; `false` when declined or dismissed.
    async fn confirm(&self, message: &str) -> bool;

    /// Shows an alert.
    fn alert(&self, alert: UserAlert);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_prompt_is_object_safe() {
        fn _accepts_dyn(_prompt: &dyn UserPrompt) {}
    }
}
