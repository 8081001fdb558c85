//! Headless page-host adapters.
//!
//! Stand in for the browser: the binary uses them to run a page without a
//! window, tests use them to assert on tabs, confirmations, and alerts.

mod navigator;
mod prompt;

pub use navigator::{NavigationEvent, RecordingNavigator};
pub use prompt::ScriptedPrompt;
