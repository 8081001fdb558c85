//! Navigator port - tabs and location of the hosting page.
//!
//! Opening a tab must happen synchronously inside the user gesture, before
//! the checkout URL is known; hence `open_blank` returns a handle that is
//! filled in later or closed.

use thiserror::Error;
use url::Url;

use crate::domain::foundation::TargetId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("Navigation target {0} is no longer open")]
    TargetClosed(TargetId),
}

pub trait Navigator: Send + Sync {
    /// Opens a blank tab. `None` when the popup was blocked.
    fn open_blank(&self) -> Option<TargetId>;

    /// Points a previously opened tab at `url`.
    fn navigate(&self, target: TargetId, url: &Url) -> Result<(), NavigationError>;

    /// Closes a previously opened tab. Closing twice is a no-op.
    fn close(&self, target: TargetId);

    /// Sends the current tab to `url`.
    fn navigate_current(&self, url: &Url);

    /// Rewrites the current URL without reloading (history replace).
    fn replace_location(&self, url: &Url);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigator_is_object_safe() {
        fn _accepts_dyn(_navigator: &dyn Navigator) {}
    }
}
