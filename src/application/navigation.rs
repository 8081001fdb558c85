//! Two-phase navigation to an external surface.
//!
//! The tab is reserved synchronously, before the destination is known, then
//! either committed to a URL or closed. A reservation dropped without a
//! commit closes its tab, so no exit path leaves a dangling blank tab.

use std::sync::Arc;

use url::Url;

use crate::domain::foundation::TargetId;
use crate::ports::Navigator;

/// Where a committed navigation ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationTarget {
    /// The reserved tab.
    ReservedTab(TargetId),
    /// The current tab; the reservation was blocked or lost.
    CurrentTab,
}

#[must_use = "dropping a reservation closes its tab"]
pub struct PendingNavigation {
    navigator: Arc<dyn Navigator>,
    target: Option<TargetId>,
}

impl PendingNavigation {
    /// Opens a blank tab. A blocked popup still yields a reservation that
    /// will fall back to the current tab on commit.
    pub fn reserve(navigator: Arc<dyn Navigator>) -> Self {
        let target = navigator.open_blank();
        if target.is_none() {
            tracing::debug!("Popup blocked, checkout will open in the current tab");
        }
        Self { navigator, target }
    }

    pub fn target(&self) -> Option<TargetId> {
        self.target
    }

    /// Sends the reserved tab (or the current one) to `url`.
    pub fn commit(mut self, url: &Url) -> NavigationTarget {
        match self.target.take() {
            Some(target) => match self.navigator.navigate(target, url) {
                Ok(()) => NavigationTarget::ReservedTab(target),
                Err(e) => {
                    tracing::warn!(error = %e, "Reserved tab lost, navigating current tab");
                    self.navigator.navigate_current(url);
                    NavigationTarget::CurrentTab
                }
            },
            None => {
                self.navigator.navigate_current(url);
                NavigationTarget::CurrentTab
            }
        }
    }

    /// Closes the reserved tab.
    pub fn abandon(mut self) {
        self.close();
    }

    fn close(&mut self) {
        if let Some(target) = self.target.take() {
            self.navigator.close(target);
        }
    }
}

impl Drop for PendingNavigation {
    fn drop(&mut self) {
        self.close();
    }
}
