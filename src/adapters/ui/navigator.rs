//! Headless navigator that records what the page asked for.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use url::Url;

use crate::domain::foundation::TargetId;
use crate::ports::{NavigationError, Navigator};

/// One thing the page did to tabs or location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NavigationEvent {
    Opened { target: TargetId },
    PopupBlocked,
    Navigated { target: TargetId, url: Url },
    Closed { target: TargetId },
    NavigatedCurrent { url: Url },
    Replaced { url: Url },
}

#[derive(Debug, Default)]
struct NavigatorState {
    open: HashSet<TargetId>,
    events: Vec<NavigationEvent>,
    block_popups: bool,
    current: Option<Url>,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    inner: Arc<Mutex<NavigatorState>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Navigator whose current location starts at `url`.
    pub fn at(url: Url) -> Self {
        let navigator = Self::new();
        navigator.state().current = Some(url);
        navigator
    }

    /// Makes every subsequent `open_blank` fail as if a popup blocker fired.
    pub fn block_popups(&self, blocked: bool) {
        self.state().block_popups = blocked;
    }

    pub fn events(&self) -> Vec<NavigationEvent> {
        self.state().events.clone()
    }

    pub fn open_targets(&self) -> usize {
        self.state().open.len()
    }

    pub fn current_url(&self) -> Option<Url> {
        self.state().current.clone()
    }

    /// Last URL any tab or the current page was sent to.
    pub fn last_destination(&self) -> Option<Url> {
        self.state().events.iter().rev().find_map(|e| match e {
            NavigationEvent::Navigated { url, .. } | NavigationEvent::NavigatedCurrent { url } => {
                Some(url.clone())
            }
            _ => None,
        })
    }

    fn state(&self) -> MutexGuard<'_, NavigatorState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Navigator for RecordingNavigator {
    fn open_blank(&self) -> Option<TargetId> {
        let mut state = self.state();
        if state.block_popups {
            state.events.push(NavigationEvent::PopupBlocked);
            return None;
        }
        let target = TargetId::new();
        state.open.insert(target);
        state.events.push(NavigationEvent::Opened { target });
        Some(target)
    }

    fn navigate(&self, target: TargetId, url: &Url) -> Result<(), NavigationError> {
        let mut state = self.state();
        if !state.open.contains(&target) {
            return Err(NavigationError::TargetClosed(target));
        }
        state.events.push(NavigationEvent::Navigated {
            target,
            url: url.clone(),
        });
        Ok(())
    }

    fn close(&self, target: TargetId) {
        let mut state = self.state();
        if state.open.remove(&target) {
            state.events.push(NavigationEvent::Closed { target });
        }
    }

    fn navigate_current(&self, url: &Url) {
        let mut state = self.state();
        state.current = Some(url.clone());
        state.events.push(NavigationEvent::NavigatedCurrent { url: url.clone() });
    }

    fn replace_location(&self, url: &Url) {
        let mut state = self.state();
        state.current = Some(url.clone());
        state.events.push(NavigationEvent::Replaced { url: url.clone() });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn open_navigate_close() {
        let nav = RecordingNavigator::new();
        let target = nav.open_blank().unwrap();
        nav.navigate(target, &url("https://pay.example/s/1")).unwrap();
        nav.close(target);
        nav.close(target);

        assert_eq!(nav.open_targets(), 0);
        assert_eq!(nav.events().len(), 3);
        assert_eq!(nav.last_destination(), Some(url("https://pay.example/s/1")));
    }

    #[test]
    fn navigating_a_closed_target_fails() {
        let nav = RecordingNavigator::new();
        let target = nav.open_blank().unwrap();
        nav.close(target);
        assert_eq!(
            nav.navigate(target, &url("https://pay.example")),
            Err(NavigationError::TargetClosed(target))
        );
    }

    #[test]
    fn blocked_popup_returns_none() {
        let nav = RecordingNavigator::new();
        nav.block_popups(true);
        assert!(nav.open_blank().is_none());
        assert_eq!(nav.events(), vec![NavigationEvent::PopupBlocked]);
    }

    #[test]
    fn replace_location_updates_current_url() {
        let nav = RecordingNavigator::at(url("https://fans.example/u/a/profile1?membership=success"));
        nav.replace_location(&url("https://fans.example/u/a/profile1"));
        assert_eq!(nav.current_url(), Some(url("https://fans.example/u/a/profile1")));
    }
}
