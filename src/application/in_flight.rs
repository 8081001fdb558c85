//! In-flight action registry.
//!
//! A button stays disabled while its own request is running. Acquiring a key
//! that is already held fails; the guard releases the key when dropped, so
//! success, failure, and early return all re-enable the button.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Default)]
pub struct InFlightRegistry {
    keys: Arc<Mutex<HashSet<String>>>,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `key`, or `None` when it is already in flight.
    pub fn try_acquire(&self, key: impl Into<String>) -> Option<InFlightGuard> {
        let key = key.into();
        if !self.lock().insert(key.clone()) {
            return None;
        }
        Some(InFlightGuard {
            registry: self.clone(),
            key,
        })
    }

    pub fn is_in_flight(&self, key: &str) -> bool {
        self.lock().contains(key)
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.keys.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Releases its key on drop.
#[derive(Debug)]
pub struct InFlightGuard {
    registry: InFlightRegistry,
    key: String,
}

impl InFlightGuard {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.registry.lock().remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_until_release() {
        let registry = InFlightRegistry::new();
        let guard = registry.try_acquire("content:video3").unwrap();
        assert!(registry.try_acquire("content:video3").is_none());
        assert!(registry.is_in_flight("content:video3"));

        drop(guard);
        assert!(!registry.is_in_flight("content:video3"));
        assert!(registry.try_acquire("content:video3").is_some());
    }

    #[test]
    fn different_keys_do_not_block_each_other() {
        let registry = InFlightRegistry::new();
        let _a = registry.try_acquire("content:video3").unwrap();
        assert!(registry.try_acquire("content:video4").is_some());
    }
}
