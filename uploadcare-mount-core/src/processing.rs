//! Re-entrancy guard for store dispatch.
//!
//! A single save can run the after-save hooks more than once (nested saves
//! from other hooks). [`ProcessingFlags`] records which attributes of a
//! document currently have a store in flight so the nested call can bail out.
//! The record lives as long as the document instance and is never persisted.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct ProcessingFlags {
    active: Mutex<HashSet<String>>,
}

impl ProcessingFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag for `attribute`, or return `None` if it is already set.
    ///
    /// The flag is cleared when the returned guard is dropped, whether the
    /// guarded work succeeded, failed or was cancelled.
    pub fn try_begin(&self, attribute: &str) -> Option<ProcessingGuard<'_>> {
        if !self.lock().insert(attribute.to_string()) {
            return None;
        }
        Some(ProcessingGuard {
            flags: self,
            attribute: attribute.to_string(),
        })
    }

    pub fn is_processing(&self, attribute: &str) -> bool {
        self.lock().contains(attribute)
    }

    // A poisoned lock only means another holder panicked mid-insert/remove;
    // the set itself is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Clears its attribute's processing flag on drop.
#[derive(Debug)]
pub struct ProcessingGuard<'a> {
    flags: &'a ProcessingFlags,
    attribute: String,
}

impl ProcessingGuard<'_> {
    pub fn attribute(&self) -> &str {
        &self.attribute
    }
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.flags.lock().remove(&self.attribute);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_begin_is_refused_until_guard_drops() {
        let flags = ProcessingFlags::new();

        let guard = flags.try_begin("avatar").expect("first begin");
        assert!(flags.is_processing("avatar"));
        assert!(flags.try_begin("avatar").is_none());
        assert!(flags.try_begin("document").is_some(), "flags are per attribute");

        drop(guard);
        assert!(!flags.is_processing("avatar"));
        assert!(flags.try_begin("avatar").is_some());
    }
}
