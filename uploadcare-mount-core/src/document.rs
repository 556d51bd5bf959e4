//! Seam between the coordinator and the host persistence layer.
//!
//! The host owns field storage, dirty tracking and callback dispatch. It hands
//! the coordinator a [`Document`] to read fields from and a [`ChangeSet`]
//! describing what changed in the current save.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use crate::processing::ProcessingFlags;

/// A persisted document as seen by mounted attributes.
pub trait Document: Send + Sync {
    /// Raw string value of a field, `None` when the field is unset.
    fn read_attribute(&self, name: &str) -> Option<String>;

    /// Transient per-instance processing state.
    fn processing_flags(&self) -> &ProcessingFlags;
}

/// Names of the attributes changed by the save being processed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    changed: HashSet<String>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&mut self, attribute: impl Into<String>) {
        self.changed.insert(attribute.into());
    }

    pub fn contains(&self, attribute: &str) -> bool {
        self.changed.contains(attribute)
    }

    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        ChangeSet {
            changed: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// In-memory document with its own dirty tracking.
#[derive(Debug, Default)]
pub struct MemoryDocument {
    state: Mutex<FieldState>,
    flags: ProcessingFlags,
}

#[derive(Debug, Default)]
struct FieldState {
    fields: HashMap<String, String>,
    changes: ChangeSet,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Document with initial field values and no pending changes.
    pub fn with_fields<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let doc = Self::new();
        doc.lock().fields = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        doc
    }

    /// Assign a field. Marks it dirty only when the value differs.
    pub fn set(&self, name: &str, value: impl Into<String>) {
        let value = value.into();
        let mut state = self.lock();
        if state.fields.get(name) == Some(&value) {
            return;
        }
        state.fields.insert(name.to_string(), value);
        state.changes.mark(name);
    }

    /// Return the pending changes and reset dirty tracking, as a save does.
    pub fn take_changes(&self) -> ChangeSet {
        std::mem::take(&mut self.lock().changes)
    }

    fn lock(&self) -> MutexGuard<'_, FieldState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Document for MemoryDocument {
    fn read_attribute(&self, name: &str) -> Option<String> {
        self.lock().fields.get(name).cloned()
    }

    fn processing_flags(&self) -> &ProcessingFlags {
        &self.flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_tracks_only_real_changes() {
        let doc = MemoryDocument::with_fields([("avatar", "a")]);
        doc.set("avatar", "a");
        assert!(doc.take_changes().is_empty());

        doc.set("avatar", "b");
        let changes = doc.take_changes();
        assert!(changes.contains("avatar"));
        assert_eq!(doc.read_attribute("avatar").as_deref(), Some("b"));
        assert!(doc.take_changes().is_empty());
    }
}
