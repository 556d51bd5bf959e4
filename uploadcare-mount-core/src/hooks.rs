//! # hooks: lifecycle hook registration
//!
//! The host persistence layer keeps one [`HookRegistry`] per document type and
//! calls its entry points around persistence events:
//!
//! - [`HookRegistry::after_save`] once a save completed, with the changed attributes
//! - [`HookRegistry::before_destroy`] / [`HookRegistry::after_destroy`] around a destroy
//!
//! Mounted attributes register themselves here (see [`crate::mount`]); the host
//! may register its own hooks alongside them.
//!
//! # Error Handling
//! Hooks run sequentially in registration order. The first failure stops the
//! run and is returned to the host, which decides whether the surrounding
//! save/destroy fails.

use std::fmt;

use async_trait::async_trait;
use tracing::debug;

use crate::document::{ChangeSet, Document};
use crate::error::MountError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPoint {
    AfterSave,
    BeforeDestroy,
    AfterDestroy,
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookPoint::AfterSave => f.write_str("after_save"),
            HookPoint::BeforeDestroy => f.write_str("before_destroy"),
            HookPoint::AfterDestroy => f.write_str("after_destroy"),
        }
    }
}

#[async_trait]
pub trait LifecycleHook: Send + Sync {
    /// Condition checked before running. Destroy runs pass an empty change set.
    fn applies(&self, _changes: &ChangeSet) -> bool {
        true
    }

    async fn run(&self, document: &dyn Document) -> Result<(), MountError>;
}

#[derive(Default)]
pub struct HookRegistry {
    hooks: Vec<(HookPoint, Box<dyn LifecycleHook>)>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, point: HookPoint, hook: Box<dyn LifecycleHook>) {
        debug!(%point, "Registering lifecycle hook");
        self.hooks.push((point, hook));
    }

    /// Number of hooks registered at `point`.
    pub fn len(&self, point: HookPoint) -> usize {
        self.hooks.iter().filter(|(p, _)| *p == point).count()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub async fn after_save(
        &self,
        document: &dyn Document,
        changes: &ChangeSet,
    ) -> Result<(), MountError> {
        self.run(HookPoint::AfterSave, document, changes).await
    }

    pub async fn before_destroy(&self, document: &dyn Document) -> Result<(), MountError> {
        self.run(HookPoint::BeforeDestroy, document, &ChangeSet::new())
            .await
    }

    pub async fn after_destroy(&self, document: &dyn Document) -> Result<(), MountError> {
        self.run(HookPoint::AfterDestroy, document, &ChangeSet::new())
            .await
    }

    async fn run(
        &self,
        point: HookPoint,
        document: &dyn Document,
        changes: &ChangeSet,
    ) -> Result<(), MountError> {
        for (_, hook) in self.hooks.iter().filter(|(p, _)| *p == point) {
            if !hook.applies(changes) {
                continue;
            }
            hook.run(document).await?;
        }
        Ok(())
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("after_save", &self.len(HookPoint::AfterSave))
            .field("before_destroy", &self.len(HookPoint::BeforeDestroy))
            .field("after_destroy", &self.len(HookPoint::AfterDestroy))
            .finish()
    }
}
