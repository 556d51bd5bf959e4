//! Error types shared by the coordinator and its collaborators.
//!
//! Collaborator seams (file API, job queue) return a boxed error, the same
//! shape every trait in [`crate::contract`] uses. The coordinator wraps that
//! error in a [`MountError`] variant naming what was attempted, keeping the
//! collaborator's error untouched as the `source`.
//!
//! A missing file (empty field, unparseable UUID) is never an error: every
//! operation treats it as a no-op.

use std::fmt;

use thiserror::Error;

use crate::contract::JobKind;

/// Boxed error returned by collaborator implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Remote action attempted inline against the file API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteAction {
    Store,
    Delete,
}

impl fmt::Display for RemoteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteAction::Store => f.write_str("store"),
            RemoteAction::Delete => f.write_str("delete"),
        }
    }
}

#[derive(Debug, Error)]
pub enum MountError {
    /// The synchronous store/delete call against the file API failed.
    #[error("remote {action} failed for file {file_uuid}: {source}")]
    RemoteCall {
        action: RemoteAction,
        file_uuid: String,
        #[source]
        source: BoxError,
    },

    /// Submitting a background job failed.
    #[error("failed to enqueue {kind} job for file {file_uuid}: {source}")]
    Enqueue {
        kind: JobKind,
        file_uuid: String,
        #[source]
        source: BoxError,
    },
}

impl MountError {
    /// UUID of the file the failed operation targeted.
    pub fn file_uuid(&self) -> &str {
        match self {
            MountError::RemoteCall { file_uuid, .. } | MountError::Enqueue { file_uuid, .. } => {
                file_uuid
            }
        }
    }
}
