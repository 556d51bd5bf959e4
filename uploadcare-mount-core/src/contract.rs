#![allow(unused)]

//! # contract: interfaces to everything outside the coordinator
//!
//! The coordinator never talks to the network, a job runner or a cache
//! directly. It calls the four traits below, which the host application wires
//! up with real clients (see the `uploadcare-mount` crate) or with mocks.
//!
//! ## Mocking & Testing
//! - Every trait is annotated for `mockall`. With the default
//!   `test-export-mocks` feature enabled, downstream crates get `MockFileApi`,
//!   `MockJobQueue`, `MockFileCache` and `MockIdExtractor` as well.
//!
//! ## Error Handling
//! - Fallible collaborator calls return [`BoxError`]; the coordinator wraps it
//!   into a [`crate::error::MountError`] without altering it.

use std::fmt;

use async_trait::async_trait;

use mockall::{automock, predicate::*};

use crate::error::BoxError;
use crate::remote_file::FileAttributes;

/// Prefix applied to CDN URLs when deriving side-cache keys.
pub const CACHE_KEY_PREFIX: &str = "uploadcare-file:";

/// Kind of background job to enqueue.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JobKind {
    /// Marks the file as permanently stored.
    StoreFile,
    /// Removes the file from the hosting service.
    DeleteFile,
    /// Application-defined job, passed as an override to explicit store/delete calls.
    Named(String),
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobKind::StoreFile => f.write_str("store_file"),
            JobKind::DeleteFile => f.write_str("delete_file"),
            JobKind::Named(name) => f.write_str(name),
        }
    }
}

/// A unit of deferred work: which job to run and on which file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileJob {
    pub kind: JobKind,
    pub file_uuid: String,
}

impl FileJob {
    pub fn new(kind: JobKind, file_uuid: impl Into<String>) -> Self {
        FileJob {
            kind,
            file_uuid: file_uuid.into(),
        }
    }
}

/// Pulls a file UUID out of a CDN URL. Pure, no I/O.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait IdExtractor: Send + Sync {
    /// Returns `None` when the URL carries no recognisable UUID.
    fn extract(&self, url: &str) -> Option<String>;
}

/// Read-only view of a side cache holding descriptive file attributes.
///
/// Populating and evicting entries happens elsewhere in the host application.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait FileCache: Send + Sync {
    /// Look up cached attributes. Backend failures are reported as a miss.
    async fn read(&self, key: &str) -> Option<FileAttributes>;

    /// Deterministic cache key for a CDN URL.
    fn build_key(&self, cdn_url: &str) -> String {
        format!("{CACHE_KEY_PREFIX}{cdn_url}")
    }
}

/// Remote file hosting API.
///
/// Storing an already stored file, or deleting an already deleted one, is
/// expected to be harmless on the service side.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait FileApi: Send + Sync {
    /// Mark an uploaded file as permanently stored.
    async fn store_file(&self, file_uuid: &str) -> Result<(), BoxError>;

    /// Remove a file from the hosting service.
    async fn delete_file(&self, file_uuid: &str) -> Result<(), BoxError>;
}

/// Background job runner.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Submit a job. Returns once the job is accepted; never waits for it to run.
    async fn enqueue(&self, job: FileJob) -> Result<(), BoxError>;
}
