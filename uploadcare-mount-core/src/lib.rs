#![doc = "uploadcare-mount-core: lifecycle coordinator for Uploadcare file attributes."]

//! A document field holding an Uploadcare CDN URL can be *mounted*: reads
//! return a [`RemoteFileRef`], saves that change the field store the remote
//! file, and destroys delete it. Store and delete run either inline against
//! the file API or as background jobs, depending on [`MountConfig`].
//!
//! The crate holds no network client, job runner or cache of its own; those
//! are reached through the traits in [`contract`]. The `uploadcare-mount`
//! crate provides real implementations and a CLI.
//!
//! # Navigation
//! - Entry point: [`mount::mount_uploadcare_file`]
//! - Host seam: [`document::Document`], [`hooks::HookRegistry`]

pub mod cache;
pub mod config;
pub mod contract;
pub mod document;
pub mod error;
pub mod hooks;
pub mod id_extractor;
pub mod mount;
pub mod processing;
pub mod remote_file;

pub use config::MountConfig;
pub use error::{BoxError, MountError};
pub use mount::{mount_uploadcare_file, Collaborators, MountedFile};
pub use remote_file::RemoteFileRef;
