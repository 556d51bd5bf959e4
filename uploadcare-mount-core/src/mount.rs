//! Mounted Uploadcare file attributes.
//!
//! [`mount_uploadcare_file`] turns a document field holding a CDN URL into a
//! [`MountedFile`], which exposes:
//!   - [`MountedFile::read`]: the field as a [`RemoteFileRef`], enriched from the side cache
//!   - [`MountedFile::store`]: persist the remote file, inline or through a background job
//!   - [`MountedFile::delete`]: remove the remote file, inline or through a background job
//!
//! and wires store/delete into the document type's [`HookRegistry`]:
//!   - after save, only when the field changed, unless `do_not_store` is set
//!   - after destroy, when `delete_files_after_destroy` is set
//!
//! An empty field or a URL without a UUID makes every operation a no-op.
//!
//! # Re-entrancy
//! A store holds the document's processing flag for the attribute while it
//! runs, so a store triggered again from inside the same save (nested hooks)
//! returns without dispatching. The flag is released as soon as the inline
//! call returns or fails, and right after a successful enqueue.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::config::MountConfig;
use crate::contract::{FileApi, FileCache, FileJob, IdExtractor, JobKind, JobQueue};
use crate::document::{ChangeSet, Document};
use crate::error::{MountError, RemoteAction};
use crate::hooks::{HookPoint, HookRegistry, LifecycleHook};
use crate::remote_file::RemoteFileRef;

/// External services a mounted attribute calls into.
#[derive(Clone)]
pub struct Collaborators {
    pub extractor: Arc<dyn IdExtractor>,
    pub cache: Arc<dyn FileCache>,
    pub api: Arc<dyn FileApi>,
    pub jobs: Arc<dyn JobQueue>,
}

pub struct MountedFile {
    attribute: String,
    config: MountConfig,
    collaborators: Collaborators,
}

/// Mount `attribute` and register its lifecycle hooks on `registry`.
pub fn mount_uploadcare_file(
    registry: &mut HookRegistry,
    attribute: &str,
    config: &MountConfig,
    collaborators: Collaborators,
) -> Arc<MountedFile> {
    let mounted = Arc::new(MountedFile::new(attribute, config.clone(), collaborators));

    if !config.do_not_store {
        registry.register(HookPoint::AfterSave, Box::new(StoreOnSave(mounted.clone())));
    }
    if config.delete_files_after_destroy {
        registry.register(
            HookPoint::AfterDestroy,
            Box::new(DeleteOnDestroy(mounted.clone())),
        );
    }

    info!(
        attribute,
        store_on_save = !config.do_not_store,
        delete_on_destroy = config.delete_files_after_destroy,
        "Mounted uploadcare file attribute"
    );
    mounted
}

impl MountedFile {
    /// A mount without hook wiring; use [`mount_uploadcare_file`] to also register hooks.
    pub fn new(attribute: &str, config: MountConfig, collaborators: Collaborators) -> Self {
        MountedFile {
            attribute: attribute.to_string(),
            config,
            collaborators,
        }
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn config(&self) -> &MountConfig {
        &self.config
    }

    /// The file referenced by the attribute, or `None` when the field is empty.
    ///
    /// Never writes to the side cache.
    pub async fn read(&self, document: &dyn Document) -> Option<RemoteFileRef> {
        let cdn_url = document.read_attribute(&self.attribute).unwrap_or_default();
        if cdn_url.is_empty() {
            return None;
        }

        let uuid = self.collaborators.extractor.extract(&cdn_url);
        let cache_key = self.collaborators.cache.build_key(&cdn_url);
        match self.collaborators.cache.read(&cache_key).await {
            Some(cached) if !cached.is_empty() => {
                debug!(attribute = %self.attribute, cache_key = %cache_key, "File attributes found in cache");
                Some(RemoteFileRef::from_cache(&cdn_url, uuid, cached))
            }
            _ => Some(RemoteFileRef::new(cdn_url, uuid)),
        }
    }

    /// Store the remote file. `job` overrides the job kind on the deferred path.
    pub async fn store(
        &self,
        document: &dyn Document,
        job: Option<JobKind>,
    ) -> Result<(), MountError> {
        if document.processing_flags().is_processing(&self.attribute) {
            debug!(attribute = %self.attribute, "Store already in progress, skipping");
            return Ok(());
        }
        let Some(file_uuid) = self.file_uuid(document).await else {
            debug!(attribute = %self.attribute, "No file to store");
            return Ok(());
        };
        // Re-checked atomically: another store may have begun while we were reading.
        let Some(_guard) = document.processing_flags().try_begin(&self.attribute) else {
            debug!(attribute = %self.attribute, "Store already in progress, skipping");
            return Ok(());
        };

        if self.config.store_files_async {
            let kind = job.unwrap_or(JobKind::StoreFile);
            self.enqueue(kind, file_uuid).await
        } else {
            self.call_api(RemoteAction::Store, file_uuid).await
        }
    }

    /// Delete the remote file. `job` overrides the job kind on the deferred path.
    pub async fn delete(
        &self,
        document: &dyn Document,
        job: Option<JobKind>,
    ) -> Result<(), MountError> {
        let Some(file_uuid) = self.file_uuid(document).await else {
            debug!(attribute = %self.attribute, "No file to delete");
            return Ok(());
        };

        if self.config.delete_files_async {
            let kind = job.unwrap_or(JobKind::DeleteFile);
            self.enqueue(kind, file_uuid).await
        } else {
            self.call_api(RemoteAction::Delete, file_uuid).await
        }
    }

    async fn file_uuid(&self, document: &dyn Document) -> Option<String> {
        self.read(document)
            .await
            .and_then(|file| file.uuid().map(str::to_string))
    }

    async fn enqueue(&self, kind: JobKind, file_uuid: String) -> Result<(), MountError> {
        info!(
            attribute = %self.attribute,
            file_uuid = %file_uuid,
            job = %kind,
            mode = "deferred",
            "Enqueuing file job"
        );
        let job = FileJob::new(kind.clone(), file_uuid.clone());
        self.collaborators.jobs.enqueue(job).await.map_err(|source| {
            error!(attribute = %self.attribute, file_uuid = %file_uuid, job = %kind, error = %source, "Failed to enqueue file job");
            MountError::Enqueue {
                kind,
                file_uuid,
                source,
            }
        })
    }

    async fn call_api(&self, action: RemoteAction, file_uuid: String) -> Result<(), MountError> {
        info!(
            attribute = %self.attribute,
            file_uuid = %file_uuid,
            %action,
            mode = "inline",
            "Calling file API"
        );
        let api = &self.collaborators.api;
        let result = match action {
            RemoteAction::Store => api.store_file(&file_uuid).await,
            RemoteAction::Delete => api.delete_file(&file_uuid).await,
        };
        result.map_err(|source| {
            error!(attribute = %self.attribute, file_uuid = %file_uuid, %action, error = %source, "File API call failed");
            MountError::RemoteCall {
                action,
                file_uuid,
                source,
            }
        })
    }
}

impl std::fmt::Debug for MountedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MountedFile")
            .field("attribute", &self.attribute)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Save wiring: store only when the mounted attribute changed.
struct StoreOnSave(Arc<MountedFile>);

#[async_trait]
impl LifecycleHook for StoreOnSave {
    fn applies(&self, changes: &ChangeSet) -> bool {
        changes.contains(&self.0.attribute)
    }

    async fn run(&self, document: &dyn Document) -> Result<(), MountError> {
        self.0.store(document, None).await
    }
}

struct DeleteOnDestroy(Arc<MountedFile>);

#[async_trait]
impl LifecycleHook for DeleteOnDestroy {
    async fn run(&self, document: &dyn Document) -> Result<(), MountError> {
        self.0.delete(document, None).await
    }
}
