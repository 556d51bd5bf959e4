use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use uuid::Uuid;

use uploadcare_mount_core::contract::{FileApi, FileJob, JobKind, JobQueue};
use uploadcare_mount_core::BoxError;

use crate::load_config::JobsSection;

#[derive(Debug)]
struct QueuedJob {
    id: Uuid,
    job: FileJob,
}

/// In-process background runner for store/delete jobs.
///
/// Jobs go through a bounded channel to a worker pool that runs at most
/// `max_concurrent` of them at once. A full channel rejects the job instead of
/// waiting. Failed jobs are logged and dropped.
pub struct TokioJobQueue {
    tx: Mutex<Option<mpsc::Sender<QueuedJob>>>,
    worker: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

impl TokioJobQueue {
    /// Spawn the worker pool. Must be called from within a tokio runtime.
    pub fn start(api: Arc<dyn FileApi>, config: &JobsSection) -> Self {
        let queue_size = config.queue_size.max(1);
        let max_concurrent = config.max_concurrent.max(1);
        let (tx, rx) = mpsc::channel(queue_size);

        let worker = tokio::spawn(async move {
            Self::worker_pool(rx, api, max_concurrent).await;
        });

        tracing::info!(
            queue_size = queue_size,
            max_concurrent = max_concurrent,
            "File job queue initialized with bounded channel"
        );

        TokioJobQueue {
            tx: Mutex::new(Some(tx)),
            worker: tokio::sync::Mutex::new(Some(worker)),
        }
    }

    /// Stop accepting jobs and wait until queued and running jobs finish.
    pub async fn shutdown(&self) {
        let tx = self
            .tx
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        drop(tx);

        if let Some(worker) = self.worker.lock().await.take() {
            if let Err(e) = worker.await {
                tracing::error!(error = %e, "File job worker pool terminated abnormally");
            }
        }
        tracing::info!("File job queue shut down");
    }

    async fn worker_pool(
        mut rx: mpsc::Receiver<QueuedJob>,
        api: Arc<dyn FileApi>,
        max_concurrent: u32,
    ) {
        let semaphore = Arc::new(Semaphore::new(max_concurrent as usize));

        while let Some(queued) = rx.recv().await {
            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                break;
            };
            let api = api.clone();

            tokio::spawn(async move {
                let _permit = permit;
                Self::process_job(api.as_ref(), queued).await;
            });
        }

        // Every running job holds a permit; getting them all back means they are done.
        let _ = semaphore.acquire_many(max_concurrent).await;
    }

    #[tracing::instrument(skip(api, queued), fields(job.id = %queued.id, job.kind = %queued.job.kind, file_uuid = %queued.job.file_uuid))]
    async fn process_job(api: &dyn FileApi, queued: QueuedJob) {
        let start = std::time::Instant::now();
        let result = match &queued.job.kind {
            JobKind::StoreFile => api.store_file(&queued.job.file_uuid).await,
            JobKind::DeleteFile => api.delete_file(&queued.job.file_uuid).await,
            JobKind::Named(name) => {
                tracing::warn!(job = %name, "No handler registered for job kind, skipping");
                return;
            }
        };
        match result {
            Ok(()) => tracing::info!(
                elapsed_ms = start.elapsed().as_millis() as u64,
                "File job completed"
            ),
            Err(e) => tracing::error!(error = %e, "File job failed"),
        }
    }
}

#[async_trait]
impl JobQueue for TokioJobQueue {
    async fn enqueue(&self, job: FileJob) -> Result<(), BoxError> {
        let tx = self
            .tx
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
            .ok_or("file job queue is shut down")?;

        let queued = QueuedJob {
            id: Uuid::new_v4(),
            job,
        };
        tracing::info!(
            job_id = %queued.id,
            job_kind = %queued.job.kind,
            file_uuid = %queued.job.file_uuid,
            "Enqueuing file job"
        );
        tx.try_send(queued).map_err(|e| match &e {
            mpsc::error::TrySendError::Full(_) => {
                tracing::warn!("File job queue is full, rejecting job");
                BoxError::from("file job queue is full, please try again later")
            }
            mpsc::error::TrySendError::Closed(_) => {
                BoxError::from(format!("failed to submit file job: {e}"))
            }
        })
    }
}
