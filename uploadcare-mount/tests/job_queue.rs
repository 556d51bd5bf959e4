use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Notify, Semaphore};

use uploadcare_mount::job_queue::TokioJobQueue;
use uploadcare_mount::load_config::JobsSection;
use uploadcare_mount_core::contract::{FileApi, FileJob, JobKind, JobQueue, MockFileApi};
use uploadcare_mount_core::BoxError;

const ID: &str = "550e8400-e29b-41d4-a716-446655440000";

fn jobs_config(max_concurrent: u32, queue_size: usize) -> JobsSection {
    JobsSection {
        max_concurrent,
        queue_size,
    }
}

#[tokio::test]
async fn runs_store_and_delete_jobs_before_shutdown_returns() {
    let mut api = MockFileApi::new();
    api.expect_store_file()
        .withf(|file_uuid| file_uuid == ID)
        .times(1)
        .returning(|_| Ok(()));
    api.expect_delete_file()
        .withf(|file_uuid| file_uuid == ID)
        .times(1)
        .returning(|_| Ok(()));

    // Held here so the mock's call counts are verified on this thread when it drops.
    let api = Arc::new(api);
    let queue = TokioJobQueue::start(api.clone(), &jobs_config(2, 10));
    queue
        .enqueue(FileJob::new(JobKind::StoreFile, ID))
        .await
        .unwrap();
    queue
        .enqueue(FileJob::new(JobKind::DeleteFile, ID))
        .await
        .unwrap();
    queue.shutdown().await;
}

#[tokio::test]
async fn failed_and_unknown_jobs_do_not_stop_the_worker() {
    let mut api = MockFileApi::new();
    api.expect_store_file()
        .times(2)
        .returning(|_| Err("503 service unavailable".into()));
    api.expect_delete_file().never();

    let api = Arc::new(api);
    let queue = TokioJobQueue::start(api.clone(), &jobs_config(1, 10));
    queue
        .enqueue(FileJob::new(JobKind::StoreFile, ID))
        .await
        .unwrap();
    queue
        .enqueue(FileJob::new(JobKind::Named("ThumbnailJob".into()), ID))
        .await
        .unwrap();
    queue
        .enqueue(FileJob::new(JobKind::StoreFile, ID))
        .await
        .unwrap();
    queue.shutdown().await;
}

#[tokio::test]
async fn enqueue_after_shutdown_is_rejected() {
    let queue = TokioJobQueue::start(Arc::new(MockFileApi::new()), &jobs_config(1, 1));
    queue.shutdown().await;

    let err = queue
        .enqueue(FileJob::new(JobKind::StoreFile, ID))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("shut down"));
}

/// Finishes each store after a short delay.
#[derive(Default)]
struct SlowApi {
    done: AtomicUsize,
}

#[async_trait]
impl FileApi for SlowApi {
    async fn store_file(&self, _file_uuid: &str) -> Result<(), BoxError> {
        tokio::time::sleep(Duration::from_millis(100)).await;
        self.done.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete_file(&self, _file_uuid: &str) -> Result<(), BoxError> {
        Ok(())
    }
}

#[tokio::test]
async fn shutdown_waits_for_in_flight_jobs_at_maximum_concurrency() {
    let api = Arc::new(SlowApi::default());
    let queue = TokioJobQueue::start(api.clone(), &jobs_config(u32::MAX, 10));

    queue
        .enqueue(FileJob::new(JobKind::StoreFile, ID))
        .await
        .unwrap();
    queue.shutdown().await;

    assert_eq!(api.done.load(Ordering::SeqCst), 1);
}

/// Holds every store call until the gate opens.
struct GatedApi {
    started: Notify,
    gate: Semaphore,
    stores: AtomicUsize,
}

#[async_trait]
impl FileApi for GatedApi {
    async fn store_file(&self, _file_uuid: &str) -> Result<(), BoxError> {
        self.stores.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();
        let _open = self.gate.acquire().await?;
        Ok(())
    }

    async fn delete_file(&self, _file_uuid: &str) -> Result<(), BoxError> {
        Ok(())
    }
}

#[tokio::test]
async fn full_queue_rejects_jobs() {
    let api = Arc::new(GatedApi {
        started: Notify::new(),
        gate: Semaphore::new(0),
        stores: AtomicUsize::new(0),
    });
    let queue = TokioJobQueue::start(api.clone(), &jobs_config(1, 1));

    queue
        .enqueue(FileJob::new(JobKind::StoreFile, ID))
        .await
        .unwrap();
    api.started.notified().await;

    // One job running, at most one waiting on the worker, one in the channel.
    let mut results = Vec::new();
    for _ in 0..3 {
        results.push(queue.enqueue(FileJob::new(JobKind::StoreFile, ID)).await);
    }
    let rejected = results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .collect::<Vec<_>>();
    assert!(!rejected.is_empty(), "a bounded queue must reject eventually");
    assert!(rejected[0].to_string().contains("full"));

    api.gate.add_permits(1);
    queue.shutdown().await;
    let accepted = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(api.stores.load(Ordering::SeqCst), 1 + accepted);
}
