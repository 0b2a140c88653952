//! Work queue: worker pool, Task status transitions, retry and submission.
//!
//! Shutdown: [`WorkQueue::shutdown`] signals the pool to stop taking jobs; it does
//! not wait for in-flight runs. Dropping every handle to the queue has the same effect.

use anyhow::{anyhow, Context, Result};
use rendition_api_client::TaskClient;
use rendition_core::{RunOptions, TaskPatch, TaskStatus, WorkerConfig};
use rendition_processing::{Pipeline, PipelineFactory, PipelineResult, RunReport};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};

/// Maximum delay in seconds before a failed run is retried.
pub const MAX_RETRY_BACKOFF_SECS: u64 = 300;

const JOB_CHANNEL_CAPACITY: usize = 256;

/// Exponential backoff in seconds for a given retry count, capped.
#[inline]
pub(crate) fn compute_retry_backoff_seconds(retry_count: u32) -> u64 {
    2_u64
        .checked_pow(retry_count)
        .map_or(MAX_RETRY_BACKOFF_SECS, |secs| secs.min(MAX_RETRY_BACKOFF_SECS))
}

/// Receives `(task_id, final status)` once per submitted job. Retries are not
/// reported, only the outcome of the last attempt.
pub type JobFinishedSender = mpsc::Sender<(String, TaskStatus)>;

/// One pending run.
#[derive(Debug, Clone)]
pub struct Job {
    pub options: RunOptions,
    pub retry_count: u32,
}

impl Job {
    pub fn new(options: RunOptions) -> Self {
        Self {
            options,
            retry_count: 0,
        }
    }

    fn retried(self) -> Self {
        Self {
            retry_count: self.retry_count + 1,
            ..self
        }
    }
}

#[derive(Clone)]
pub struct WorkQueue {
    job_tx: mpsc::Sender<Job>,
    shutdown_tx: mpsc::Sender<()>,
    config: WorkerConfig,
}

impl WorkQueue {
    /// Start the worker pool on the current runtime.
    pub fn new(
        factory: PipelineFactory,
        config: WorkerConfig,
        job_finished_tx: Option<JobFinishedSender>,
    ) -> Self {
        let (job_tx, job_rx) = mpsc::channel(JOB_CHANNEL_CAPACITY);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let retry_tx = job_tx.downgrade();
        tokio::spawn(async move {
            Self::worker_pool(factory, config, job_rx, retry_tx, shutdown_rx, job_finished_tx)
                .await;
        });

        Self {
            job_tx,
            shutdown_tx,
            config,
        }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Queue a run. Waits when the queue is full.
    #[tracing::instrument(skip_all, fields(task_id = %options.task_id, key = %options.key))]
    pub async fn submit(&self, options: RunOptions) -> Result<()> {
        self.job_tx
            .send(Job::new(options))
            .await
            .map_err(|_| anyhow!("Work queue is shut down"))?;
        tracing::debug!("Job submitted to queue");
        Ok(())
    }

    async fn worker_pool(
        factory: PipelineFactory,
        config: WorkerConfig,
        mut job_rx: mpsc::Receiver<Job>,
        retry_tx: mpsc::WeakSender<Job>,
        mut shutdown_rx: mpsc::Receiver<()>,
        job_finished_tx: Option<JobFinishedSender>,
    ) {
        tracing::info!(
            max_workers = config.max_workers,
            max_retries = config.max_retries,
            "Worker pool started"
        );

        let semaphore = Arc::new(Semaphore::new(config.max_workers));

        loop {
            // Shutdown must stay observable while every permit is taken.
            let permit = tokio::select! {
                _ = shutdown_rx.recv() => {
                    tracing::info!("Worker pool shutting down");
                    break;
                }
                permit = semaphore.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let job = tokio::select! {
                _ = shutdown_rx.recv() => {
                    tracing::info!("Worker pool shutting down");
                    break;
                }
                job = job_rx.recv() => match job {
                    Some(job) => job,
                    None => break,
                },
            };

            let factory = factory.clone();
            let retry_tx = retry_tx.clone();
            let finished_tx = job_finished_tx.clone();
            tokio::spawn(async move {
                let _permit = permit;
                if let Err(e) = Self::process_job_with_retry(
                    job,
                    factory,
                    config.max_retries,
                    retry_tx,
                    finished_tx,
                )
                .await
                {
                    tracing::error!(error = %e, "Job failed");
                }
            });
        }

        tracing::info!("Worker pool stopped");
    }

    #[tracing::instrument(
        skip_all,
        fields(task_id = %job.options.task_id, key = %job.options.key, retry = job.retry_count)
    )]
    async fn process_job_with_retry(
        job: Job,
        factory: PipelineFactory,
        max_retries: u32,
        retry_tx: mpsc::WeakSender<Job>,
        job_finished_tx: Option<JobFinishedSender>,
    ) -> Result<()> {
        let tasks = factory.context().task_client.clone();
        let task_id = job.options.task_id.clone();

        // Unsupported input is final: no status transition, no retry.
        let pipeline = match factory.for_options(&job.options) {
            Ok(pipeline) => pipeline,
            Err(e) => {
                tracing::warn!(error = %e, "Rejecting job");
                let patch = TaskPatch::failed(e.to_string());
                finish(tasks.as_ref(), &task_id, patch, &job_finished_tx).await?;
                return Err(e.into());
            }
        };

        match Self::execute(pipeline.as_ref(), tasks.as_ref(), &job.options).await {
            Ok(report) => {
                let patch = TaskPatch::status(TaskStatus::Success);
                finish(tasks.as_ref(), &task_id, patch, &job_finished_tx).await?;
                tracing::info!(
                    variant = %report.variant,
                    warnings = report.warnings.len(),
                    "Job completed successfully"
                );
                Ok(())
            }
            Err(e) => {
                let retryable = e.is_retryable();
                tracing::error!(
                    error = %e,
                    retry_count = job.retry_count,
                    max_retries = max_retries,
                    retryable = retryable,
                    "Run failed"
                );

                if retryable && job.retry_count < max_retries {
                    let backoff_seconds = compute_retry_backoff_seconds(job.retry_count);
                    tracing::info!(
                        retry_count = job.retry_count + 1,
                        backoff_seconds = backoff_seconds,
                        "Scheduling job retry"
                    );
                    if let Err(patch_err) = tasks
                        .patch(&task_id, TaskPatch::status(TaskStatus::Waiting))
                        .await
                    {
                        tracing::warn!(error = %patch_err, "Failed to mark task as waiting");
                    }
                    Self::schedule_retry(
                        job.retried(),
                        Duration::from_secs(backoff_seconds),
                        retry_tx,
                        tasks,
                        job_finished_tx,
                    );
                    return Ok(());
                }

                let patch = TaskPatch::failed(e.to_string());
                finish(tasks.as_ref(), &task_id, patch, &job_finished_tx).await?;
                Err(e.into())
            }
        }
    }

    async fn execute(
        pipeline: &dyn Pipeline,
        tasks: &dyn TaskClient,
        opts: &RunOptions,
    ) -> PipelineResult<RunReport> {
        tasks
            .patch(&opts.task_id, TaskPatch::status(TaskStatus::Running))
            .await?;
        pipeline.run(opts).await
    }

    /// Re-queue `job` after `delay` without holding a worker permit.
    fn schedule_retry(
        job: Job,
        delay: Duration,
        retry_tx: mpsc::WeakSender<Job>,
        tasks: Arc<dyn TaskClient>,
        job_finished_tx: Option<JobFinishedSender>,
    ) {
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let task_id = job.options.task_id.clone();
            let sent = match retry_tx.upgrade() {
                Some(tx) => tx.send(job).await.is_ok(),
                None => false,
            };
            if sent {
                return;
            }

            tracing::error!(task_id = %task_id, "Work queue closed, dropping retry");
            let patch = TaskPatch::failed("Work queue closed before retry");
            if let Err(e) = tasks.patch(&task_id, patch).await {
                tracing::error!(task_id = %task_id, error = %e, "Failed to mark task as failed");
            }
            notify(&job_finished_tx, &task_id, TaskStatus::Error).await;
        });
    }

    /// Signals the worker pool to stop taking jobs and exit its loop.
    ///
    /// Returns immediately; runs already spawned continue until they finish.
    pub async fn shutdown(&self) {
        tracing::info!("Initiating work queue shutdown");
        let _ = self.shutdown_tx.send(()).await;
    }
}

/// Apply the final patch, then report the outcome whether or not the patch landed.
async fn finish(
    tasks: &dyn TaskClient,
    task_id: &str,
    patch: TaskPatch,
    job_finished_tx: &Option<JobFinishedSender>,
) -> Result<()> {
    let status = patch.status.unwrap_or(TaskStatus::Error);
    let patched = tasks.patch(task_id, patch).await;
    notify(job_finished_tx, task_id, status).await;
    patched.with_context(|| format!("Failed to mark task as {}", status))
}

async fn notify(tx: &Option<JobFinishedSender>, task_id: &str, status: TaskStatus) {
    if let Some(tx) = tx {
        let _ = tx.send((task_id.to_string(), status)).await;
    }
}
