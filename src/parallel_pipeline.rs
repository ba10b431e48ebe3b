// THEORY:
// The `parallel_pipeline` module simulates the consumer side of the system: one pool of
// workers per stream (faces, crests), all sharing one read-only `ClassificationEngine`.
//
// Key architectural principles:
// 1.  **Dispatcher + Workers**: Each pool has a single dispatcher task that hands
//     incoming tasks to its workers round-robin over private channels. A task carries
//     a oneshot sender, so every submitter awaits exactly its own result.
// 2.  **Async Waiting, Blocking Work**: The simulated latency is awaited with
//     `tokio::time::sleep`; the CPU-bound decode and scan run on the blocking pool so
//     they never stall the runtime's reactor threads.
// 3.  **No Lost Messages**: A classification that panics is reported as an `ERROR`
//     result for that payload, and the worker carries on with the next task.
// 4.  **Independent Streams**: Faces and crests never share a queue, so a burst of
//     slow crests cannot starve the face stream.

use crate::config::{EngineConfig, WorkerConfig};
use crate::error::{Result, VisionError};
use crate::latency::{self, LatencyHook};
use crate::payload::{Category, ImagePayload};
use crate::pipeline::{ClassificationEngine, ClassificationResult};
use futures::future::join_all;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

pub struct ClassifyTask {
    pub payload: ImagePayload,
    pub result_sender: oneshot::Sender<ClassificationResult>,
}

/// What every worker of a pool shares.
#[derive(Clone)]
struct WorkerContext {
    category: Category,
    engine: Arc<ClassificationEngine>,
    latency: Arc<dyn LatencyHook>,
    processed: Arc<AtomicU64>,
    log_every: u64,
}

pub struct WorkerPool {
    category: Category,
    task_sender: mpsc::UnboundedSender<ClassifyTask>,
    dispatcher: JoinHandle<()>,
    workers: Vec<JoinHandle<()>>,
    processed: Arc<AtomicU64>,
}

impl WorkerPool {
    /// Spawns the dispatcher and `worker_count` workers; must run inside a Tokio runtime.
    pub fn new(
        category: Category,
        worker_count: usize,
        engine: Arc<ClassificationEngine>,
        latency: Arc<dyn LatencyHook>,
        log_every: u64,
    ) -> Self {
        let worker_count = worker_count.max(1);
        let (task_sender, mut task_receiver) = mpsc::unbounded_channel::<ClassifyTask>();
        let processed = Arc::new(AtomicU64::new(0));

        let (worker_senders, worker_receivers): (Vec<_>, Vec<_>) = (0..worker_count)
            .map(|_| mpsc::unbounded_channel::<ClassifyTask>())
            .unzip();

        // Spawn dispatcher
        let dispatcher = tokio::spawn(async move {
            let mut worker_idx = 0;
            while let Some(task) = task_receiver.recv().await {
                if worker_senders[worker_idx].send(task).is_err() {
                    tracing::error!(%category, worker = worker_idx, "worker channel closed, task dropped");
                }
                worker_idx = (worker_idx + 1) % worker_count;
            }
        });

        let context = WorkerContext {
            category,
            engine,
            latency,
            processed: Arc::clone(&processed),
            log_every: log_every.max(1),
        };

        // Spawn workers
        let workers = worker_receivers
            .into_iter()
            .enumerate()
            .map(|(worker_idx, mut worker_receiver)| {
                let context = context.clone();
                tokio::spawn(async move {
                    while let Some(task) = worker_receiver.recv().await {
                        let result = Self::process_payload_worker(&context, worker_idx, task.payload).await;
                        let _ = task.result_sender.send(result);
                    }
                })
            })
            .collect();

        tracing::debug!(%category, workers = worker_count, "worker pool started");

        Self {
            category,
            task_sender,
            dispatcher,
            workers,
            processed,
        }
    }

    async fn process_payload_worker(
        context: &WorkerContext,
        worker_idx: usize,
        payload: ImagePayload,
    ) -> ClassificationResult {
        let delay = context.latency.delay(context.category);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let id = payload.id.clone();
        let filename = payload.filename.clone();
        let engine = Arc::clone(&context.engine);

        let result = match tokio::task::spawn_blocking(move || engine.process(&payload)).await {
            Ok(result) => result,
            Err(join_error) => {
                tracing::error!(category = %context.category, %id, error = %join_error, "classification task failed");
                ClassificationResult::error(
                    id,
                    &VisionError::WorkerPool(format!("classification task failed: {join_error}")),
                )
            }
        };

        let count = context.processed.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(
            category = %context.category,
            worker = worker_idx,
            id = %result.correlation_id,
            %filename,
            label = %result.label,
            confidence = result.confidence,
            delay_ms = delay.as_millis() as u64,
            "classified"
        );
        if count % context.log_every == 0 {
            tracing::info!(category = %context.category, processed = count, "progress");
        }

        result
    }

    /// Queues one payload and waits for its result.
    pub async fn process(&self, payload: ImagePayload) -> Result<ClassificationResult> {
        let (result_sender, result_receiver) = oneshot::channel();

        self.task_sender
            .send(ClassifyTask {
                payload,
                result_sender,
            })
            .map_err(|_| VisionError::WorkerPool(format!("{} pool is not accepting tasks", self.category)))?;

        result_receiver
            .await
            .map_err(|_| VisionError::WorkerPool(format!("{} pool dropped a task", self.category)))
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Payloads this pool has finished, errors included.
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    /// Stops accepting work and waits for queued tasks to drain.
    pub async fn shutdown(self) {
        drop(self.task_sender);
        let _ = self.dispatcher.await;
        for worker in self.workers {
            let _ = worker.await;
        }
        tracing::debug!(category = %self.category, "worker pool stopped");
    }
}

/// A face pool and a team pool behind a single submit call.
pub struct ParallelPipeline {
    face_pool: WorkerPool,
    team_pool: WorkerPool,
}

impl ParallelPipeline {
    /// Builds the engine, latency hook and pools described by `config`.
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let engine = Arc::new(ClassificationEngine::from_config(config)?);
        let latency = latency::from_config(&config.latency);
        Ok(Self::with_engine(engine, latency, &config.workers))
    }

    pub fn with_engine(
        engine: Arc<ClassificationEngine>,
        latency: Arc<dyn LatencyHook>,
        workers: &WorkerConfig,
    ) -> Self {
        let worker_count = workers.worker_count();
        let pool = |category| {
            WorkerPool::new(
                category,
                worker_count,
                Arc::clone(&engine),
                Arc::clone(&latency),
                workers.log_every,
            )
        };

        Self {
            face_pool: pool(Category::Face),
            team_pool: pool(Category::Team),
        }
    }

    pub fn pool(&self, category: Category) -> &WorkerPool {
        match category {
            Category::Face => &self.face_pool,
            Category::Team => &self.team_pool,
        }
    }

    /// Routes the payload to its stream's pool and waits for the result.
    pub async fn submit(&self, payload: ImagePayload) -> Result<ClassificationResult> {
        self.pool(payload.category).process(payload).await
    }

    /// Submits every payload at once; results come back in input order.
    pub async fn submit_batch(&self, payloads: Vec<ImagePayload>) -> Vec<Result<ClassificationResult>> {
        join_all(payloads.into_iter().map(|payload| self.submit(payload))).await
    }

    pub fn processed(&self, category: Category) -> u64 {
        self.pool(category).processed()
    }

    pub async fn shutdown(self) {
        self.face_pool.shutdown().await;
        self.team_pool.shutdown().await;
    }
}
