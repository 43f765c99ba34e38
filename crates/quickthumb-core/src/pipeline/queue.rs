//! Bounded worker pool driving the transformer over a stream of tasks.
//!
//! Each run gets a fresh [`RunContext`] shared by its workers: the finished
//! list, the abort flag, the first error, and the set of destinations
//! already claimed in this run. Nothing outlives the run.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinSet;

use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};
use crate::logger::Logger;
use crate::types::{FinishedEntry, FinishedList, Outcome, RunState, Task, TaskState};

use super::channel::{bounded_channel, spawn_feeder, AbortFlag, SharedReceiver};
use super::naming::PathPolicy;
use super::thumbnail::Transform;

/// Callback invoked once per finished entry, in completion order.
pub type ItemCallback = Arc<dyn Fn(&FinishedEntry) + Send + Sync>;

/// What to do with a task whose destination has been resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Produce the destination
    Transform,
    /// Destination exists and skipping was requested
    Skip,
    /// Destination exists, but neither skip nor overwrite is set
    SkipUnresolved,
}

/// The destination-exists decision matrix.
///
/// An existing destination with neither flag set is left alone, so a run
/// never stalls or clobbers output it was not told to replace.
pub fn decide(exists: bool, skip: bool, overwrite: bool) -> Action {
    match (exists, skip, overwrite) {
        (false, _, _) => Action::Transform,
        (true, true, _) => Action::Skip,
        (true, false, true) => Action::Transform,
        (true, false, false) => Action::SkipUnresolved,
    }
}

/// Shared state for one run of the pool.
pub struct RunContext {
    policy: PathPolicy,
    skip_existing: bool,
    overwrite: bool,
    quiet: bool,
    logger: Logger,
    on_item: Option<ItemCallback>,
    abort: AbortFlag,
    finished: Mutex<FinishedList>,
    claimed: Mutex<HashSet<PathBuf>>,
    first_error: Mutex<Option<PipelineError>>,
}

impl RunContext {
    fn new(queue: &WorkQueue) -> Self {
        Self {
            policy: queue.policy.clone(),
            skip_existing: queue.config.processing.skip_existing,
            overwrite: queue.config.processing.overwrite,
            quiet: queue.config.logging.quiet,
            logger: queue.logger.clone(),
            on_item: queue.on_item.clone(),
            abort: AbortFlag::new(),
            finished: Mutex::new(Vec::new()),
            claimed: Mutex::new(HashSet::new()),
            first_error: Mutex::new(None),
        }
    }

    /// Append a finished entry unless the run has been aborted.
    fn record(&self, entry: FinishedEntry) {
        if self.abort.is_aborted() {
            tracing::debug!("Discarding {:?}: run aborted", entry.src_path);
            return;
        }
        if let Some(on_item) = &self.on_item {
            on_item(&entry);
        }
        lock(&self.finished).push(entry);
    }

    /// Abort the run; only the first error is kept.
    fn fail(&self, error: PipelineError) {
        if self.abort.abort() {
            tracing::debug!("Run aborting: {}", error);
            *lock(&self.first_error) = Some(error);
        } else {
            tracing::debug!("Dropping error after abort: {}", error);
        }
    }

    /// Claim a destination for this run. `false` if another task holds it.
    fn claim(&self, dst: &Path) -> bool {
        lock(&self.claimed).insert(dst.to_path_buf())
    }

    fn info(&self, message: &str) {
        if !self.quiet {
            self.logger.log(message);
        }
    }
}

/// Lock a mutex, recovering the data if a panicking worker poisoned it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Bounded worker pool with first-error-wins semantics.
pub struct WorkQueue {
    transformer: Arc<dyn Transform>,
    policy: PathPolicy,
    config: Config,
    logger: Logger,
    on_item: Option<ItemCallback>,
}

impl WorkQueue {
    /// Create a pool writing under `destination`.
    pub fn new(
        transformer: Arc<dyn Transform>,
        destination: &Path,
        config: &Config,
        logger: Logger,
    ) -> Self {
        Self {
            transformer,
            policy: PathPolicy::new(destination, config),
            config: config.clone(),
            logger,
            on_item: None,
        }
    }

    /// Invoke `callback` for every finished entry.
    pub fn with_on_item(mut self, callback: ItemCallback) -> Self {
        self.on_item = Some(callback);
        self
    }

    /// Process every task and resolve with the finished list, or the first error.
    ///
    /// Tasks are pulled lazily from `tasks` through a bounded channel. At
    /// most `concurrency` tasks are in flight. After a failure no new tasks
    /// are admitted; in-flight tasks run to completion but their results
    /// are discarded.
    pub async fn run<I>(&self, tasks: I) -> PipelineResult<FinishedList>
    where
        I: IntoIterator<Item = Task>,
        I::IntoIter: Send + 'static,
    {
        let ctx = Arc::new(RunContext::new(self));
        let workers = self.config.processing.concurrency.max(1);

        let (tx, rx) = bounded_channel(&self.config.processing);
        let feeder = spawn_feeder(tasks.into_iter(), tx, ctx.abort.clone());

        let mut pool = JoinSet::new();
        for id in 0..workers {
            pool.spawn(worker(
                id,
                rx.clone(),
                ctx.clone(),
                self.transformer.clone(),
            ));
        }
        drop(rx);

        while let Some(joined) = pool.join_next().await {
            if let Err(e) = joined {
                ctx.fail(PipelineError::Worker(e.to_string()));
            }
        }

        let admitted = feeder
            .await
            .map_err(|e| PipelineError::Worker(format!("Feeder failed: {}", e)))?;

        if let Some(error) = lock(&ctx.first_error).take() {
            tracing::debug!(state = %RunState::Aborted, admitted, "Run finished");
            return Err(error);
        }

        let finished = std::mem::take(&mut *lock(&ctx.finished));
        tracing::debug!(
            state = %RunState::Completed,
            admitted,
            finished = finished.len(),
            "Run finished"
        );
        ctx.info("All items have been processed.");
        Ok(finished)
    }
}

/// Pull tasks until the queue drains or the run aborts.
async fn worker(
    id: usize,
    rx: SharedReceiver<Task>,
    ctx: Arc<RunContext>,
    transformer: Arc<dyn Transform>,
) {
    while let Some(task) = rx.next().await {
        if ctx.abort.is_aborted() {
            break;
        }
        let name = task.file_name();
        tracing::trace!(worker = id, task = %name, state = %TaskState::Pending);

        match process_task(task, &ctx, transformer.as_ref()).await {
            Ok(entry) => ctx.record(entry),
            Err(e) => {
                tracing::trace!(worker = id, task = %name, state = %TaskState::Failed);
                ctx.fail(e);
                rx.close().await;
                break;
            }
        }
    }
    tracing::trace!(worker = id, "Worker exiting");
}

/// Resolve, apply the destination policy, and transform one task.
async fn process_task(
    mut task: Task,
    ctx: &RunContext,
    transformer: &dyn Transform,
) -> PipelineResult<FinishedEntry> {
    let policy = ctx.policy.clone();
    let probe = task.clone();
    task.dst_path = tokio::task::spawn_blocking(move || policy.resolve(&probe))
        .await
        .map_err(|e| PipelineError::Worker(format!("Task join error: {}", e)))??;

    if !ctx.claim(&task.dst_path) {
        tracing::debug!(
            "{:?} resolves to {:?}, already claimed in this run",
            task.src_path,
            task.dst_path
        );
        tracing::trace!(task = %task.file_name(), state = %TaskState::Skipped);
        return Ok(task.finish(Outcome::SkippedDuplicate));
    }

    let exists = tokio::fs::try_exists(&task.dst_path).await.unwrap_or(false);
    match decide(exists, ctx.skip_existing, ctx.overwrite) {
        Action::Skip => {
            tracing::trace!(task = %task.file_name(), state = %TaskState::Skipped);
            Ok(task.finish(Outcome::SkippedExisting))
        }
        Action::SkipUnresolved => {
            ctx.info(&format!(
                "Skipping '{}': destination exists and overwrite is off",
                task.file_name()
            ));
            tracing::trace!(task = %task.file_name(), state = %TaskState::Skipped);
            Ok(task.finish(Outcome::SkippedExisting))
        }
        Action::Transform => {
            tracing::trace!(task = %task.file_name(), state = %TaskState::Transforming);
            let outcome = transformer
                .transform(&task.src_path, &task.dst_path, task.height)
                .await?;
            tracing::trace!(task = %task.file_name(), state = %TaskState::Done);
            Ok(task.finish(outcome))
        }
    }
}
