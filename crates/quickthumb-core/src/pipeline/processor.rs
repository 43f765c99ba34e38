//! Pipeline orchestration - wires together all processing stages.

use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::logger::Logger;
use crate::types::{FinishedList, RunState, Task};

use super::discovery::FileEnumerator;
use super::queue::WorkQueue;
use super::thumbnail::{ImageTransformer, Transform};
use super::validate::Validator;

/// The main entry point: one call to [`run`](Self::run) per batch.
pub struct ThumbnailPipeline {
    config: Config,
    logger: Logger,
    transformer: Arc<dyn Transform>,
}

impl ThumbnailPipeline {
    /// Create a pipeline with the given configuration and the image transformer.
    pub fn new(config: Config) -> Self {
        let transformer = Arc::new(ImageTransformer::new(&config.resize));
        Self {
            config,
            logger: Logger::default(),
            transformer,
        }
    }

    /// Route user-facing messages to `logger`.
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    /// Replace the transformer driving the worker pool.
    pub fn with_transformer(mut self, transformer: Arc<dyn Transform>) -> Self {
        self.transformer = transformer;
        self
    }

    /// Get a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Thumbnail everything at `source` into `destination`.
    ///
    /// Fails fast, with nothing written, on invalid configuration, a missing
    /// path, or unsupported files. Otherwise resolves with every finished
    /// entry, or with the first transform error.
    pub async fn run(&self, source: &Path, destination: &Path) -> Result<FinishedList> {
        let start = std::time::Instant::now();
        tracing::debug!(state = %RunState::Validating, "Run starting: {:?} -> {:?}", source, destination);

        self.config.validate()?;
        Validator::check_paths(source, destination)?;

        tracing::debug!(state = %RunState::Enumerating);
        let enumerator = FileEnumerator::new(&self.config, self.logger.clone());
        let enumeration = enumerator.enumerate(source)?;
        let total = enumeration.names.len();

        let basename = self.config.naming.basename.clone();
        let height = self.config.resize.height;
        let root = enumeration.root;
        let tasks = enumeration
            .names
            .into_iter()
            .map(move |name| Task::new(root.join(name), basename.clone(), height));

        let mut queue = WorkQueue::new(
            self.transformer.clone(),
            destination,
            &self.config,
            self.logger.clone(),
        );
        if !self.config.logging.quiet {
            let logger = self.logger.clone();
            queue = queue.with_on_item(Arc::new(move |entry| {
                logger.log(&format!("Processed {}", crate::types::file_name_of(&entry.src_path)));
            }));
        }

        tracing::debug!(state = %RunState::Processing, tasks = total);
        let finished = queue.run(tasks).await?;

        tracing::debug!(
            "Run finished: {} of {} task(s) in {:?}",
            finished.len(),
            total,
            start.elapsed()
        );
        Ok(finished)
    }
}
