//! Injectable sink for user-facing pipeline messages.

use std::fmt;
use std::sync::Arc;

/// A `(message) -> ()` sink for informational pipeline output.
///
/// The host process decides where messages go. The default forwards them
/// to `tracing` at INFO level.
#[derive(Clone)]
pub struct Logger(Arc<dyn Fn(&str) + Send + Sync>);

impl Logger {
    /// Wrap a closure as a logger.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Emit one message.
    pub fn log(&self, message: &str) {
        (self.0)(message)
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(|message| tracing::info!("{message}"))
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Logger(..)")
    }
}
