//! Quickthumb Core - Embeddable thumbnail generation library.
//!
//! Given a source directory (or a single file) of JPEG/PNG images, quickthumb
//! writes fixed-height thumbnails into a destination directory using a
//! bounded worker pool.
//!
//! # Architecture
//!
//! ```text
//! Validate → Enumerate → WorkQueue[ resolve path → skip/overwrite → transform ] → FinishedList
//! ```
//!
//! A run either resolves with every finished entry or fails with the first
//! error. Sources carrying an EXIF orientation are rewritten upright before
//! they are resized.
//!
//! # Usage
//!
//! ```rust,ignore
//! use quickthumb_core::{Config, ThumbnailPipeline};
//!
//! #[tokio::main]
//! async fn main() -> quickthumb_core::Result<()> {
//!     let config = Config::load()?;
//!     let pipeline = ThumbnailPipeline::new(config);
//!
//!     let finished = pipeline.run("./photos".as_ref(), "./thumbs".as_ref()).await?;
//!     println!("{} thumbnails", finished.len());
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod logger;
pub mod output;
pub mod pipeline;
pub mod types;

#[cfg(test)]
mod test_fixtures;

// Re-exports for convenient access
pub use config::{Config, NamingMode};
pub use error::{ConfigError, PipelineError, PipelineResult, Result, ThumbError};
pub use logger::Logger;
pub use output::{OutputFormat, OutputWriter, Summary};
pub use pipeline::{HashAlgorithm, ThumbnailPipeline};
pub use types::{FinishedEntry, FinishedList, Outcome, Task};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
