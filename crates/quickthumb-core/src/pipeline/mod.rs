//! Thumbnail pipeline components.
//!
//! - **validate**: Source/destination existence checks
//! - **discovery**: Enumerate candidate images and enforce the whitelist
//! - **hash**: Streaming content digests
//! - **naming**: Destination path policy
//! - **metadata**: EXIF orientation probe
//! - **decode**: Format detection and encoding
//! - **thumbnail**: Orientation-aware resize
//! - **channel**: Bounded admission and the abort flag
//! - **queue**: The worker pool
//! - **processor**: Orchestrates a full run

pub mod channel;
pub mod decode;
pub mod discovery;
pub mod hash;
pub mod metadata;
pub mod naming;
pub mod processor;
pub mod queue;
pub mod thumbnail;
pub mod validate;

// Re-exports for convenient access
pub use decode::{DecodedImage, ImageDecoder};
pub use discovery::{Enumeration, FileEnumerator};
pub use hash::{HashAlgorithm, Hasher};
pub use metadata::{MetadataExtractor, Orientation};
pub use naming::PathPolicy;
pub use processor::ThumbnailPipeline;
pub use queue::{ItemCallback, WorkQueue};
pub use thumbnail::{ImageTransformer, Strategy, Transform};
pub use validate::Validator;
