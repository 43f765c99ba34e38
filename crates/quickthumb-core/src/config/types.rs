//! Sub-configuration structs with their defaults.

use crate::pipeline::hash::HashAlgorithm;
use serde::{Deserialize, Deserializer, Serialize};

/// How destination file names are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NamingMode {
    /// `prefix + base name + suffix + extension`
    #[default]
    NameBased,
    /// `hex digest + "_" + height + extension`
    ContentHash,
}

/// Destination naming settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Naming mode
    pub mode: NamingMode,

    /// Prepended to the base name (name-based mode)
    pub prefix: String,

    /// Appended to the base name (name-based mode)
    pub suffix: String,

    /// Explicit base name used for every task instead of the source stem
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basename: Option<String>,

    /// Digest algorithm used in content-hash mode
    pub hash_algorithm: HashAlgorithm,

    /// Custom output extension (e.g. ".png"); ignored unless supported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            mode: NamingMode::NameBased,
            prefix: String::new(),
            suffix: "_thumb".to_string(),
            basename: None,
            hash_algorithm: HashAlgorithm::Sha1,
            extension: None,
        }
    }
}

/// Resize settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizeConfig {
    /// Target height in pixels; width follows the aspect ratio
    #[serde(deserialize_with = "deserialize_height")]
    pub height: u32,

    /// JPEG encoder quality (1-100)
    pub jpeg_quality: u8,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            height: 300,
            jpeg_quality: 90,
        }
    }
}

/// Worker pool and destination-exists policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Number of concurrent workers
    pub concurrency: usize,

    /// Replace destinations that already exist
    pub overwrite: bool,

    /// Leave existing destinations untouched and count them as finished
    pub skip_existing: bool,

    /// Silently drop files with unsupported extensions
    pub ignore_unsupported: bool,

    /// Tasks buffered between the feeder and the workers
    pub queue_depth: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            overwrite: false,
            skip_existing: false,
            ignore_unsupported: false,
            queue_depth: 64,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: pretty, json
    pub format: String,

    /// Suppress informational pipeline messages
    pub quiet: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            quiet: false,
        }
    }
}

/// Logical CPU count, falling back to a single worker.
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Coerce a height given as an integer or a string to `u32`.
///
/// Strings are read up to the first non-digit, so `"400"` and `"400px"`
/// both yield 400. A string without leading digits is rejected.
pub fn coerce_height(raw: &str) -> Option<u32> {
    let digits: String = raw
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn deserialize_height<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Height {
        Int(u32),
        Text(String),
    }

    match Height::deserialize(deserializer)? {
        Height::Int(h) => Ok(h),
        Height::Text(s) => coerce_height(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid height: {s:?}"))),
    }
}
