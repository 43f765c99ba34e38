//! Core data types for the thumbnail pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// One unit of work: a single source image to thumbnail.
///
/// Created by the enumerator with an empty destination, which is assigned
/// once by the path policy before transformation.
#[derive(Debug, Clone)]
pub struct Task {
    /// Full path to the source image
    pub src_path: PathBuf,

    /// Resolved destination path (empty until assigned)
    pub dst_path: PathBuf,

    /// Explicit base name overriding the source stem
    pub basename: Option<String>,

    /// Target height in pixels
    pub height: u32,
}

impl Task {
    /// Create a pending task with no destination yet.
    pub fn new(src_path: PathBuf, basename: Option<String>, height: u32) -> Self {
        Self {
            src_path,
            dst_path: PathBuf::new(),
            basename,
            height,
        }
    }

    /// The source file name, for log lines.
    pub fn file_name(&self) -> String {
        file_name_of(&self.src_path)
    }

    /// Record the task's final options with how it terminated.
    pub fn finish(self, outcome: Outcome) -> FinishedEntry {
        FinishedEntry {
            src_path: self.src_path,
            dst_path: self.dst_path,
            basename: self.basename,
            height: self.height,
            outcome,
        }
    }
}

/// How a task reached a successful terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// EXIF orientation was corrected in place, then resized
    Rotated,
    /// Resized without orientation correction
    Resized,
    /// Destination already existed and was left untouched
    SkippedExisting,
    /// Another task in this run already owns the destination
    SkippedDuplicate,
}

impl Outcome {
    /// Whether the destination was written by this task.
    pub fn wrote_output(self) -> bool {
        matches!(self, Self::Rotated | Self::Resized)
    }
}

/// A task's final resolved options, appended on success or deliberate skip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinishedEntry {
    /// Source image path
    pub src_path: PathBuf,

    /// Destination path computed by the path policy
    pub dst_path: PathBuf,

    /// Explicit base name, if one was configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basename: Option<String>,

    /// Target height in pixels
    pub height: u32,

    /// Terminal outcome
    pub outcome: Outcome,
}

/// Finished entries in completion order, not enumeration order.
pub type FinishedList = Vec<FinishedEntry>;

/// Per-task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Skipped,
    Transforming,
    Done,
    Failed,
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Skipped => "skipped",
            Self::Transforming => "transforming",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Run-level lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Validating,
    Enumerating,
    Processing,
    Completed,
    Aborted,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Validating => "validating",
            Self::Enumerating => "enumerating",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Aborted => "aborted",
        };
        f.write_str(s)
    }
}

pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
