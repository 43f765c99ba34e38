//! Source enumeration: list candidate images and enforce the extension whitelist.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::PipelineError;
use crate::logger::Logger;

/// Extensions accepted as input and as custom output extensions.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = [".jpg", ".jpeg", ".png"];

/// Check if a file name has a supported extension (case-insensitive).
pub fn is_supported(name: &Path) -> bool {
    name.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let dotted = format!(".{}", ext.to_lowercase());
            SUPPORTED_EXTENSIONS.contains(&dotted.as_str())
        })
        .unwrap_or(false)
}

/// Candidate names relative to an effective source root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enumeration {
    /// Directory the names are relative to
    pub root: PathBuf,
    /// Valid file names, sorted
    pub names: Vec<OsString>,
}

impl Enumeration {
    /// Full path of every enumerated name.
    pub fn paths(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.names.iter().map(|name| self.root.join(name))
    }
}

/// Lists and filters candidate source files.
pub struct FileEnumerator {
    ignore_unsupported: bool,
    quiet: bool,
    logger: Logger,
}

impl FileEnumerator {
    /// Create an enumerator from the run configuration.
    pub fn new(config: &Config, logger: Logger) -> Self {
        Self {
            ignore_unsupported: config.processing.ignore_unsupported,
            quiet: config.logging.quiet,
            logger,
        }
    }

    /// Enumerate the candidate images at `source`.
    ///
    /// A single file yields itself, with its parent as the root. A directory
    /// yields its direct file entries; subdirectories are skipped with a
    /// warning. Fails with `UnsupportedFormat` naming every offending file
    /// unless unsupported files are being ignored.
    pub fn enumerate(&self, source: &Path) -> Result<Enumeration, PipelineError> {
        let (root, candidates) = if source.is_file() {
            let root = source
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            let name = source
                .file_name()
                .map(|n| n.to_os_string())
                .ok_or_else(|| PipelineError::Enumerate {
                    path: source.to_path_buf(),
                    message: "path has no file name".to_string(),
                })?;
            (root, vec![name])
        } else {
            (source.to_path_buf(), self.list_files(source)?)
        };

        let (names, invalid): (Vec<OsString>, Vec<OsString>) = candidates
            .into_iter()
            .partition(|name| is_supported(Path::new(name)));

        if !invalid.is_empty() {
            if !self.ignore_unsupported {
                let files = invalid
                    .iter()
                    .map(|name| name.to_string_lossy().into_owned())
                    .collect();
                return Err(PipelineError::UnsupportedFormat { files });
            }
            tracing::debug!("Ignoring {} unsupported file(s)", invalid.len());
        }

        tracing::debug!("Enumerated {} image(s) under {:?}", names.len(), root);
        Ok(Enumeration { root, names })
    }

    /// List the direct file entries of a directory, warning on subdirectories.
    fn list_files(&self, dir: &Path) -> Result<Vec<OsString>, PipelineError> {
        let mut files = Vec::new();

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| PipelineError::Enumerate {
                path: dir.to_path_buf(),
                message: e.to_string(),
            })?;
            let path = entry.path();

            if path.is_dir() {
                if !self.quiet {
                    let name = entry.file_name().to_string_lossy();
                    self.logger
                        .log(&format!("Warning: '{name}' is a directory, skipping..."));
                }
            } else if path.is_file() {
                files.push(entry.file_name().to_os_string());
            } else {
                tracing::debug!("Skipping non-regular entry {:?}", path);
            }
        }

        Ok(files)
    }
}
