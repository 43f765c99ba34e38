//! Destination path policy.
//!
//! Destinations are a function of the configuration plus either the source
//! base name (name-based mode) or the source bytes (content-hash mode).
//! `name_based` and `content_addressed` are pure; `resolve` only adds the
//! digest computation.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::config::{Config, NamingConfig, NamingMode};
use crate::error::PipelineError;
use crate::types::Task;

use super::discovery::SUPPORTED_EXTENSIONS;
use super::hash::Hasher;

/// Computes destination paths for tasks.
#[derive(Debug, Clone)]
pub struct PathPolicy {
    destination: PathBuf,
    naming: NamingConfig,
}

impl PathPolicy {
    /// Create a policy writing under `destination`.
    pub fn new(destination: &Path, config: &Config) -> Self {
        Self {
            destination: destination.to_path_buf(),
            naming: config.naming.clone(),
        }
    }

    /// Resolve the destination for a task, hashing the source if required.
    pub fn resolve(&self, task: &Task) -> Result<PathBuf, PipelineError> {
        match self.naming.mode {
            NamingMode::NameBased => Ok(self.name_based(task)),
            NamingMode::ContentHash => {
                let digest = Hasher::content_hash(&task.src_path, self.naming.hash_algorithm)
                    .map_err(|e| PipelineError::Hash {
                        path: task.src_path.clone(),
                        message: e.to_string(),
                    })?;
                Ok(self.content_addressed(&digest, task))
            }
        }
    }

    /// `destination / prefix + base + suffix + extension`.
    pub fn name_based(&self, task: &Task) -> PathBuf {
        let base = match &task.basename {
            Some(name) => OsString::from(name),
            None => stem_of(&task.src_path),
        };
        let mut file_name = OsString::from(&self.naming.prefix);
        file_name.push(base);
        file_name.push(&self.naming.suffix);
        file_name.push(self.output_extension(&task.src_path));
        self.destination.join(file_name)
    }

    /// `destination / digest + "_" + height + extension`.
    pub fn content_addressed(&self, digest: &str, task: &Task) -> PathBuf {
        let file_name = format!(
            "{}_{}{}",
            digest,
            task.height,
            self.output_extension(&task.src_path)
        );
        self.destination.join(file_name)
    }

    /// The custom extension when it is itself supported, else the source's own.
    pub fn output_extension(&self, src_path: &Path) -> String {
        if let Some(custom) = self.naming.extension.as_deref() {
            let dotted = if custom.starts_with('.') {
                custom.to_lowercase()
            } else {
                format!(".{}", custom.to_lowercase())
            };
            if SUPPORTED_EXTENSIONS.contains(&dotted.as_str()) {
                return dotted;
            }
            tracing::trace!("Ignoring unsupported custom extension {:?}", custom);
        }
        src_path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default()
    }
}

fn stem_of(path: &Path) -> OsString {
    path.file_stem().map(OsStr::to_os_string).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::hash::HashAlgorithm;

    fn make_policy(configure: impl FnOnce(&mut Config)) -> PathPolicy {
        let mut config = Config::default();
        configure(&mut config);
        PathPolicy::new(Path::new("/out"), &config)
    }

    fn task(src: &str) -> Task {
        Task::new(PathBuf::from(src), None, 300)
    }

    #[test]
    fn test_name_based_default_suffix() {
        let policy = make_policy(|_| {});
        assert_eq!(
            policy.resolve(&task("/in/beach.JPG")).unwrap(),
            PathBuf::from("/out/beach_thumb.JPG")
        );
    }

    #[test]
    fn test_name_based_prefix_suffix_and_basename() {
        let policy = make_policy(|c| {
            c.naming.prefix = "sm-".into();
            c.naming.suffix = String::new();
        });
        let mut t = task("/in/beach.png");
        t.basename = Some("cover".into());
        assert_eq!(policy.name_based(&t), PathBuf::from("/out/sm-cover.png"));
    }

    #[test]
    fn test_custom_extension_used_when_supported() {
        let policy = make_policy(|c| c.naming.extension = Some(".png".into()));
        assert_eq!(
            policy.name_based(&task("/in/a.jpg")),
            PathBuf::from("/out/a_thumb.png")
        );

        let policy = make_policy(|c| c.naming.extension = Some("JPEG".into()));
        assert_eq!(policy.output_extension(Path::new("a.png")), ".jpeg");
    }

    #[test]
    fn test_custom_extension_ignored_when_unsupported() {
        let policy = make_policy(|c| c.naming.extension = Some(".webp".into()));
        assert_eq!(
            policy.name_based(&task("/in/a.jpg")),
            PathBuf::from("/out/a_thumb.jpg")
        );
    }

    #[test]
    fn test_content_addressed_layout() {
        let policy = make_policy(|c| c.naming.mode = NamingMode::ContentHash);
        let mut t = task("/in/a.jpg");
        t.height = 400;
        assert_eq!(
            policy.content_addressed("abc123", &t),
            PathBuf::from("/out/abc123_400.jpg")
        );
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.jpg");
        std::fs::write(&src, b"same bytes").unwrap();

        for mode in [NamingMode::NameBased, NamingMode::ContentHash] {
            let policy = make_policy(|c| c.naming.mode = mode);
            let t = Task::new(src.clone(), None, 300);
            let first = policy.resolve(&t).unwrap();
            for _ in 0..3 {
                assert_eq!(policy.resolve(&t).unwrap(), first);
            }
        }
    }

    #[test]
    fn test_identical_content_maps_to_identical_destination() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.jpg");
        let b = dir.path().join("copy of a.jpg");
        std::fs::write(&a, b"identical").unwrap();
        std::fs::write(&b, b"identical").unwrap();

        let policy = make_policy(|c| {
            c.naming.mode = NamingMode::ContentHash;
            c.naming.hash_algorithm = HashAlgorithm::Sha256;
        });
        let da = policy.resolve(&Task::new(a, None, 300)).unwrap();
        let db = policy.resolve(&Task::new(b, None, 300)).unwrap();
        assert_eq!(da, db);

        let digest = Hasher::content_hash_from_bytes(b"identical", HashAlgorithm::Sha256);
        assert_eq!(da, PathBuf::from(format!("/out/{digest}_300.jpg")));
    }

    #[test]
    fn test_content_hash_missing_source_is_hash_error() {
        let policy = make_policy(|c| c.naming.mode = NamingMode::ContentHash);
        let err = policy.resolve(&task("/nonexistent/a.jpg")).unwrap_err();
        assert!(matches!(err, PipelineError::Hash { .. }));
    }
}
