//! The `quickthumb run` command for thumbnailing a directory.

use anyhow::Context;
use clap::Args;
use quickthumb_core::config::{coerce_height, expand_path};
use quickthumb_core::{
    Config, HashAlgorithm, NamingMode, OutputFormat, OutputWriter, Summary,
    ThumbnailPipeline,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Source image file or directory
    pub source: PathBuf,

    /// Destination directory (must exist)
    pub destination: PathBuf,

    /// Config file to use instead of the default location
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Prepended to every output name
    #[arg(long)]
    pub prefix: Option<String>,

    /// Appended to every output name
    #[arg(long)]
    pub suffix: Option<String>,

    /// Base name used for every output instead of the source name
    #[arg(long)]
    pub basename: Option<String>,

    /// Name outputs by a digest of the source bytes
    #[arg(long)]
    pub digest: bool,

    /// Digest algorithm: sha1, sha256, sha512, md5, blake3
    #[arg(long)]
    pub hash_algorithm: Option<String>,

    /// Thumbnail height in pixels (e.g. 300 or "300px")
    #[arg(long)]
    pub height: Option<String>,

    /// Number of parallel workers (defaults to the CPU count)
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// Suppress informational messages
    #[arg(short, long)]
    pub quiet: bool,

    /// Replace existing thumbnails
    #[arg(long)]
    pub overwrite: bool,

    /// Leave existing thumbnails untouched
    #[arg(long)]
    pub skip: bool,

    /// Ignore files with unsupported extensions instead of failing
    #[arg(long)]
    pub ignore: bool,

    /// Output extension (jpg, jpeg or png) instead of the source's own
    #[arg(long)]
    pub extension: Option<String>,

    /// JPEG quality for written thumbnails (1-100)
    #[arg(long)]
    pub quality: Option<u8>,

    /// Write the finished list to this file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Report format: json (one array) or jsonl (one entry per line)
    #[arg(long, default_value = "json", value_parser = parse_report_format)]
    pub report_format: OutputFormat,
}

fn parse_report_format(raw: &str) -> Result<OutputFormat, String> {
    OutputFormat::parse(raw).ok_or_else(|| format!("unknown report format '{raw}' (json, jsonl)"))
}

impl RunArgs {
    /// Apply the command-line overrides on top of `config`.
    pub fn apply(&self, mut config: Config) -> anyhow::Result<Config> {
        if let Some(prefix) = &self.prefix {
            config.naming.prefix = prefix.clone();
        }
        if let Some(suffix) = &self.suffix {
            config.naming.suffix = suffix.clone();
        }
        if let Some(basename) = &self.basename {
            config.naming.basename = Some(basename.clone());
        }
        if self.digest {
            config.naming.mode = NamingMode::ContentHash;
        }
        if let Some(name) = &self.hash_algorithm {
            config.naming.hash_algorithm = HashAlgorithm::parse(name)
                .with_context(|| format!("Unknown hash algorithm '{name}'"))?;
        }
        if let Some(extension) = &self.extension {
            config.naming.extension = Some(extension.clone());
        }

        if let Some(raw) = &self.height {
            config.resize.height =
                coerce_height(raw).with_context(|| format!("Invalid height '{raw}'"))?;
        }
        if let Some(quality) = self.quality {
            config.resize.jpeg_quality = quality;
        }

        if let Some(concurrency) = self.concurrency {
            config.processing.concurrency = concurrency;
        }
        config.processing.overwrite |= self.overwrite;
        config.processing.skip_existing |= self.skip;
        config.processing.ignore_unsupported |= self.ignore;
        config.logging.quiet |= self.quiet;

        config.validate()?;
        Ok(config)
    }

    fn load_config(&self) -> anyhow::Result<Config> {
        let config = match &self.config {
            Some(path) => Config::load_from(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => Config::load()?,
        };
        self.apply(config)
    }
}

/// Execute the run command.
pub async fn execute(args: RunArgs) -> anyhow::Result<()> {
    let config = args.load_config()?;
    let source = expand_path(&args.source);
    let destination = expand_path(&args.destination);

    tracing::debug!(
        "Thumbnailing {:?} -> {:?} at {}px with {} worker(s)",
        source,
        destination,
        config.resize.height,
        config.processing.concurrency
    );

    let quiet = config.logging.quiet;
    let pipeline = ThumbnailPipeline::new(config);
    let finished = pipeline.run(&source, &destination).await?;

    let summary = Summary::from_entries(&finished);
    if !quiet {
        tracing::info!(
            "Wrote {} thumbnail(s) ({} rotated), skipped {}",
            summary.written(),
            summary.rotated,
            summary.skipped()
        );
    }

    if let Some(report) = &args.report {
        write_report(&expand_path(report), args.report_format, &finished)?;
    }

    Ok(())
}

fn write_report(
    path: &Path,
    format: OutputFormat,
    finished: &[quickthumb_core::FinishedEntry],
) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create report {}", path.display()))?;
    let mut writer = OutputWriter::new(BufWriter::new(file), format, true);
    writer.write_report(finished)?;
    writer.flush()?;
    tracing::info!("Report written to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: RunArgs,
    }

    fn parse(extra: &[&str]) -> RunArgs {
        let mut argv = vec!["quickthumb", "in", "out"];
        argv.extend_from_slice(extra);
        Harness::try_parse_from(argv).unwrap().args
    }

    #[test]
    fn run_args_defaults_leave_config_alone() {
        let args = parse(&[]);
        assert!(!args.digest && !args.quiet && !args.overwrite && !args.skip && !args.ignore);
        assert_eq!(args.report_format, OutputFormat::Json);

        let config = args.apply(Config::default()).unwrap();
        assert_eq!(config.naming.suffix, "_thumb");
        assert_eq!(config.naming.mode, NamingMode::NameBased);
        assert_eq!(config.resize.height, 300);
    }

    #[test]
    fn run_args_override_config() {
        let args = parse(&[
            "--prefix", "p_", "--suffix", "", "--digest", "--hash-algorithm", "sha256",
            "--height", "120px", "-j", "3", "--skip", "--ignore", "--quiet", "--extension",
            "png", "--quality", "75",
        ]);
        let config = args.apply(Config::default()).unwrap();

        assert_eq!(config.naming.prefix, "p_");
        assert_eq!(config.naming.suffix, "");
        assert_eq!(config.naming.mode, NamingMode::ContentHash);
        assert_eq!(config.naming.hash_algorithm, HashAlgorithm::Sha256);
        assert_eq!(config.naming.extension.as_deref(), Some("png"));
        assert_eq!(config.resize.height, 120);
        assert_eq!(config.resize.jpeg_quality, 75);
        assert_eq!(config.processing.concurrency, 3);
        assert!(config.processing.skip_existing);
        assert!(config.processing.ignore_unsupported);
        assert!(config.logging.quiet);
    }

    #[test]
    fn run_args_flags_do_not_clear_file_settings() {
        let mut file_config = Config::default();
        file_config.processing.overwrite = true;
        let config = parse(&[]).apply(file_config).unwrap();
        assert!(config.processing.overwrite);
    }

    #[test]
    fn run_args_report_format_names() {
        assert_eq!(parse(&["--report-format", "jsonl"]).report_format, OutputFormat::JsonLines);
        assert_eq!(parse(&["--report-format", "NDJSON"]).report_format, OutputFormat::JsonLines);
        let argv = ["quickthumb", "in", "out", "--report-format", "csv"];
        assert!(Harness::try_parse_from(argv).is_err());
    }

    #[test]
    fn run_args_reject_bad_values() {
        assert!(parse(&["--height", "tall"]).apply(Config::default()).is_err());
        assert!(parse(&["--height", "0"]).apply(Config::default()).is_err());
        assert!(parse(&["--hash-algorithm", "crc32"])
            .apply(Config::default())
            .is_err());
        assert!(parse(&["-j", "0"]).apply(Config::default()).is_err());
    }

    #[tokio::test]
    async fn execute_writes_thumbnails_and_report() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let img = image::DynamicImage::new_rgb8(80, 40);
        img.save(src.path().join("a.png")).unwrap();

        let cfg_dir = tempfile::tempdir().unwrap();
        let cfg_path = cfg_dir.path().join("config.toml");
        std::fs::write(&cfg_path, "[resize]\nheight = \"20\"\n").unwrap();
        let report = cfg_dir.path().join("report.jsonl");

        let src_arg = src.path().to_string_lossy().into_owned();
        let dst_arg = dst.path().to_string_lossy().into_owned();
        let cfg_arg = cfg_path.to_string_lossy().into_owned();
        let report_arg = report.to_string_lossy().into_owned();
        let args = Harness::try_parse_from([
            "quickthumb",
            src_arg.as_str(),
            dst_arg.as_str(),
            "--config",
            cfg_arg.as_str(),
            "--quiet",
            "--report",
            report_arg.as_str(),
            "--report-format",
            "jsonl",
        ])
        .unwrap()
        .args;

        execute(args).await.unwrap();

        let thumb = dst.path().join("a_thumb.png");
        assert_eq!(image::image_dimensions(&thumb).unwrap(), (40, 20));
        let lines = std::fs::read_to_string(&report).unwrap();
        assert_eq!(lines.lines().count(), 1);
        assert!(lines.contains("\"outcome\":\"resized\""));
    }

    #[tokio::test]
    async fn execute_surfaces_validation_error() {
        let src = tempfile::tempdir().unwrap();
        let missing = src.path().join("missing");
        let src_arg = src.path().to_string_lossy().into_owned();
        let dst_arg = missing.to_string_lossy().into_owned();

        let cfg_dir = tempfile::tempdir().unwrap();
        let cfg_path = cfg_dir.path().join("config.toml");
        std::fs::write(&cfg_path, "").unwrap();
        let cfg_arg = cfg_path.to_string_lossy().into_owned();

        let args = Harness::try_parse_from([
            "quickthumb",
            src_arg.as_str(),
            dst_arg.as_str(),
            "--config",
            cfg_arg.as_str(),
        ])
        .unwrap()
        .args;

        let err = execute(args).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Destination '{}' does not exist.", missing.display())
        );
    }
}
