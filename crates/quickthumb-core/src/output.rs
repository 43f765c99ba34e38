//! Run reports: the finished list as JSON or JSON Lines, plus a tally.

use serde::Serialize;
use std::io::{self, Write};

use crate::types::{FinishedEntry, Outcome};

/// Report format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// A single JSON array
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// Serializes finished entries to a writer.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    entries_written: usize,
}

impl<W: Write> OutputWriter<W> {
    /// Create a report writer. `pretty` only affects the JSON array format.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            entries_written: 0,
        }
    }

    /// Write a whole finished list.
    pub fn write_report(&mut self, entries: &[FinishedEntry]) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                if self.pretty {
                    serde_json::to_writer_pretty(&mut self.writer, entries)
                        .map_err(io::Error::other)?;
                } else {
                    serde_json::to_writer(&mut self.writer, entries).map_err(io::Error::other)?;
                }
                writeln!(self.writer)?;
                self.entries_written += entries.len();
            }
            OutputFormat::JsonLines => {
                for entry in entries {
                    self.write_line(entry)?;
                }
            }
        }
        Ok(())
    }

    /// Write one entry as a JSON line, whatever the configured format.
    pub fn write_line(&mut self, entry: &FinishedEntry) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, entry).map_err(io::Error::other)?;
        writeln!(self.writer)?;
        self.entries_written += 1;
        Ok(())
    }

    /// Get the number of entries written.
    pub fn entries_written(&self) -> usize {
        self.entries_written
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Per-outcome counts for a finished list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub rotated: usize,
    pub resized: usize,
    pub skipped_existing: usize,
    pub skipped_duplicate: usize,
}

impl Summary {
    /// Tally the outcomes in `entries`.
    pub fn from_entries(entries: &[FinishedEntry]) -> Self {
        entries.iter().fold(Self::default(), |mut acc, entry| {
            match entry.outcome {
                Outcome::Rotated => acc.rotated += 1,
                Outcome::Resized => acc.resized += 1,
                Outcome::SkippedExisting => acc.skipped_existing += 1,
                Outcome::SkippedDuplicate => acc.skipped_duplicate += 1,
            }
            acc
        })
    }

    /// Number of thumbnails written.
    pub fn written(&self) -> usize {
        self.rotated + self.resized
    }

    /// Number of tasks left untouched.
    pub fn skipped(&self) -> usize {
        self.skipped_existing + self.skipped_duplicate
    }
}
