//! Append-only results writer.
//!
//! One writer per session, one shared file per run (and across runs if
//! the path persists). The file is opened, appended and closed per
//! batch so no handle is held while the pipeline blocks on a prompt.
//! Write failures are logged and swallowed - measurement continues,
//! that batch's lines are lost.

use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::models::{ChannelRole, Measurement};

use super::format::{background_line, spot_line};

/// Appends formatted measurement lines to the shared results file.
pub struct ReportWriter {
    path: PathBuf,
    image_name: String,
    header_written: bool,
}

impl ReportWriter {
    /// Create a writer for one session appending to `path`.
    pub fn new(path: impl Into<PathBuf>, image_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            image_name: image_name.into(),
            header_written: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one cell/channel batch of spot measurements.
    ///
    /// Measurements with mean <= 0 are treated as absent and skipped.
    /// The first primary-channel batch of cell 0 is preceded by the
    /// source-image header block. Returns the number of measurement
    /// lines written; 0 on I/O failure (logged, not fatal).
    pub fn write_spot_batch(
        &mut self,
        role: ChannelRole,
        tag: &str,
        cell_index: usize,
        measurements: &[Measurement],
    ) -> usize {
        let valid: Vec<&Measurement> = measurements.iter().filter(|m| m.is_valid()).collect();
        if valid.is_empty() {
            return 0;
        }

        let include_header =
            role == ChannelRole::Primary && cell_index == 0 && !self.header_written;

        let mut lines = Vec::with_capacity(valid.len() + 4);
        if include_header {
            lines.push(String::new());
            lines.push(String::new());
            lines.push(format!(" File= {}", self.image_name));
            lines.push(String::new());
        }
        for m in &valid {
            lines.push(spot_line(tag, cell_index, m));
        }

        match self.append(&lines) {
            Ok(()) => {
                if include_header {
                    self.header_written = true;
                }
                valid.len()
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "report write failed");
                0
            }
        }
    }

    /// Append one block of background sample lines, unfiltered, preceded
    /// by a blank line. Returns the number of lines written; 0 on I/O
    /// failure (logged, not fatal).
    pub fn write_background_batch(&mut self, samples: &[Measurement]) -> usize {
        if samples.is_empty() {
            return 0;
        }

        let mut lines = Vec::with_capacity(samples.len() + 1);
        lines.push(String::new());
        for m in samples {
            lines.push(background_line(m));
        }

        match self.append(&lines) {
            Ok(()) => samples.len(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "report write failed");
                0
            }
        }
    }

    fn append(&self, lines: &[String]) -> io::Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = BufWriter::new(file);
        for line in lines {
            writeln!(writer, "{}", line)?;
        }
        writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn read(path: &Path) -> String {
        std::fs::read_to_string(path).unwrap()
    }

    #[test]
    fn first_primary_batch_carries_image_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Results.txt");
        let mut writer = ReportWriter::new(&path, "cells_01.tif");

        let n = writer.write_spot_batch(
            ChannelRole::Primary,
            "Green Dot",
            0,
            &[Measurement::new(12.5, 30.0, 375.0)],
        );
        assert_eq!(n, 1);

        let content = read(&path);
        assert!(content.starts_with("\n\n File= cells_01.tif\n\n"));
        assert!(content
            .contains("Green Dot Cell 1 Mean Intensity = 12.5  Area = 30.0 Integrated Intensity = 375.0"));
    }

    #[test]
    fn header_appears_only_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Results.txt");
        let mut writer = ReportWriter::new(&path, "cells_01.tif");

        let ms = [Measurement::new(5.0, 10.0, 50.0)];
        writer.write_spot_batch(ChannelRole::Primary, "Green Dot", 0, &ms);
        writer.write_spot_batch(ChannelRole::Secondary, "Red Dot", 0, &ms);
        writer.write_spot_batch(ChannelRole::Primary, "Green Dot", 1, &ms);

        let content = read(&path);
        assert_eq!(content.matches(" File= ").count(), 1);
    }

    #[test]
    fn invalid_measurements_are_not_written() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Results.txt");
        let mut writer = ReportWriter::new(&path, "img.tif");

        let n = writer.write_spot_batch(
            ChannelRole::Primary,
            "Green Dot",
            0,
            &[
                Measurement::new(4.0, 9.0, 36.0),
                Measurement::new(0.0, 9.0, 0.0),
                Measurement::new(-2.0, 9.0, -18.0),
                Measurement::new(7.0, 12.0, 84.0),
            ],
        );
        assert_eq!(n, 2);

        let content = read(&path);
        assert_eq!(content.matches("Green Dot Cell 1").count(), 2);
    }

    #[test]
    fn all_invalid_batch_writes_nothing_at_all() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Results.txt");
        let mut writer = ReportWriter::new(&path, "img.tif");

        let n = writer.write_spot_batch(
            ChannelRole::Primary,
            "Green Dot",
            0,
            &[Measurement::new(0.0, 9.0, 0.0)],
        );
        assert_eq!(n, 0);
        assert!(!path.exists());
    }

    #[test]
    fn background_batch_is_unfiltered_and_unindexed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Results.txt");
        let mut writer = ReportWriter::new(&path, "img.tif");

        let n = writer.write_background_batch(&[
            Measurement::new(2.0, 100.0, 200.0),
            Measurement::new(0.0, 100.0, 0.0),
            Measurement::new(3.0, 100.0, 300.0),
            Measurement::new(2.5, 100.0, 250.0),
        ]);
        assert_eq!(n, 4);

        let content = read(&path);
        assert_eq!(content.matches("BackGround Mean Intensity").count(), 4);
        assert!(!content.contains("Cell"));
    }

    #[test]
    fn batches_accumulate_across_writers() {
        // Same path reused by a later session: lines append, never clobber.
        let dir = tempdir().unwrap();
        let path = dir.path().join("Results.txt");

        let ms = [Measurement::new(5.0, 10.0, 50.0)];
        let mut first = ReportWriter::new(&path, "a.tif");
        first.write_spot_batch(ChannelRole::Primary, "Green Dot", 0, &ms);

        let mut second = ReportWriter::new(&path, "b.tif");
        second.write_spot_batch(ChannelRole::Primary, "Green Dot", 0, &ms);

        let content = read(&path);
        assert!(content.contains(" File= a.tif"));
        assert!(content.contains(" File= b.tif"));
        assert_eq!(content.matches("Green Dot Cell 1").count(), 2);
    }

    #[test]
    fn unwritable_path_is_swallowed() {
        let dir = tempdir().unwrap();
        // A directory as the report path makes every open fail.
        let mut writer = ReportWriter::new(dir.path(), "img.tif");

        let n = writer.write_spot_batch(
            ChannelRole::Primary,
            "Green Dot",
            0,
            &[Measurement::new(5.0, 10.0, 50.0)],
        );
        assert_eq!(n, 0);
    }
}
