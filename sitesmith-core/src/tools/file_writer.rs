//! Persist generated content under the output directory

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::info;

use crate::git::{ToolError, ToolResult, WriteReport};

/// Extension used when the caller names none
pub const DEFAULT_EXTENSION: &str = "txt";

/// Writes files into a single output directory
#[derive(Debug, Clone)]
pub struct FileWriter {
    dir: PathBuf,
}

impl FileWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `content` as `<filename>.<extension>`
    ///
    /// Without a filename a `yymmdd_HHMMSS_generated_file` name is used. An
    /// existing file of the same name is overwritten.
    pub fn write(
        &self,
        content: &str,
        filename: Option<&str>,
        extension: &str,
    ) -> ToolResult<WriteReport> {
        let stem = match filename {
            Some(name) => {
                validate_stem(name)?;
                name.to_string()
            }
            None => timestamped_stem(),
        };

        let extension = extension.trim_start_matches('.');
        let extension = if extension.is_empty() {
            DEFAULT_EXTENSION
        } else {
            extension
        };
        if extension.contains(['/', '\\']) {
            return Err(ToolError::WriteFailed(format!(
                "invalid extension '{}'",
                extension
            )));
        }

        let failed = |e: std::io::Error| ToolError::WriteFailed(e.to_string());
        fs::create_dir_all(&self.dir).map_err(failed)?;

        let file = self.dir.join(format!("{}.{}", stem, extension));
        fs::write(&file, content).map_err(failed)?;

        info!(file = %file.display(), bytes = content.len(), "Wrote file");
        Ok(WriteReport {
            message: format!("Wrote {}", file.display()),
            file,
        })
    }
}

fn timestamped_stem() -> String {
    format!("{}_generated_file", Local::now().format("%y%m%d_%H%M%S"))
}

fn validate_stem(name: &str) -> ToolResult<()> {
    if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
        return Err(ToolError::WriteFailed(format!(
            "invalid filename '{}': must be a plain name inside the output directory",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_named_file() {
        let dir = TempDir::new().unwrap();
        let writer = FileWriter::new(dir.path().join("output"));

        let report = writer.write("<html></html>", Some("index"), "html").unwrap();
        assert_eq!(report.file, dir.path().join("output").join("index.html"));
        assert_eq!(fs::read_to_string(&report.file).unwrap(), "<html></html>");
    }

    #[test]
    fn test_leading_dots_stripped() {
        let dir = TempDir::new().unwrap();
        let writer = FileWriter::new(dir.path());

        let report = writer.write("{}", Some("data"), ".json").unwrap();
        assert_eq!(report.file, dir.path().join("data.json"));

        let fallback = writer.write("x", Some("plain"), "").unwrap();
        assert_eq!(fallback.file, dir.path().join("plain.txt"));
    }

    #[test]
    fn test_default_name_is_timestamped() {
        let dir = TempDir::new().unwrap();
        let writer = FileWriter::new(dir.path());

        let report = writer.write("hello", None, DEFAULT_EXTENSION).unwrap();
        let name = report.file.file_name().unwrap().to_string_lossy().into_owned();

        assert!(name.ends_with("_generated_file.txt"));
        // yymmdd_HHMMSS
        let stamp = &name[..13];
        assert_eq!(stamp.as_bytes()[6], b'_');
        assert!(stamp
            .chars()
            .enumerate()
            .all(|(i, c)| i == 6 || c.is_ascii_digit()));
    }

    #[test]
    fn test_overwrites_existing() {
        let dir = TempDir::new().unwrap();
        let writer = FileWriter::new(dir.path());

        writer.write("first", Some("note"), "txt").unwrap();
        let report = writer.write("second", Some("note"), "txt").unwrap();
        assert_eq!(fs::read_to_string(report.file).unwrap(), "second");
    }

    #[test]
    fn test_rejects_escaping_names() {
        let dir = TempDir::new().unwrap();
        let writer = FileWriter::new(dir.path().join("output"));

        for name in ["../escape", "nested/file", "..", ""] {
            let err = writer.write("x", Some(name), "txt").unwrap_err();
            assert_eq!(err.kind(), crate::git::ErrorKind::WriteFailed, "{}", name);
        }
        assert!(!dir.path().join("escape.txt").exists());
    }
}
