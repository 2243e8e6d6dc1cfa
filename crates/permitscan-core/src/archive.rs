//! On-disk archive of extraction reports.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::report::ExtractionReport;

/// Directory that receives one report file per extraction attempt.
#[derive(Debug, Clone)]
pub struct ReportArchive {
    directory: PathBuf,
}

impl ReportArchive {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Write `report` under its own file name, creating the directory if needed.
    ///
    /// An existing report is never overwritten: when the name is taken, `_1`, `_2`, ...
    /// is appended to the stem until a free name is found.
    pub fn write(&self, report: &ExtractionReport) -> io::Result<PathBuf> {
        std::fs::create_dir_all(&self.directory)?;
        let (path, mut file) = self.create_unique(&report.file_name)?;
        file.write_all(report.to_string().as_bytes())?;

        debug!("Wrote extraction report to {}", path.display());
        Ok(path)
    }

    fn create_unique(&self, file_name: &str) -> io::Result<(PathBuf, File)> {
        let (stem, extension) = match file_name.rsplit_once('.') {
            Some((stem, extension)) => (stem, Some(extension)),
            None => (file_name, None),
        };

        let mut attempt = 0u32;
        loop {
            let name = match (attempt, extension) {
                (0, _) => file_name.to_string(),
                (n, Some(extension)) => format!("{}_{}.{}", stem, n, extension),
                (n, None) => format!("{}_{}", stem, n),
            };
            let path = self.directory.join(name);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
