//! Recovers boundary page numbers from the renderer log.

use crate::error::LogScanError;
use log::{trace, warn};
use regex::bytes::Regex;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Matches the `<session-id> <page>` lines the boundary markers produce.
///
/// The log is handled as bytes: TeX writes whatever the input encoding
/// produced, and a stray non-UTF-8 line must not end the scan.
#[derive(Debug, Clone)]
pub struct MarkerScanner {
    pattern: Regex,
}

impl MarkerScanner {
    pub fn new(session_id: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(r"^{} ([0-9]+)$", regex::escape(session_id)))?;
        Ok(Self { pattern })
    }

    /// Returns the page number recorded on `line`, if it is a marker line.
    ///
    /// A marker whose number does not fit a page count is skipped with a
    /// warning rather than failing the scan.
    pub fn parse_line(&self, line: &[u8]) -> Option<u32> {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        let digits = self.pattern.captures(line)?.get(1)?.as_bytes();
        // The capture is ASCII digits only.
        let text = std::str::from_utf8(digits).ok()?;
        match text.parse::<u32>() {
            Ok(page) => Some(page),
            Err(e) => {
                warn!("Skipping boundary marker with unusable page number '{}': {}", text, e);
                None
            }
        }
    }

    /// Collects the page numbers of all marker lines, in log order.
    pub fn scan<R: BufRead>(&self, reader: R) -> io::Result<Vec<u32>> {
        let mut pages = Vec::new();
        for line in reader.split(b'\n') {
            if let Some(page) = self.parse_line(&line?) {
                trace!("Boundary marker at page {}", page);
                pages.push(page);
            }
        }
        Ok(pages)
    }
}

/// Scans the log at `path` for the boundary markers of `session_id`.
pub fn scan_log(path: &Path, session_id: &str) -> Result<Vec<u32>, LogScanError> {
    let scanner = MarkerScanner::new(session_id)?;
    let io_error = |source| LogScanError::Io { path: path.to_path_buf(), source };

    let file = File::open(path).map_err(io_error)?;
    scanner.scan(BufReader::new(file)).map_err(io_error)
}
