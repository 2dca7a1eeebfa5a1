//! Marker injection: sentinel lines become boundary markers.
//!
//! Sources are handled as raw bytes. LaTeX documents are often written in a
//! legacy 8-bit encoding selected with `inputenc`, and every line that is not
//! a sentinel must reach the renderer untouched.

use crate::session::Session;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// A source with its sentinels replaced, ready to stream to the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectedSource {
    /// Source lines without terminators.
    pub lines: Vec<Vec<u8>>,
    /// Number of sentinel lines that were replaced.
    pub markers: usize,
}

/// Replaces every line exactly equal to `sentinel` with `marker`.
///
/// A trailing `\r` is dropped from each line before comparing, so CRLF
/// sources match too. All other lines pass through in order, so the output
/// has the same length as the input. Partial matches (leading or trailing
/// text, different whitespace) are not split points.
pub fn inject_lines<I>(lines: I, sentinel: &[u8], marker: &[u8]) -> InjectedSource
where
    I: IntoIterator<Item = Vec<u8>>,
{
    let mut markers = 0;
    let lines = lines
        .into_iter()
        .map(|mut line| {
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            if line == sentinel {
                markers += 1;
                marker.to_vec()
            } else {
                line
            }
        })
        .collect();
    InjectedSource { lines, markers }
}

/// Reads the source at `path` and injects the session's boundary markers.
///
/// Fails only if the file cannot be read; its encoding is not checked.
pub fn inject_markers(path: &Path, sentinel: &str, session: &Session) -> io::Result<InjectedSource> {
    let reader = BufReader::new(File::open(path)?);
    let lines = reader.split(b'\n').collect::<io::Result<Vec<_>>>()?;
    Ok(inject_lines(lines, sentinel.as_bytes(), session.marker_line().as_bytes()))
}
