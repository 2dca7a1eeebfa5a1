//! Render invocation: stream the transformed source to the renderer.

use crate::error::RenderError;
use log::{debug, info, warn};
use std::fmt::Debug;
use std::io::Write;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// How often a renderer with a deadline is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// The external typesetter.
///
/// # Contract
///
/// Implementations receive the full source on stdin (or equivalent), as
/// raw bytes in the document's own encoding, and,
/// run inside `working_dir`, must leave behind `<stem>.pdf` and `<stem>.log`,
/// where `<stem>` is the job name the pipeline configured. Any
/// `\typeout{<text>}` directive in the source must show up in the log as a
/// line of its own, with `\thepage` expanded to the current physical page.
pub trait Renderer: Send + Sync + Debug {
    fn render(&self, lines: &[Vec<u8>], working_dir: &Path) -> Result<(), RenderError>;

    /// Returns a human-readable name for this renderer (for logging/debugging).
    fn name(&self) -> &str;
}

/// Runs a renderer executable such as `pdflatex` as a child process.
#[derive(Debug, Clone)]
pub struct ProcessRenderer {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl ProcessRenderer {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into(), args: Vec::new(), timeout: None }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Kills the renderer if it has not exited after `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    fn wait(&self, child: &mut Child) -> Result<ExitStatus, RenderError> {
        let Some(timeout) = self.timeout else {
            return child.wait().map_err(|source| self.wait_error(source));
        };

        let deadline = Instant::now() + timeout;
        loop {
            if let Some(status) = child.try_wait().map_err(|source| self.wait_error(source))? {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                warn!("Renderer '{}' exceeded {:?}, killing it", self.program, timeout);
                if let Err(e) = child.kill() {
                    warn!("Failed to kill renderer '{}': {}", self.program, e);
                }
                // Reap the child so it does not linger as a zombie.
                let _ = child.wait();
                return Err(RenderError::TimedOut { program: self.program.clone(), timeout });
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    fn wait_error(&self, source: std::io::Error) -> RenderError {
        RenderError::Wait { program: self.program.clone(), source }
    }
}

impl Renderer for ProcessRenderer {
    fn render(&self, lines: &[Vec<u8>], working_dir: &Path) -> Result<(), RenderError> {
        let start = Instant::now();
        info!("Running {} {} in {}", self.program, self.args.join(" "), working_dir.display());

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .current_dir(working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| RenderError::Spawn { program: self.program.clone(), source })?;

        let mut stdin = child.stdin.take().ok_or_else(|| RenderError::Spawn {
            program: self.program.clone(),
            source: std::io::Error::other("stdin was not captured"),
        })?;

        let mut content = lines.join(&b'\n');
        content.push(b'\n');

        // The renderer may start reading before the whole source is written,
        // so feed it from a separate thread while this one waits on the process.
        let writer = thread::Builder::new()
            .name("texsplit-render-stdin".to_string())
            .spawn(move || stdin.write_all(&content));
        let writer = match writer {
            Ok(handle) => handle,
            Err(source) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(RenderError::Spawn { program: self.program.clone(), source });
            }
        };

        let status = self.wait(&mut child);

        match writer.join() {
            Ok(Ok(())) => {}
            // The exit status decides; a renderer that stops reading early
            // leaves the writer with a broken pipe.
            Ok(Err(e)) => debug!("Renderer '{}' closed stdin early: {}", self.program, e),
            Err(_) => warn!("stdin writer for renderer '{}' panicked", self.program),
        }

        let status = status?;
        if !status.success() {
            return Err(RenderError::Exit { program: self.program.clone(), status });
        }

        debug!("Renderer '{}' finished in {:?}", self.program, start.elapsed());
        Ok(())
    }

    fn name(&self) -> &str {
        &self.program
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn lines(text: &[&str]) -> Vec<Vec<u8>> {
        text.iter().map(|s| s.as_bytes().to_vec()).collect()
    }

    #[test]
    fn test_streams_content_to_stdin() {
        let dir = tempdir().unwrap();
        let renderer = ProcessRenderer::new("sh").with_args(["-c", "cat > captured.tex"]);

        renderer.render(&lines(&["\\begin{document}", "hi", "\\end{document}"]), dir.path()).unwrap();

        let captured = std::fs::read_to_string(dir.path().join("captured.tex")).unwrap();
        assert_eq!(captured, "\\begin{document}\nhi\n\\end{document}\n");
    }

    #[test]
    fn test_non_utf8_bytes_reach_the_renderer_unchanged() {
        let dir = tempdir().unwrap();
        let renderer = ProcessRenderer::new("sh").with_args(["-c", "cat > captured.tex"]);

        renderer.render(&[b"Caf\xe9".to_vec(), b"\xff\xfe".to_vec()], dir.path()).unwrap();

        let captured = std::fs::read(dir.path().join("captured.tex")).unwrap();
        assert_eq!(captured, b"Caf\xe9\n\xff\xfe\n");
    }

    #[test]
    fn test_large_input_does_not_deadlock() {
        let dir = tempdir().unwrap();
        let renderer = ProcessRenderer::new("sh").with_args(["-c", "wc -c > size.txt"]);
        let big: Vec<Vec<u8>> = (0..50_000).map(|i| format!("line number {}", i).into_bytes()).collect();

        renderer.render(&big, dir.path()).unwrap();

        let size: usize = std::fs::read_to_string(dir.path().join("size.txt")).unwrap().trim().parse().unwrap();
        assert_eq!(size, big.iter().map(|line| line.len() + 1).sum::<usize>());
    }

    #[test]
    fn test_nonzero_exit_is_an_error() {
        let dir = tempdir().unwrap();
        let renderer = ProcessRenderer::new("sh").with_args(["-c", "cat > /dev/null; exit 3"]);

        let err = renderer.render(&lines(&["x"]), dir.path()).unwrap_err();
        match err {
            RenderError::Exit { status, .. } => assert_eq!(status.code(), Some(3)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_renderer_that_ignores_stdin_is_judged_by_exit_status() {
        let dir = tempdir().unwrap();
        let renderer = ProcessRenderer::new("true");
        let big: Vec<Vec<u8>> = (0..50_000).map(|i| format!("line {}", i).into_bytes()).collect();

        assert!(renderer.render(&big, dir.path()).is_ok());
    }

    #[test]
    fn test_missing_program_fails_to_spawn() {
        let dir = tempdir().unwrap();
        let renderer = ProcessRenderer::new("texsplit-definitely-not-installed");

        let err = renderer.render(&lines(&["x"]), dir.path()).unwrap_err();
        assert!(matches!(err, RenderError::Spawn { .. }));
    }

    #[test]
    fn test_timeout_kills_renderer() {
        let dir = tempdir().unwrap();
        let renderer = ProcessRenderer::new("sleep")
            .with_args(["5"])
            .with_timeout(Some(Duration::from_millis(200)));

        let start = Instant::now();
        let err = renderer.render(&lines(&["x"]), dir.path()).unwrap_err();
        assert!(matches!(err, RenderError::TimedOut { .. }));
        assert!(start.elapsed() < Duration::from_secs(4));
    }
}
