//! Per-run session: a unique token and a scratch directory.

use rand::Rng;
use rand::distr::Alphanumeric;
use std::io;
use std::path::Path;
use tempfile::TempDir;

/// Fixed suffix appended to every session token.
pub const SESSION_SUFFIX: &str = "_texsplit";

const TOKEN_LEN: usize = 8;

/// One pipeline run's identity and scratch space.
///
/// The id scopes the boundary markers written into the renderer log, so it
/// must not collide with document text or with concurrent runs. It is built
/// from plain ASCII alphanumerics, which also keeps it free of characters
/// that would need escaping in a pattern.
///
/// The scratch directory is removed by [`Session::close`], or on drop if the
/// run ends early.
#[derive(Debug)]
pub struct Session {
    id: String,
    dir: TempDir,
}

impl Session {
    /// Creates a session with its scratch directory in the system temp dir.
    pub fn new() -> io::Result<Self> {
        let id = Self::generate_id();
        let dir = tempfile::Builder::new().prefix(&format!("{}-", id)).tempdir()?;
        Ok(Self { id, dir })
    }

    /// Creates a session with its scratch directory under `root`.
    pub fn new_in(root: &Path) -> io::Result<Self> {
        let id = Self::generate_id();
        let dir = tempfile::Builder::new().prefix(&format!("{}-", id)).tempdir_in(root)?;
        Ok(Self { id, dir })
    }

    pub fn generate_id() -> String {
        let token: String = rand::rng()
            .sample_iter(Alphanumeric)
            .take(TOKEN_LEN)
            .map(char::from)
            .collect();
        format!("{}{}", token, SESSION_SUFFIX)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// The source line substituted for each sentinel. When typeset it
    /// writes `<id> <page>` to the renderer log.
    pub fn marker_line(&self) -> String {
        format!("\\typeout{{{} \\thepage}}", self.id)
    }

    /// Removes the scratch directory, reporting any failure.
    pub fn close(self) -> io::Result<()> {
        self.dir.close()
    }
}
