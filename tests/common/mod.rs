pub mod fixtures;
pub mod pdf_assertions;

use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A working directory for the renderer plus a separate scratch root, so
/// tests can check that a run leaves no scratch directories behind.
pub struct Workspace {
    pub work: TempDir,
    pub scratch: TempDir,
}

impl Workspace {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self { work: tempfile::tempdir()?, scratch: tempfile::tempdir()? })
    }

    pub fn write_source(&self, name: &str, source: &str) -> std::io::Result<PathBuf> {
        let path = self.work.path().join(name);
        std::fs::write(&path, source)?;
        Ok(path)
    }

    pub fn work_path(&self) -> &Path {
        self.work.path()
    }

    pub fn scratch_is_empty(&self) -> std::io::Result<bool> {
        Ok(std::fs::read_dir(self.scratch.path())?.next().is_none())
    }

    /// Output files named `<part>_<stem>.pdf`, sorted.
    pub fn outputs(&self, stem: &str) -> std::io::Result<Vec<String>> {
        let suffix = format!("_{}.pdf", stem);
        let mut names: Vec<String> = std::fs::read_dir(self.work.path())?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.ends_with(&suffix) && name[..name.len() - suffix.len()].parse::<usize>().is_ok())
            .collect();
        names.sort();
        Ok(names)
    }
}
