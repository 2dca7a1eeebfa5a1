//! Page-level operations on the rendered PDF.
//!
//! The pipeline talks to the PDF only through [`PageArtifacts`], which
//! keeps the partition logic independent of the PDF library and lets tests
//! substitute failing implementations.

use std::fmt::Debug;
use std::path::{Path, PathBuf};
use texsplit_pdf_composer::{self as composer, ComposerError};

pub trait PageArtifacts: Send + Sync + Debug {
    /// Number of pages in the artifact at `path`.
    fn page_count(&self, path: &Path) -> Result<u32, ComposerError>;

    /// Writes one file per page into `dest_dir`, named with
    /// [`composer::page_file_name`]. Returns the files in page order.
    fn split_into_pages(&self, path: &Path, dest_dir: &Path, stem: &str) -> Result<Vec<PathBuf>, ComposerError>;

    /// Concatenates `files`, in order, into a new artifact at `dest`.
    fn merge_pages(&self, files: &[PathBuf], dest: &Path) -> Result<PathBuf, ComposerError>;
}

/// [`PageArtifacts`] backed by lopdf.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfArtifacts;

impl PageArtifacts for LopdfArtifacts {
    fn page_count(&self, path: &Path) -> Result<u32, ComposerError> {
        composer::page_count(path)
    }

    fn split_into_pages(&self, path: &Path, dest_dir: &Path, stem: &str) -> Result<Vec<PathBuf>, ComposerError> {
        composer::split_into_pages(path, dest_dir, stem)
    }

    fn merge_pages(&self, files: &[PathBuf], dest: &Path) -> Result<PathBuf, ComposerError> {
        composer::merge_pages(files, dest)
    }
}
