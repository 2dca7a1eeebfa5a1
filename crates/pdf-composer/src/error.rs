use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComposerError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to load '{}': {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },

    #[error("Nothing to merge into '{}'", .0.display())]
    EmptyMerge(PathBuf),

    #[error("{0}")]
    Other(String),
}
