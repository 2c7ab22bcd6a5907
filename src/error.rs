//! Error types for arbor

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced to the caller. Traversal problems never show up here;
/// they are logged and the affected subtree is skipped.
#[derive(Error, Debug)]
pub enum TreeError {
    #[error("cannot open output '{path}': {source}")]
    OpenOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write output: {0}")]
    Write(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, TreeError>;
