//! Output destination selection

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use crate::error::{Result, TreeError};

/// Where rendered output goes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputTarget {
    #[default]
    Stdout,
    Stderr,
    /// Discard everything
    Null,
    File(PathBuf),
}

impl OutputTarget {
    /// `-` or `stdout`, `stderr`, `/dev/null`, otherwise a file path.
    pub fn parse(dest: &str) -> Self {
        match dest {
            "-" | "stdout" => Self::Stdout,
            "stderr" => Self::Stderr,
            "/dev/null" => Self::Null,
            path => Self::File(PathBuf::from(path)),
        }
    }

    /// Open the destination. Files are created or truncated.
    pub fn open(&self) -> Result<Box<dyn Write>> {
        Ok(match self {
            Self::Stdout => Box::new(io::stdout()),
            Self::Stderr => Box::new(io::stderr()),
            Self::Null => Box::new(io::sink()),
            Self::File(path) => {
                let file = File::create(path).map_err(|source| TreeError::OpenOutput {
                    path: path.clone(),
                    source,
                })?;
                Box::new(BufWriter::new(file))
            }
        })
    }
}
