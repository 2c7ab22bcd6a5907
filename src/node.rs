//! Node - one filesystem entry plus its position in the rendered tree

use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::checksum::{CHECKSUM_PLACEHOLDER, sha1_hex};

/// Branch glyph for every entry except the last one in a listing.
pub const MIDDLE_BRANCH: &str = "├── ";
/// Branch glyph for the last entry in a listing.
pub const LAST_BRANCH: &str = "└── ";
/// Prefix segment under a directory that still has siblings below it.
pub const CONTINUATION: &str = "│   ";
/// Prefix segment under a directory that was the last in its listing.
pub const BLANK: &str = "    ";

/// Name plus `lstat` metadata of a directory entry, as seen by filters.
///
/// `std::fs::Metadata` carries no name, so the two travel together. The
/// name keeps the raw bytes the OS returned; paths are rebuilt from it.
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub name: OsString,
    pub metadata: Metadata,
}

impl FileInfo {
    pub fn new(name: impl Into<OsString>, metadata: Metadata) -> Self {
        Self {
            name: name.into(),
            metadata,
        }
    }

    /// Name for display, with invalid UTF-8 replaced.
    pub fn display_name(&self) -> Cow<'_, str> {
        self.name.to_string_lossy()
    }

    pub fn is_dir(&self) -> bool {
        self.metadata.file_type().is_dir()
    }

    pub fn is_regular(&self) -> bool {
        self.metadata.file_type().is_file()
    }

    pub fn is_symlink(&self) -> bool {
        self.metadata.file_type().is_symlink()
    }

    #[cfg(unix)]
    pub fn is_socket(&self) -> bool {
        use std::os::unix::fs::FileTypeExt;
        self.metadata.file_type().is_socket()
    }

    #[cfg(not(unix))]
    pub fn is_socket(&self) -> bool {
        false
    }

    #[cfg(unix)]
    pub fn is_pipe(&self) -> bool {
        use std::os::unix::fs::FileTypeExt;
        self.metadata.file_type().is_fifo()
    }

    #[cfg(not(unix))]
    pub fn is_pipe(&self) -> bool {
        false
    }

    /// Regular file with at least one execute bit set.
    #[cfg(unix)]
    pub fn is_executable(&self) -> bool {
        use std::os::unix::fs::PermissionsExt;
        self.is_regular() && self.metadata.permissions().mode() & 0o111 != 0
    }

    #[cfg(not(unix))]
    pub fn is_executable(&self) -> bool {
        false
    }

    pub fn kind(&self) -> EntryKind {
        if self.is_dir() {
            EntryKind::Directory
        } else if self.is_symlink() {
            EntryKind::Symlink
        } else if self.is_socket() {
            EntryKind::Socket
        } else if self.is_pipe() {
            EntryKind::Pipe
        } else if self.is_regular() {
            EntryKind::File
        } else {
            EntryKind::Other
        }
    }
}

/// Coarse classification of an entry, used by the JSON renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Directory,
    File,
    Symlink,
    Socket,
    Pipe,
    Other,
}

/// One filesystem entry as emitted by the walker.
///
/// Built once when the entry is read and accepted, then handed to a single
/// consumer. Every accessor is read-only.
#[derive(Debug)]
pub struct Node {
    name: OsString,
    parent: PathBuf,
    prefix: String,
    is_root: bool,
    is_last: bool,
    info: FileInfo,
}

impl Node {
    pub fn new(
        name: impl Into<OsString>,
        parent: impl Into<PathBuf>,
        prefix: impl Into<String>,
        is_root: bool,
        is_last: bool,
        info: FileInfo,
    ) -> Self {
        Self {
            name: name.into(),
            parent: parent.into(),
            prefix: prefix.into(),
            is_root,
            is_last,
            info,
        }
    }

    pub fn name(&self) -> &OsStr {
        &self.name
    }

    /// Name for display, with invalid UTF-8 replaced.
    pub fn display_name(&self) -> Cow<'_, str> {
        self.name.to_string_lossy()
    }

    /// Containing directory; empty for the root.
    pub fn parent(&self) -> &Path {
        &self.parent
    }

    /// Indentation accumulated from the ancestors of this entry.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn info(&self) -> &FileInfo {
        &self.info
    }

    pub fn full_path(&self) -> PathBuf {
        if self.parent.as_os_str().is_empty() {
            PathBuf::from(&self.name)
        } else {
            self.parent.join(&self.name)
        }
    }

    pub fn is_root(&self) -> bool {
        self.is_root
    }

    pub fn is_last(&self) -> bool {
        self.is_last
    }

    pub fn is_dir(&self) -> bool {
        self.info.is_dir()
    }

    pub fn is_regular(&self) -> bool {
        self.info.is_regular()
    }

    pub fn is_symlink(&self) -> bool {
        self.info.is_symlink()
    }

    pub fn is_socket(&self) -> bool {
        self.info.is_socket()
    }

    pub fn is_pipe(&self) -> bool {
        self.info.is_pipe()
    }

    pub fn is_executable(&self) -> bool {
        self.info.is_executable()
    }

    pub fn kind(&self) -> EntryKind {
        self.info.kind()
    }

    /// Branch glyph drawn in front of the name.
    pub fn mark(&self) -> &'static str {
        if self.is_root {
            ""
        } else if self.is_last {
            LAST_BRANCH
        } else {
            MIDDLE_BRANCH
        }
    }

    /// `ls -F` style type suffix. First match wins.
    pub fn decoration(&self) -> &'static str {
        if self.is_dir() {
            "/"
        } else if self.is_symlink() {
            "@"
        } else if self.is_socket() {
            "="
        } else if self.is_pipe() {
            "|"
        } else if self.is_executable() {
            "*"
        } else {
            ""
        }
    }

    /// Target of a symbolic link, annotated when it does not resolve.
    ///
    /// Callers gate on [`Node::is_symlink`]; anything else yields `[not symlink]`.
    pub fn symlink_target(&self) -> String {
        if self.is_symlink() {
            let link = self.full_path();
            if let Ok(target) = fs::read_link(&link) {
                let mut text = target.display().to_string();
                // metadata() follows the link, so it fails for a dangling one
                if fs::metadata(&link).is_err() {
                    text.push_str(" [bad link]");
                }
                return text;
            }
        }
        "[not symlink]".to_string()
    }

    /// Lowercase hex SHA-1 of a regular file's contents.
    ///
    /// Anything else, or a file that cannot be read, renders as a blank
    /// column of the same width. Read failures are logged, never raised.
    pub fn checksum(&self) -> String {
        if !self.is_regular() {
            return CHECKSUM_PLACEHOLDER.to_string();
        }
        let path = self.full_path();
        match sha1_hex(&path) {
            Ok(sum) => sum,
            Err(e) => {
                tracing::warn!(path = %path.display(), "failed to checksum file: {}", e);
                CHECKSUM_PLACEHOLDER.to_string()
            }
        }
    }
}
