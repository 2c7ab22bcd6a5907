//! Line formatter for the node stream
//!
//! `Formatter` turns each [`Node`] into one display line. It can be driven
//! as an iterator of lines or wrapped in a [`FormatReader`] and copied into
//! any byte sink without holding the whole tree in memory.

use std::fmt;
use std::io::{self, Read};

use crate::node::Node;
use crate::tree::NodeStream;

use super::config::FormatMode;

/// Renders nodes according to a [`FormatMode`].
///
/// The mode can be changed between traversals; a bound stream belongs to one
/// traversal only.
#[derive(Debug, Default)]
pub struct Formatter {
    mode: FormatMode,
    input: Option<NodeStream>,
}

impl Formatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: FormatMode) -> Self {
        Self { mode, input: None }
    }

    pub fn mode(&self) -> FormatMode {
        self.mode
    }

    pub fn show_full_path(&self) -> bool {
        self.mode.full_path
    }

    pub fn show_prefix(&self) -> bool {
        self.mode.prefix
    }

    pub fn show_decoration(&self) -> bool {
        self.mode.decoration
    }

    pub fn show_symlink_target(&self) -> bool {
        self.mode.symlink_target
    }

    pub fn show_checksum(&self) -> bool {
        self.mode.checksum
    }

    pub fn set_show_full_path(&mut self, on: bool) {
        self.mode.full_path = on;
    }

    pub fn set_show_prefix(&mut self, on: bool) {
        self.mode.prefix = on;
    }

    pub fn set_show_decoration(&mut self, on: bool) {
        self.mode.decoration = on;
    }

    pub fn set_show_symlink_target(&mut self, on: bool) {
        self.mode.symlink_target = on;
    }

    pub fn set_show_checksum(&mut self, on: bool) {
        self.mode.checksum = on;
    }

    /// Attach the stream that [`Formatter::next_line`] pulls from.
    pub fn bind(&mut self, stream: NodeStream) {
        self.input = Some(stream);
    }

    /// A byte reader over `stream`, rendered with this formatter's mode.
    pub fn reader(&self, stream: NodeStream) -> FormatReader {
        FormatReader::new(Formatter {
            mode: self.mode,
            input: Some(stream),
        })
    }

    /// Compose the display line for one node.
    pub fn render(&self, node: &Node) -> String {
        let mut text = if self.mode.checksum {
            node.checksum()
        } else {
            node.display_name().into_owned()
        };

        if self.mode.full_path {
            text.push(' ');
            text.push_str(&node.full_path().display().to_string());
        }

        if self.mode.prefix {
            text = format!("{}{}{}", node.prefix(), node.mark(), text);
        }

        if self.mode.decoration {
            text.push_str(node.decoration());
        }

        if self.mode.symlink_target && node.is_symlink() {
            text.push_str(" → ");
            text.push_str(&node.symlink_target());
        }

        text
    }

    /// Render the next node of the bound stream; `None` once it is drained.
    pub fn next_line(&mut self) -> Option<String> {
        let node = self.input.as_mut()?.next()?;
        Some(self.render(&node))
    }
}

impl Iterator for Formatter {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.next_line()
    }
}

impl fmt::Display for Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mode: {:08b}", self.mode.bits())
    }
}

/// Newline-terminated lines from a [`Formatter`], as a byte stream.
///
/// A line larger than the caller's buffer is handed out across several
/// reads.
#[derive(Debug)]
pub struct FormatReader {
    formatter: Formatter,
    pending: Vec<u8>,
    pos: usize,
}

impl FormatReader {
    fn new(formatter: Formatter) -> Self {
        Self {
            formatter,
            pending: Vec::new(),
            pos: 0,
        }
    }
}

impl Read for FormatReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        while self.pos >= self.pending.len() {
            let Some(line) = self.formatter.next_line() else {
                return Ok(0);
            };
            self.pending.clear();
            self.pending.extend_from_slice(line.as_bytes());
            self.pending.push(b'\n');
            self.pos = 0;
        }

        let n = buf.len().min(self.pending.len() - self.pos);
        buf[..n].copy_from_slice(&self.pending[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}
