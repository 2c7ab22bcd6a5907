//! JSON output formatting
//!
//! One JSON object per node, one node per line, written as the stream is
//! consumed.

use std::io::{self, Write};

use serde::Serialize;

use crate::node::{EntryKind, Node};

/// Serializable view of a [`Node`].
#[derive(Debug, Clone, Serialize)]
pub struct JsonNode {
    pub name: String,
    pub parent: String,
    pub path: String,
    pub kind: EntryKind,
    pub is_root: bool,
    pub is_last: bool,
}

impl From<&Node> for JsonNode {
    fn from(node: &Node) -> Self {
        Self {
            name: node.display_name().into_owned(),
            parent: node.parent().to_string_lossy().into_owned(),
            path: node.full_path().to_string_lossy().into_owned(),
            kind: node.kind(),
            is_root: node.is_root(),
            is_last: node.is_last(),
        }
    }
}

/// Write each node as a JSON line. Returns the number of nodes written.
pub fn write_json_lines<I, W>(nodes: I, sink: &mut W) -> io::Result<usize>
where
    I: IntoIterator<Item = Node>,
    W: Write + ?Sized,
{
    let mut written = 0;
    for node in nodes {
        serde_json::to_writer(&mut *sink, &JsonNode::from(&node))?;
        sink.write_all(b"\n")?;
        written += 1;
    }
    Ok(written)
}
