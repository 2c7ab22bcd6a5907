//! Arbor - render a directory hierarchy as an indented text tree

pub mod checksum;
pub mod error;
pub mod node;
pub mod output;
pub mod tree;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use error::{Result, TreeError};
pub use node::{EntryKind, FileInfo, Node};
pub use output::{
    FormatMode, FormatReader, Formatter, JsonNode, OutputTarget, write_json_lines, write_report,
};
pub use tree::{Filter, FilterChain, NodeStream, TreeWalker, WalkerConfig};
