//! Tree formatting and display
//!
//! This module turns the node stream into output:
//! - Text lines with optional tree drawing, decorations and checksums
//! - JSON lines
//!
//! # Module Structure
//!
//! - `config` - Display toggles
//! - `formatter` - Line formatter and byte reader
//! - `json` - JSON lines output
//! - `report` - Trailing directory/file summary
//! - `target` - Output destination selection

mod config;
mod formatter;
mod json;
mod report;
mod target;

// Re-export public types and functions
pub use config::FormatMode;
pub use formatter::{FormatReader, Formatter};
pub use json::{JsonNode, write_json_lines};
pub use report::write_report;
pub use target::OutputTarget;
