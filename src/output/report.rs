//! Trailing summary line

use std::io::{self, Write};
use std::time::Duration;

/// Write the blank line and `N directories, M files` summary.
///
/// The file count is omitted when zero. `elapsed` is appended in brackets
/// when given.
pub fn write_report<W: Write + ?Sized>(
    sink: &mut W,
    dir_count: usize,
    file_count: usize,
    elapsed: Option<Duration>,
) -> io::Result<()> {
    write!(sink, "\n{} directories", dir_count)?;
    if file_count > 0 {
        write!(sink, ", {} files", file_count)?;
    }
    if let Some(elapsed) = elapsed {
        write!(sink, " [{}]", humantime::format_duration(elapsed))?;
    }
    writeln!(sink)
}
