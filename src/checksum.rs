//! SHA-1 content checksums for the checksum display mode

use std::fs::File;
use std::io;
use std::path::Path;

use sha1::{Digest, Sha1};

/// Blank column as wide as a hex SHA-1 digest, used where no sum applies.
pub const CHECKSUM_PLACEHOLDER: &str = "                                        ";

/// Hash the full contents of `path`, rendered as lowercase hex.
pub fn sha1_hex(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha1::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}
