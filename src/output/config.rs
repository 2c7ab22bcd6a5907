//! Output configuration types

/// Display toggles for the line formatter. All off renders names only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatMode {
    /// Append the entry's full path after the name
    pub full_path: bool,
    /// Draw tree lines and branch marks
    pub prefix: bool,
    /// `ls -F` style type suffix
    pub decoration: bool,
    /// ` → target` after symbolic links
    pub symlink_target: bool,
    /// Replace the name with the SHA-1 of the contents
    pub checksum: bool,
    /// Owner and group columns. Reserved: kept in [`FormatMode::bits`] but
    /// not rendered.
    pub owner_group: bool,
    /// Permission bits column. Reserved, not rendered.
    pub permissions: bool,
    /// Size column. Reserved, not rendered.
    pub size: bool,
}

impl FormatMode {
    /// Pack the toggles into one byte, full path in the lowest bit.
    pub fn bits(&self) -> u8 {
        [
            self.full_path,
            self.prefix,
            self.decoration,
            self.symlink_target,
            self.checksum,
            self.owner_group,
            self.permissions,
            self.size,
        ]
        .iter()
        .enumerate()
        .fold(0u8, |acc, (bit, &on)| if on { acc | 1 << bit } else { acc })
    }
}
