//! Configuration types for tree walkers

/// Configuration for which entries a walker emits.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Show dot-entries
    pub show_all: bool,
    pub dirs_only: bool,
    /// Glob patterns matched against entry names; matches are skipped
    pub ignore_patterns: Vec<String>,
}
