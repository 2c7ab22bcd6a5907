//! Entry filters for tree walking

use std::fmt;
use std::sync::Arc;

use glob::Pattern;

use crate::node::FileInfo;

/// Predicate over an entry's name and metadata. `true` keeps the entry.
pub type Filter = Arc<dyn Fn(&FileInfo) -> bool + Send + Sync>;

/// Ordered conjunction of filters.
///
/// An entry passes only if every filter accepts it; evaluation stops at the
/// first rejection.
#[derive(Clone, Default)]
pub struct FilterChain {
    filters: Vec<Filter>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, filter: Filter) {
        self.filters.push(filter);
    }

    pub fn accepts(&self, info: &FileInfo) -> bool {
        self.filters.iter().all(|f| f(info))
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterChain")
            .field("filters", &self.filters.len())
            .finish()
    }
}

/// Reject dot-entries.
pub fn hide_hidden() -> impl Fn(&FileInfo) -> bool + Send + Sync + 'static {
    |info: &FileInfo| !info.name.as_encoded_bytes().starts_with(b".")
}

/// Keep directories only.
pub fn dirs_only() -> impl Fn(&FileInfo) -> bool + Send + Sync + 'static {
    |info: &FileInfo| info.is_dir()
}

/// Reject entries whose name matches a glob pattern.
///
/// An invalid pattern is logged and matches nothing.
pub fn ignore_pattern(pattern: &str) -> impl Fn(&FileInfo) -> bool + Send + Sync + 'static {
    let compiled = match Pattern::new(pattern) {
        Ok(p) => Some(p),
        Err(e) => {
            tracing::warn!("invalid ignore pattern '{}': {}", pattern, e);
            None
        }
    };
    move |info: &FileInfo| {
        !compiled
            .as_ref()
            .is_some_and(|p| p.matches(&info.display_name()))
    }
}
