//! TreeWalker - depth-first traversal that streams nodes from a background thread

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread;

use crate::node::{BLANK, CONTINUATION, FileInfo, Node};

use super::config::WalkerConfig;
use super::filter::{self, FilterChain};

/// Directory and file totals shared with the producer thread.
#[derive(Debug, Default)]
struct Counters {
    dirs: AtomicUsize,
    files: AtomicUsize,
}

/// Depth-first tree walker.
///
/// Each call to [`TreeWalker::traverse`] spawns one producer thread which
/// hands nodes over a zero-capacity channel, so the walk never runs ahead
/// of the consumer. Counts accumulate across traversals until
/// [`TreeWalker::reset_counts`] is called.
#[derive(Debug, Default)]
pub struct TreeWalker {
    filters: FilterChain,
    counters: Arc<Counters>,
}

impl TreeWalker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a walker with the stock filters selected by `config`.
    pub fn from_config(config: &WalkerConfig) -> Self {
        let mut walker = Self::new();
        if !config.show_all {
            walker.add_filter(filter::hide_hidden());
        }
        if config.dirs_only {
            walker.add_filter(filter::dirs_only());
        }
        for pattern in &config.ignore_patterns {
            walker.add_filter(filter::ignore_pattern(pattern));
        }
        walker
    }

    /// Append a filter. Descendants are emitted only if every filter accepts
    /// them; the root is never filtered.
    pub fn add_filter<F>(&mut self, f: F)
    where
        F: Fn(&FileInfo) -> bool + Send + Sync + 'static,
    {
        self.filters.push(Arc::new(f));
    }

    /// `(directories, files)` emitted so far. Final once the stream is drained.
    pub fn counts(&self) -> (usize, usize) {
        (
            self.counters.dirs.load(Ordering::SeqCst),
            self.counters.files.load(Ordering::SeqCst),
        )
    }

    pub fn reset_counts(&self) {
        self.counters.dirs.store(0, Ordering::SeqCst);
        self.counters.files.store(0, Ordering::SeqCst);
    }

    /// Start walking `root` and return the stream of nodes in pre-order.
    ///
    /// Dropping the stream before it is drained stops the walk at its next
    /// emit.
    pub fn traverse(&self, root: impl AsRef<Path>) -> NodeStream {
        let (output, input) = mpsc::sync_channel(0);
        let walk = Walk {
            filters: self.filters.clone(),
            counters: Arc::clone(&self.counters),
            output,
        };
        let root = root.as_ref().to_path_buf();

        let spawned = thread::Builder::new()
            .name("arbor-walker".to_string())
            .spawn(move || walk.run(&root));
        if let Err(e) = spawned {
            // The sender went down with the closure, so the stream is just empty
            tracing::error!("failed to spawn walker thread: {}", e);
        }

        NodeStream { input }
    }
}

/// Receiving end of a traversal. Yields nodes until the walk completes.
#[derive(Debug)]
pub struct NodeStream {
    input: Receiver<Node>,
}

impl Iterator for NodeStream {
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        self.input.recv().ok()
    }
}

/// The consumer hung up.
struct Disconnected;

/// State owned by the producer thread for one traversal.
struct Walk {
    filters: FilterChain,
    counters: Arc<Counters>,
    output: SyncSender<Node>,
}

impl Walk {
    fn run(self, root: &Path) {
        if self.walk_root(root).is_err() {
            tracing::debug!(root = %root.display(), "node stream dropped, stopping traversal");
        }
    }

    fn walk_root(&self, root: &Path) -> Result<(), Disconnected> {
        let metadata = match fs::symlink_metadata(root) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(path = %root.display(), "failed to stat root: {}", e);
                return Ok(());
            }
        };

        let name = root.as_os_str().to_os_string();
        let info = FileInfo::new(name.clone(), metadata);
        let is_dir = info.is_dir();

        self.emit(Node::new(name, PathBuf::new(), "", true, false, info))?;
        if is_dir {
            self.walk_dir(root, "")?;
        }
        Ok(())
    }

    fn walk_dir(&self, dir: &Path, prefix: &str) -> Result<(), Disconnected> {
        let entries = match read_entries(dir) {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(path = %dir.display(), "failed to read directory: {}", e);
                return Ok(());
            }
        };

        let accepted: Vec<FileInfo> = entries
            .into_iter()
            .filter(|info| self.filters.accepts(info))
            .collect();
        let last_index = accepted.len().saturating_sub(1);

        for (i, info) in accepted.into_iter().enumerate() {
            let is_last = i == last_index;
            let is_dir = info.is_dir();
            let path = dir.join(&info.name);

            self.emit(Node::new(info.name.clone(), dir, prefix, false, is_last, info))?;

            if is_dir {
                let segment = if is_last { BLANK } else { CONTINUATION };
                self.walk_dir(&path, &format!("{}{}", prefix, segment))?;
            }
        }
        Ok(())
    }

    /// Hand a node to the consumer, then count it.
    fn emit(&self, node: Node) -> Result<(), Disconnected> {
        let counter = if node.is_dir() {
            &self.counters.dirs
        } else {
            &self.counters.files
        };
        self.output.send(node).map_err(|_| Disconnected)?;
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// List a directory without following symlinks, sorted by name.
///
/// Only a failure to open the directory fails the listing. Entries that
/// cannot be read, such as ones removed mid-listing, are skipped.
fn read_entries(dir: &Path) -> io::Result<Vec<FileInfo>> {
    let listing = fs::read_dir(dir)?.map(|entry| -> io::Result<FileInfo> {
        let entry = entry?;
        let metadata = entry.metadata()?;
        Ok(FileInfo::new(entry.file_name(), metadata))
    });
    Ok(keep_readable(dir, listing))
}

/// Drop and log the entries that failed, then sort the rest by name.
fn keep_readable(
    dir: &Path,
    listing: impl Iterator<Item = io::Result<FileInfo>>,
) -> Vec<FileInfo> {
    let mut infos: Vec<FileInfo> = listing
        .filter_map(|entry| match entry {
            Ok(info) => Some(info),
            Err(e) => {
                tracing::warn!(path = %dir.display(), "skipping unreadable entry: {}", e);
                None
            }
        })
        .collect();
    infos.sort_by(|a, b| a.name.cmp(&b.name));
    infos
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::symlink;
    use tempfile::TempDir;

    fn sample_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/b.txt"), "b").unwrap();
        dir
    }

    fn names(nodes: &[Node]) -> Vec<String> {
        nodes.iter().map(|n| n.display_name().into_owned()).collect()
    }

    #[test]
    fn test_preorder_sequence_and_counts() {
        let dir = sample_tree();
        let walker = TreeWalker::new();
        let nodes: Vec<Node> = walker.traverse(dir.path()).collect();

        let root = dir.path().to_string_lossy().into_owned();
        assert_eq!(names(&nodes), vec![root.as_str(), "a.txt", "sub", "b.txt"]);
        assert_eq!(walker.counts(), (2, 2));
    }

    #[test]
    fn test_root_flags() {
        let dir = sample_tree();
        let nodes: Vec<Node> = TreeWalker::new().traverse(dir.path()).collect();

        assert!(nodes[0].is_root());
        assert_eq!(nodes[0].mark(), "");
        assert_eq!(nodes[0].parent(), Path::new(""));
        assert!(nodes[1..].iter().all(|n| !n.is_root()));
    }

    #[test]
    fn test_exactly_one_last_per_listing() {
        let dir = sample_tree();
        fs::write(dir.path().join("sub/c.txt"), "c").unwrap();
        fs::create_dir(dir.path().join("sub/deeper")).unwrap();

        let nodes: Vec<Node> = TreeWalker::new().traverse(dir.path()).collect();
        let mut by_parent: std::collections::HashMap<PathBuf, Vec<&Node>> =
            std::collections::HashMap::new();
        for node in nodes.iter().filter(|n| !n.is_root()) {
            by_parent.entry(node.parent().to_path_buf()).or_default().push(node);
        }

        for (parent, siblings) in by_parent {
            let lasts: Vec<_> = siblings.iter().filter(|n| n.is_last()).collect();
            assert_eq!(lasts.len(), 1, "one last entry under {}", parent.display());
            assert!(siblings.last().unwrap().is_last());
        }
    }

    #[test]
    fn test_parent_and_prefix_propagation() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("a/inner")).unwrap();
        fs::create_dir_all(dir.path().join("z/inner")).unwrap();

        let nodes: Vec<Node> = TreeWalker::new().traverse(dir.path()).collect();
        let find = |name: &str, parent: &Path| {
            nodes
                .iter()
                .find(|n| n.name() == name && n.parent() == parent)
                .unwrap()
        };

        let a = find("a", dir.path());
        let z = find("z", dir.path());
        assert_eq!(a.prefix(), "");
        assert!(!a.is_last());
        assert!(z.is_last());

        assert_eq!(find("inner", dir.path().join("a").as_path()).prefix(), CONTINUATION);
        assert_eq!(find("inner", dir.path().join("z").as_path()).prefix(), BLANK);
    }

    #[test]
    fn test_sub_children_follow_sub() {
        let dir = sample_tree();
        let nodes: Vec<Node> = TreeWalker::new().traverse(dir.path()).collect();
        let sub = nodes.iter().position(|n| n.name() == "sub").unwrap();
        assert_eq!(nodes[sub + 1].name(), "b.txt");
        assert_eq!(nodes[sub + 1].parent(), dir.path().join("sub"));
    }

    #[test]
    fn test_root_bypasses_filters() {
        let dir = sample_tree();
        let mut walker = TreeWalker::new();
        walker.add_filter(|_: &FileInfo| false);

        let nodes: Vec<Node> = walker.traverse(dir.path()).collect();
        assert_eq!(nodes.len(), 1);
        assert!(nodes[0].is_root());
        assert_eq!(walker.counts(), (1, 0));
    }

    #[test]
    fn test_filter_shrinks_emitted_set() {
        let dir = sample_tree();
        fs::write(dir.path().join(".hidden"), "h").unwrap();

        let open = TreeWalker::new();
        let all: Vec<Node> = open.traverse(dir.path()).collect();

        let mut filtered = TreeWalker::new();
        filtered.add_filter(filter::hide_hidden());
        filtered.add_filter(filter::dirs_only());
        let some: Vec<Node> = filtered.traverse(dir.path()).collect();

        assert!(some.len() < all.len());
        for node in &some {
            assert!(all.iter().any(|n| n.full_path() == node.full_path()));
        }
        assert_eq!(names(&some)[1..], ["sub"]);
        assert!(some[1].is_last());
    }

    #[test]
    fn test_last_flag_after_filtering() {
        let dir = sample_tree();
        fs::write(dir.path().join("zzz.log"), "z").unwrap();

        let mut walker = TreeWalker::new();
        walker.add_filter(filter::ignore_pattern("*.log"));
        let nodes: Vec<Node> = walker.traverse(dir.path()).collect();

        let sub = nodes.iter().find(|n| n.name() == "sub").unwrap();
        assert!(sub.is_last());
        assert!(nodes.iter().all(|n| n.name() != "zzz.log"));
    }

    #[test]
    fn test_counts_match_emitted_nodes() {
        let dir = sample_tree();
        fs::create_dir_all(dir.path().join("x/y/z")).unwrap();
        fs::write(dir.path().join("x/y/z/f"), "f").unwrap();

        let walker = TreeWalker::new();
        let emitted = walker.traverse(dir.path()).count();
        let (dirs, files) = walker.counts();
        assert_eq!(dirs + files, emitted);
    }

    #[test]
    fn test_counts_accumulate_across_roots() {
        let first = sample_tree();
        let second = sample_tree();

        let walker = TreeWalker::new();
        walker.traverse(first.path()).for_each(drop);
        walker.traverse(second.path()).for_each(drop);
        assert_eq!(walker.counts(), (4, 4));

        walker.reset_counts();
        assert_eq!(walker.counts(), (0, 0));
    }

    #[test]
    fn test_traversal_is_repeatable() {
        let dir = sample_tree();
        let walker = TreeWalker::new();
        let triples = |nodes: Vec<Node>| {
            nodes
                .into_iter()
                .map(|n| (n.name().to_os_string(), n.parent().to_path_buf(), n.is_last()))
                .collect::<Vec<_>>()
        };

        let first = triples(walker.traverse(dir.path()).collect());
        let second = triples(walker.traverse(dir.path()).collect());
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_root_yields_empty_stream() {
        let dir = TempDir::new().unwrap();
        let walker = TreeWalker::new();
        let nodes: Vec<Node> = walker.traverse(dir.path().join("missing")).collect();
        assert!(nodes.is_empty());
        assert_eq!(walker.counts(), (0, 0));
    }

    #[test]
    fn test_file_root() {
        let dir = sample_tree();
        let walker = TreeWalker::new();
        let nodes: Vec<Node> = walker.traverse(dir.path().join("a.txt")).collect();
        assert_eq!(nodes.len(), 1);
        assert!(nodes[0].is_root());
        assert_eq!(walker.counts(), (0, 1));
    }

    #[test]
    fn test_symlinked_directory_is_not_followed() {
        let dir = sample_tree();
        symlink(dir.path().join("sub"), dir.path().join("link")).unwrap();
        symlink("..", dir.path().join("sub/up")).unwrap();

        let walker = TreeWalker::new();
        let nodes: Vec<Node> = walker.traverse(dir.path()).collect();
        let link = nodes.iter().find(|n| n.name() == "link").unwrap();
        assert!(link.is_symlink());
        assert!(nodes.iter().all(|n| n.parent() != dir.path().join("link")));
        assert_eq!(nodes.len(), 6);
    }

    #[test]
    fn test_unreadable_directory_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let dir = sample_tree();
        fs::create_dir(dir.path().join("locked")).unwrap();
        fs::write(dir.path().join("locked/secret"), "s").unwrap();
        fs::set_permissions(dir.path().join("locked"), fs::Permissions::from_mode(0o000)).unwrap();

        if fs::read_dir(dir.path().join("locked")).is_ok() {
            // Running with privileges that ignore permission bits
            fs::set_permissions(dir.path().join("locked"), fs::Permissions::from_mode(0o755))
                .unwrap();
            return;
        }

        let nodes: Vec<Node> = TreeWalker::new().traverse(dir.path()).collect();
        fs::set_permissions(dir.path().join("locked"), fs::Permissions::from_mode(0o755)).unwrap();

        assert!(nodes.iter().any(|n| n.name() == "locked"));
        assert!(nodes.iter().all(|n| n.name() != "secret"));
        assert!(nodes.iter().any(|n| n.name() == "b.txt"));
    }

    #[test]
    fn test_dropping_stream_stops_walker() {
        let dir = sample_tree();
        let walker = TreeWalker::new();
        let mut stream = walker.traverse(dir.path());
        assert!(stream.next().unwrap().is_root());
        drop(stream);

        // The producer must notice the hang-up rather than block forever;
        // a fresh traversal on the same walker still completes.
        let nodes: Vec<Node> = walker.traverse(dir.path()).collect();
        assert_eq!(nodes.len(), 4);
    }

    #[test]
    fn test_from_config() {
        let dir = sample_tree();
        fs::write(dir.path().join(".env"), "x").unwrap();
        fs::write(dir.path().join("notes.md"), "x").unwrap();

        let config = WalkerConfig {
            ignore_patterns: vec!["*.md".to_string()],
            ..Default::default()
        };
        let nodes: Vec<Node> = TreeWalker::from_config(&config).traverse(dir.path()).collect();
        let seen = names(&nodes);
        assert!(!seen.iter().any(|n| n == ".env"));
        assert!(!seen.iter().any(|n| n == "notes.md"));
        assert!(seen.iter().any(|n| n == "a.txt"));

        let config = WalkerConfig {
            show_all: true,
            dirs_only: true,
            ..Default::default()
        };
        let nodes: Vec<Node> = TreeWalker::from_config(&config).traverse(dir.path()).collect();
        assert_eq!(names(&nodes)[1..], ["sub"]);
    }

    #[test]
    fn test_non_utf8_directory_is_descended() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        let bad = dir.path().join(OsStr::from_bytes(b"bad\xffdir"));
        fs::create_dir(&bad).unwrap();
        fs::write(bad.join("inside.txt"), "i").unwrap();
        fs::write(dir.path().join(OsStr::from_bytes(b"bad\xfffile")), "f").unwrap();

        let walker = TreeWalker::new();
        let nodes: Vec<Node> = walker.traverse(dir.path()).collect();

        let inside = nodes.iter().find(|n| n.name() == "inside.txt").unwrap();
        assert_eq!(inside.parent(), bad.as_path());
        assert_eq!(inside.full_path(), bad.join("inside.txt"));
        assert_eq!(walker.counts(), (2, 2));
    }

    #[test]
    fn test_unreadable_entry_skips_only_itself() {
        let dir = sample_tree();
        let info = |name: &str| {
            FileInfo::new(name, fs::symlink_metadata(dir.path().join(name)).unwrap())
        };
        let listing = vec![
            Ok(info("sub")),
            Err(io::Error::from(io::ErrorKind::NotFound)),
            Ok(info("a.txt")),
        ];

        let kept = keep_readable(dir.path(), listing.into_iter());
        let kept: Vec<_> = kept.iter().map(|i| i.display_name().into_owned()).collect();
        assert_eq!(kept, ["a.txt", "sub"]);
    }
}
