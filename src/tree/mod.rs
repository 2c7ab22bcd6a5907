//! Directory tree walking logic
//!
//! `TreeWalker` visits a hierarchy depth-first and streams one [`Node`] per
//! accepted entry, in pre-order, over a zero-capacity channel. Rendering is
//! left to whoever consumes the [`NodeStream`].
//!
//! [`Node`]: crate::node::Node

mod config;
pub mod filter;
mod walker;

// Re-export public types
pub use config::WalkerConfig;
pub use filter::{Filter, FilterChain};
pub use walker::{NodeStream, TreeWalker};
