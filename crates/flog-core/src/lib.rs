//! # Flog Core
//!
//! Hierarchical message dispatch for the flog logging library.
//!
//! This crate provides:
//!
//! - **Log tree**: an arena of log nodes forwarding to each other
//! - **Dispatch**: filtering, relabelling, buffering and fan-out of messages
//! - **Printing**: entry points and macros that skip unused messages for free
//! - **Rendering**: human-readable lines with optional header fields
//! - **Outputs**: stdout, stderr, file and in-memory sinks
//! - **Configuration**: YAML descriptions of whole trees
//!
//! ## Example
//!
//! ```rust
//! use flog_core::{flog_print, LogTree, MsgType};
//!
//! let mut tree = LogTree::default();
//! let main = tree.create("main", MsgType::ACCEPT_ALL);
//! let console = tree.create_stderr("", MsgType::ACCEPT_ERROR_AND_WARNING);
//! tree.append_child(main, console).unwrap();
//!
//! flog_print!(tree, main, MsgType::WARNING, "startup", "config file missing").unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod macros;

pub mod config;
mod dispatch;
pub mod log;
pub mod output;
mod print;
pub mod render;
pub mod time;
pub mod tree;

// Re-export commonly used items
pub use config::{ConfiguredTree, TreeConfig};
pub use flog_types::{
    FlogConfig, FlogError, Message, MsgId, MsgIdTable, MsgType, NodeId, Result, SourceInfo,
};
pub use output::{Sink, SinkContext, SinkError};
pub use render::Renderer;
pub use tree::{LogNode, LogTree};

/// flog version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
