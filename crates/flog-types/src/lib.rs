//! # Flog Types
//!
//! Core types shared across the flog crates.
//!
//! This crate provides the fundamental building blocks of the flog logging
//! library:
//!
//! - Message type bitmasks and the predefined acceptance thresholds
//! - Message ids, including the errno range and the label table
//! - The [`Message`] value that travels through a log tree
//! - Configuration structures for messages, nodes and diagnostics
//! - Error types and result aliases
//!
//! ## Example
//!
//! ```
//! use flog_types::{Message, MsgId, MsgType};
//!
//! let msg = Message::new(MsgType::ERROR)
//!     .with_subsystem("net")
//!     .with_id(MsgId::CANNOT_OPEN_SOCKET);
//!
//! assert!(MsgType::ACCEPT_ERROR_AND_WARNING.accepts(msg.msg_type));
//! assert!(!msg.is_null());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod identifiers;
pub mod msg_type;
pub mod msg_table;
pub mod message;
pub mod config;

// Re-export common types for convenience
pub use errors::{FlogError, Result};
pub use identifiers::{MsgId, NodeId, ERRNO_RESERVED};
pub use msg_type::MsgType;
pub use msg_table::MsgIdTable;
pub use message::{Message, SourceInfo};
pub use config::{FlogConfig, LogConfig, LogFormat, OutputConfig, TracingConfig};
