//! Error types for flog operations.

use crate::identifiers::NodeId;
use thiserror::Error;

/// The main error type for flog operations.
///
/// Sink failures are not represented here one by one: they are recorded on
/// the node that owns the sink and surface to the caller of a print entry
/// point as a single [`FlogError::Output`] carrying the failure count.
#[derive(Error, Debug)]
pub enum FlogError {
    /// The target node does not exist or was destroyed
    #[error("Unknown log node: {0}")]
    UnknownNode(NodeId),

    /// A node was appended to itself as a child
    #[error("Cannot append log {node} to itself (causes circular dependency)")]
    SelfAppend {
        /// The node that was both parent and child
        node: NodeId,
    },

    /// A message had neither a message id nor text
    #[error("Null message rejected: a message needs a message id or text")]
    NullMessage,

    /// Formatting the message text failed
    #[error("Failed to format message text")]
    Format(#[from] std::fmt::Error),

    /// One or more outputs failed while dispatching a message
    #[error("{failures} output failure(s) while dispatching message")]
    Output {
        /// Number of failed sink invocations and forwarding errors
        failures: usize,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error (bad mask, type or id literal)
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Internal bug - should never happen in production
    #[error("Bug detected: {0}\n\nThis is an internal error in flog. Please report it.")]
    Bug(String),
}

/// A specialized Result type for flog operations.
pub type Result<T> = std::result::Result<T, FlogError>;

/// Helper macro to create and return a FlogError::Bug
///
/// This should be used for conditions that should never occur
/// in normal operation and indicate a bug in flog itself.
///
/// # Example
///
/// ```ignore
/// if slot_missing {
///     bug!("node {} vanished during dispatch", id);
/// }
/// ```
#[macro_export]
macro_rules! bug {
    ($msg:expr) => {
        return Err($crate::FlogError::Bug($msg.to_string()))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::FlogError::Bug(format!($fmt, $($arg)*)))
    };
}

/// Helper macro to bail out with a FlogError
///
/// This is used for expected error conditions. Without a variant the
/// error is reported as [`FlogError::Validation`].
///
/// # Example
///
/// ```ignore
/// if name.is_empty() {
///     bail!(Config, "log entry {} has no name", index);
/// }
/// ```
#[macro_export]
macro_rules! bail {
    ($variant:ident, $msg:expr) => {
        return Err($crate::FlogError::$variant($msg.to_string()))
    };
    ($variant:ident, $fmt:expr, $($arg:tt)*) => {
        return Err($crate::FlogError::$variant(format!($fmt, $($arg)*)))
    };
    ($msg:expr) => {
        return Err($crate::FlogError::Validation($msg.to_string()))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::FlogError::Validation(format!($fmt, $($arg)*)))
    };
}
