//! Configuration types and structures.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::msg_type::MsgType;

/// Settings that shape messages and their rendering.
///
/// Every toggle changes which fields a [`Message`](crate::Message) carries
/// or how it renders. None of them changes how messages are dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlogConfig {
    /// Capture a timestamp for every message
    pub timestamp: bool,
    /// Render timestamps with microsecond precision
    pub timestamp_usec: bool,
    /// Capture source file, line and function
    pub src_info: bool,
    /// Resolve table message ids to their labels
    pub msg_id_strings: bool,
    /// Resolve errno message ids to the OS error string
    pub errno_strings: bool,
    /// Prefix resolved message id labels with the numeric id
    pub show_msg_id: bool,
    /// Admit messages that have neither message id nor text
    pub allow_null_messages: bool,
    /// Treat empty subsystem and text strings as absent
    pub empty_string_to_null: bool,
}

impl Default for FlogConfig {
    fn default() -> Self {
        Self {
            timestamp: true,
            timestamp_usec: false,
            src_info: true,
            msg_id_strings: true,
            errno_strings: true,
            show_msg_id: true,
            allow_null_messages: false,
            empty_string_to_null: true,
        }
    }
}

/// Output attached to a configured log node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutputConfig {
    /// No sink; the node only filters, buffers and forwards
    None,
    /// Write rendered lines to stdout
    Stdout,
    /// Write rendered lines to stderr
    Stderr,
    /// Append rendered lines to a file
    File {
        /// Path of the log file
        #[serde(skip_serializing_if = "Option::is_none")]
        path: Option<PathBuf>,
    },
    /// Keep rendered lines in memory
    Memory,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig::None
    }
}

/// Configuration of one log node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Name of the log, used as its subsystem prefix
    pub name: String,
    /// Accepted message types
    #[serde(default = "default_accept")]
    pub accept: MsgType,
    /// Where accepted messages go
    #[serde(default)]
    pub output: OutputConfig,
    /// Maximum number of buffered messages (0 disables buffering)
    #[serde(default)]
    pub buffer_max: usize,
    /// Stop invoking the output after its first failure
    #[serde(default = "default_stop_on_error")]
    pub stop_on_error: bool,
    /// Name of the log receiving this log's internal errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_log: Option<String>,
    /// Names of the logs this log forwards to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
}

fn default_accept() -> MsgType {
    MsgType::ACCEPT_ALL
}

fn default_stop_on_error() -> bool {
    true
}

/// Configuration of flog's own diagnostics (tracing output).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracingConfig {
    /// Filter directive, e.g. `flog_core=debug`
    pub filter: String,
    /// Output format
    pub format: LogFormat,
    /// Write diagnostics to this file instead of stderr
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            filter: "flog_core=warn".to_string(),
            format: LogFormat::Pretty,
            file: None,
        }
    }
}

/// Diagnostic output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format with colors
    Pretty,
    /// JSON format for machine parsing
    Json,
    /// Compact single-line format
    Compact,
}
