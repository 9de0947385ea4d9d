//! Type-safe identifiers for log nodes and message ids.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::errors::{FlogError, Result};

/// Handle to a log node stored in a `LogTree` arena.
///
/// Ids are slot indices. Slots are never reused, so an id that outlived its
/// node can only ever resolve to "unknown", never to a different node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Wrap a raw arena index.
    pub const fn from_raw(index: usize) -> Self {
        Self(index)
    }

    /// The raw arena index.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Number of message ids reserved for passing platform errno values.
///
/// Ids below this value are OS error numbers, ids at or above it index the
/// message id label table.
pub const ERRNO_RESERVED: u32 = 8000;

/// A message id classifying a message independently of its free text.
///
/// `0` means "no id". Values in `1..8000` alias platform error codes and are
/// rendered with the OS error string; values from `8000` upward index a
/// [`MsgIdTable`](crate::MsgIdTable).
///
/// # Example
///
/// ```
/// use flog_types::MsgId;
///
/// assert!(MsgId::NONE.is_none());
/// assert!(MsgId::errno(2).is_errno());
/// assert_eq!(MsgId::MARK.table_index(), Some(1));
/// assert_eq!("assertion-failed".parse::<MsgId>().unwrap(), MsgId::ASSERTION_FAILED);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MsgId(u32);

impl MsgId {
    /// No message id
    pub const NONE: MsgId = MsgId(0);
    /// Lower bound of the label table, labelled "none"
    pub const LOWER_BOUND: MsgId = MsgId(ERRNO_RESERVED);

    /// Mark
    pub const MARK: MsgId = MsgId(ERRNO_RESERVED + 1);
    /// Assertion failed
    pub const ASSERTION_FAILED: MsgId = MsgId(ERRNO_RESERVED + 2);
    /// Function start
    pub const FUNCTION_START: MsgId = MsgId(ERRNO_RESERVED + 3);
    /// Function end
    pub const FUNCTION_END: MsgId = MsgId(ERRNO_RESERVED + 4);

    /// Cannot read from stdin
    pub const CANNOT_READ_FROM_STDIN: MsgId = MsgId(ERRNO_RESERVED + 5);
    /// Cannot read from file
    pub const CANNOT_READ_FILE: MsgId = MsgId(ERRNO_RESERVED + 6);
    /// Cannot open socket
    pub const CANNOT_OPEN_SOCKET: MsgId = MsgId(ERRNO_RESERVED + 7);

    /// Cannot write to stdout
    pub const CANNOT_WRITE_TO_STDOUT: MsgId = MsgId(ERRNO_RESERVED + 8);
    /// Cannot write to stderr
    pub const CANNOT_WRITE_TO_STDERR: MsgId = MsgId(ERRNO_RESERVED + 9);

    /// Cannot open file
    pub const CANNOT_OPEN_FILE: MsgId = MsgId(ERRNO_RESERVED + 10);
    /// Cannot write to file
    pub const CANNOT_WRITE_FILE: MsgId = MsgId(ERRNO_RESERVED + 11);
    /// Please set output file
    pub const SET_OUTPUT_FILE: MsgId = MsgId(ERRNO_RESERVED + 12);

    /// Forwarding cycle detected
    pub const FORWARDING_CYCLE: MsgId = MsgId(ERRNO_RESERVED + 13);

    /// Create a message id from its raw value.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Create a message id carrying a platform errno value.
    pub const fn errno(code: u32) -> Self {
        Self(code)
    }

    /// The raw numeric value.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Whether this is the "no id" value.
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Whether this id aliases a platform errno value.
    pub const fn is_errno(self) -> bool {
        self.0 != 0 && self.0 < ERRNO_RESERVED
    }

    /// Index into the label table, if this id is in the table range.
    pub fn table_index(self) -> Option<usize> {
        self.0
            .checked_sub(ERRNO_RESERVED)
            .map(|offset| offset as usize)
    }
}

impl From<u32> for MsgId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for MsgId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MsgId {
    type Err = FlogError;

    /// Parse a raw number or the kebab-case name of a built-in id.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(raw) = s.parse::<u32>() {
            return Ok(Self(raw));
        }
        crate::msg_table::builtin_by_key(s)
            .ok_or_else(|| FlogError::Validation(format!("Invalid message id: {}", s)))
    }
}
