//! Message types and acceptance masks.
//!
//! A [`MsgType`] is a bitmask. A message is normally tagged with a single bit,
//! while a log node accepts any OR-combination of bits. A node acts on a
//! message when the two share at least one bit.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};
use std::str::FromStr;
use crate::errors::{FlogError, Result};

/// Message type bitmask.
///
/// # Example
///
/// ```
/// use flog_types::MsgType;
///
/// let mask = MsgType::ERROR | MsgType::WARNING;
/// assert!(mask.accepts(MsgType::WARNING));
/// assert!(!mask.accepts(MsgType::INFO));
/// assert_eq!("error|warning".parse::<MsgType>().unwrap(), mask);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MsgType(u8);

/// Severity-ordered single-bit types with their canonical names.
const NAMED: [(MsgType, &str); 8] = [
    (MsgType::CRITICAL, "critical"),
    (MsgType::ERROR, "error"),
    (MsgType::WARNING, "warning"),
    (MsgType::NOTE, "note"),
    (MsgType::INFO, "info"),
    (MsgType::VERBOSE, "verbose"),
    (MsgType::DEBUG, "debug"),
    (MsgType::DEEP_DEBUG, "deep-debug"),
];

impl MsgType {
    /// Nothing; never accepted by any mask
    pub const NONE: MsgType = MsgType(0x00);
    /// Critical error
    pub const CRITICAL: MsgType = MsgType(0x01);
    /// Error
    pub const ERROR: MsgType = MsgType(0x02);
    /// Warning
    pub const WARNING: MsgType = MsgType(0x04);
    /// Important note
    pub const NOTE: MsgType = MsgType(0x08);
    /// Information
    pub const INFO: MsgType = MsgType(0x10);
    /// Information shown in verbose mode
    pub const VERBOSE: MsgType = MsgType(0x20);
    /// Debug information
    pub const DEBUG: MsgType = MsgType(0x40);
    /// Debug information about flog itself
    pub const DEEP_DEBUG: MsgType = MsgType(0x80);

    /// Only critical errors
    pub const ACCEPT_ONLY_CRITICAL: MsgType = MsgType(0x01);
    /// Critical errors and errors
    pub const ACCEPT_ONLY_ERROR: MsgType = MsgType(0x03);
    /// Errors and warnings
    pub const ACCEPT_ERROR_AND_WARNING: MsgType = MsgType(0x07);
    /// Errors, warnings and notes
    pub const ACCEPT_IMPORTANT_NOTES: MsgType = MsgType(0x0f);
    /// Everything up to info
    pub const ACCEPT_INFO: MsgType = MsgType(0x1f);
    /// Everything up to verbose info
    pub const ACCEPT_VERBOSE_INFO: MsgType = MsgType(0x3f);
    /// Everything up to debug
    pub const ACCEPT_ALL: MsgType = MsgType(0x7f);
    /// Everything, flog's own debug messages included
    pub const ACCEPT_DEEP_DEBUG: MsgType = MsgType(0xff);

    /// Create a mask from raw bits.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// The raw bits.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// OR a set of masks together.
    pub fn combine(masks: &[MsgType]) -> MsgType {
        masks.iter().fold(MsgType::NONE, |acc, m| acc | *m)
    }

    /// Whether a node with this accepted mask acts on a message of type `ty`.
    pub const fn accepts(self, ty: MsgType) -> bool {
        self.0 & ty.0 != 0
    }

    /// Whether no bit is set.
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Whether exactly one bit is set.
    pub const fn is_single(self) -> bool {
        self.0.count_ones() == 1
    }

    /// Label used when rendering a message of this type.
    ///
    /// Info and verbose messages carry no label, neither do combined masks.
    pub fn label(self) -> &'static str {
        match self {
            MsgType::CRITICAL => "Critical",
            MsgType::ERROR => "Error",
            MsgType::WARNING => "Warning",
            MsgType::NOTE => "!",
            MsgType::DEBUG => "Debug",
            MsgType::DEEP_DEBUG => "Deep debug",
            _ => "",
        }
    }

    /// Canonical name of a single-bit type.
    pub fn name(self) -> Option<&'static str> {
        NAMED.iter().find(|(ty, _)| *ty == self).map(|(_, name)| *name)
    }

    /// The single-bit types contained in this mask, in severity order.
    pub fn types(self) -> impl Iterator<Item = MsgType> {
        NAMED
            .iter()
            .map(|(ty, _)| *ty)
            .filter(move |ty| self.accepts(*ty))
    }

    /// Every single-bit type in severity order.
    pub fn all() -> impl Iterator<Item = MsgType> {
        NAMED.iter().map(|(ty, _)| *ty)
    }

    fn parse_token(token: &str) -> Result<MsgType> {
        let lower = token.trim().to_lowercase();
        let ty = match lower.replace('_', "-").as_str() {
            "none" | "nothing" => MsgType::NONE,
            "crit" | "critical" => MsgType::CRITICAL,
            "err" | "error" => MsgType::ERROR,
            "warn" | "warning" | "alert" => MsgType::WARNING,
            "note" | "notify" | "imp" | "important" => MsgType::NOTE,
            "info" | "information" | "msg" | "message" => MsgType::INFO,
            "vinfo" | "verbose" => MsgType::VERBOSE,
            "debug" => MsgType::DEBUG,
            "deep-debug" | "deepdebug" | "flog-debug" => MsgType::DEEP_DEBUG,
            "accept-only-critical" => MsgType::ACCEPT_ONLY_CRITICAL,
            "accept-only-error" => MsgType::ACCEPT_ONLY_ERROR,
            "accept-error-and-warning" => MsgType::ACCEPT_ERROR_AND_WARNING,
            "accept-important-notes" | "accept-important-note" => MsgType::ACCEPT_IMPORTANT_NOTES,
            "accept-info" => MsgType::ACCEPT_INFO,
            "accept-verbose-info" => MsgType::ACCEPT_VERBOSE_INFO,
            "accept-all" | "all" => MsgType::ACCEPT_ALL,
            "accept-deep-debug" | "accept-flog-debug" | "everything" => MsgType::ACCEPT_DEEP_DEBUG,
            other => {
                let parsed = match other.strip_prefix("0x") {
                    Some(hex) => u8::from_str_radix(hex, 16),
                    None => other.parse::<u8>(),
                };
                parsed.map(MsgType).map_err(|_| {
                    FlogError::Validation(format!("Invalid message type: {}", token.trim()))
                })?
            }
        };
        Ok(ty)
    }
}

impl BitOr for MsgType {
    type Output = MsgType;

    fn bitor(self, rhs: MsgType) -> MsgType {
        MsgType(self.0 | rhs.0)
    }
}

impl BitOrAssign for MsgType {
    fn bitor_assign(&mut self, rhs: MsgType) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for MsgType {
    type Output = MsgType;

    fn bitand(self, rhs: MsgType) -> MsgType {
        MsgType(self.0 & rhs.0)
    }
}

impl FromStr for MsgType {
    type Err = FlogError;

    /// Parse a type name, a threshold name, a number, or a `|`/`,` separated
    /// combination of those.
    fn from_str(s: &str) -> Result<Self> {
        if s.trim().is_empty() {
            return Err(FlogError::Validation("Empty message type".to_string()));
        }
        s.split(|c| c == '|' || c == ',')
            .map(MsgType::parse_token)
            .try_fold(MsgType::NONE, |acc, ty| Ok(acc | ty?))
    }
}

impl fmt::Display for MsgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            return write!(f, "none");
        }
        let mut first = true;
        for (ty, name) in NAMED.iter() {
            if self.accepts(*ty) {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{}", name)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl TryFrom<String> for MsgType {
    type Error = FlogError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<MsgType> for String {
    fn from(ty: MsgType) -> Self {
        ty.to_string()
    }
}
