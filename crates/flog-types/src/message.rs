//! The message value passed through a log tree.

use chrono::{DateTime, Local};
use serde::Serialize;
use crate::config::FlogConfig;
use crate::errors::{FlogError, Result};
use crate::identifiers::MsgId;
use crate::msg_type::MsgType;

/// Where in the program a message was printed from.
///
/// Every part is optional; rendering omits what is missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SourceInfo {
    /// Source file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<&'static str>,
    /// Line within the file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    /// Enclosing function
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<&'static str>,
}

impl SourceInfo {
    /// Source info with every part present.
    pub fn new(file: &'static str, line: u32, function: &'static str) -> Self {
        Self {
            file: Some(file),
            line: Some(line),
            function: Some(function),
        }
    }

    /// Source info from a caller location, without a function name.
    pub fn from_location(location: &'static std::panic::Location<'static>) -> Self {
        Self {
            file: Some(location.file()),
            line: Some(location.line()),
            function: None,
        }
    }

    /// Whether nothing is known about the source.
    pub fn is_empty(&self) -> bool {
        self.file.is_none() && self.line.is_none() && self.function.is_none()
    }
}

/// One log event.
///
/// Built once per print call and cloned as it descends a log tree; every
/// node relabels its own copy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    /// Type of message
    pub msg_type: MsgType,
    /// Subsystem which is outputting the message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subsystem: Option<String>,
    /// Where the message was printed from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceInfo>,
    /// When the message was created
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Local>>,
    /// Message id, [`MsgId::NONE`] when absent
    pub msg_id: MsgId,
    /// Free text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Message {
    /// A bare message of the given type with every optional field empty.
    pub fn new(msg_type: MsgType) -> Self {
        Self {
            msg_type,
            subsystem: None,
            source: None,
            timestamp: None,
            msg_id: MsgId::NONE,
            text: None,
        }
    }

    /// Build a message the way the print entry points do.
    ///
    /// The config decides which optional fields are captured and whether a
    /// message without id and text is admissible.
    ///
    /// # Errors
    ///
    /// Returns [`FlogError::NullMessage`] when the message has neither id nor
    /// text and null messages are not allowed.
    pub fn create(
        config: &FlogConfig,
        msg_type: MsgType,
        subsystem: Option<&str>,
        msg_id: MsgId,
        text: Option<&str>,
        source: Option<SourceInfo>,
    ) -> Result<Self> {
        let normalize = |s: Option<&str>| match s {
            Some(s) if s.is_empty() && config.empty_string_to_null => None,
            other => other.map(str::to_string),
        };

        let text = normalize(text);
        if !config.allow_null_messages && msg_id.is_none() && text.is_none() {
            return Err(FlogError::NullMessage);
        }

        Ok(Self {
            msg_type,
            subsystem: normalize(subsystem),
            source: if config.src_info {
                source.filter(|s| !s.is_empty())
            } else {
                None
            },
            timestamp: config.timestamp.then(Local::now),
            msg_id,
            text,
        })
    }

    /// Set the subsystem.
    pub fn with_subsystem(mut self, subsystem: impl Into<String>) -> Self {
        self.subsystem = Some(subsystem.into());
        self
    }

    /// Set the message id.
    pub fn with_id(mut self, msg_id: MsgId) -> Self {
        self.msg_id = msg_id;
        self
    }

    /// Set the free text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set the source location.
    pub fn with_source(mut self, source: SourceInfo) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the timestamp.
    pub fn with_timestamp(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Prefix the subsystem with a node name.
    ///
    /// `"{prefix}/{subsystem}"` when a subsystem is present, otherwise just
    /// the prefix.
    pub fn relabel(&mut self, prefix: &str) {
        self.subsystem = Some(match self.subsystem.take() {
            Some(subsystem) => format!("{}/{}", prefix, subsystem),
            None => prefix.to_string(),
        });
    }

    /// Whether the message carries neither id nor text.
    pub fn is_null(&self) -> bool {
        self.msg_id.is_none() && self.text.is_none()
    }
}
