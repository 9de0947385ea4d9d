//! Rendering of messages into human-readable lines.
//!
//! A rendered line has the shape `"[header] content\n"`:
//!
//! - the header joins timestamp, source info and subsystem with spaces
//! - the content joins type label, message id label and text with `": "`
//!
//! Either part is dropped when empty, so a line never contains `[]` or a
//! dangling separator. A message with neither header nor content renders to
//! nothing at all.

use flog_types::{FlogConfig, Message, MsgId, MsgIdTable, MsgType, SourceInfo};
use chrono::{DateTime, Local};
use crate::time;

/// Renders messages according to a [`FlogConfig`] and a [`MsgIdTable`].
#[derive(Debug, Clone, Copy)]
pub struct Renderer<'a> {
    config: &'a FlogConfig,
    ids: &'a MsgIdTable,
}

impl<'a> Renderer<'a> {
    /// Create a renderer.
    pub fn new(config: &'a FlogConfig, ids: &'a MsgIdTable) -> Self {
        Self { config, ids }
    }

    /// The settings this renderer follows.
    pub fn config(&self) -> &'a FlogConfig {
        self.config
    }

    /// Render a complete line, trailing newline included.
    pub fn render(&self, msg: &Message) -> Option<String> {
        match (self.header(msg), self.content(msg)) {
            (Some(header), Some(content)) => Some(format!("[{}] {}\n", header, content)),
            (Some(header), None) => Some(format!("[{}]\n", header)),
            (None, Some(content)) => Some(format!("{}\n", content)),
            (None, None) => None,
        }
    }

    /// Timestamp, source info and subsystem joined by spaces.
    pub fn header(&self, msg: &Message) -> Option<String> {
        let parts = [
            msg.timestamp.as_ref().map(|ts| self.timestamp(ts)),
            msg.source.as_ref().and_then(source_info),
            msg.subsystem.clone(),
        ];
        join_present(parts, " ")
    }

    /// Type label, message id label and text joined by `": "`.
    pub fn content(&self, msg: &Message) -> Option<String> {
        let parts = [
            msg_type(msg.msg_type).map(str::to_string),
            self.msg_id(msg.msg_id),
            msg.text.clone(),
        ];
        join_present(parts, ": ")
    }

    /// Timestamp text, with microseconds when configured.
    pub fn timestamp(&self, ts: &DateTime<Local>) -> String {
        time::format_timestamp(ts, self.config.timestamp_usec)
    }

    /// Label for a message id.
    ///
    /// Ids at or above the errno reservation resolve through the label
    /// table, lower ids through the OS error strings. Resolution can be
    /// switched off per range, in which case only the number is shown.
    pub fn msg_id(&self, id: MsgId) -> Option<String> {
        if id.is_none() {
            return None;
        }

        if id.is_errno() {
            if !self.config.errno_strings {
                return Some(format!("({})", id));
            }
            let text = errno_string(id.raw());
            return Some(self.with_number(id, &text));
        }

        let label = if self.config.msg_id_strings {
            self.ids.label(id)
        } else {
            None
        };
        Some(match label {
            Some(label) => self.with_number(id, label),
            None => id.to_string(),
        })
    }

    fn with_number(&self, id: MsgId, label: &str) -> String {
        if self.config.show_msg_id {
            format!("({}) {}", id, label)
        } else {
            label.to_string()
        }
    }
}

/// Label for a message type, `None` when the type carries no label.
pub fn msg_type(ty: MsgType) -> Option<&'static str> {
    Some(ty.label()).filter(|label| !label.is_empty())
}

/// Source location as `file:line|function()`, omitting missing parts.
pub fn source_info(src: &SourceInfo) -> Option<String> {
    let mut out = String::new();
    if let Some(file) = src.file {
        out.push_str(file);
    }
    if let Some(line) = src.line {
        out.push_str(&format!(":{}", line));
    }
    if let Some(function) = src.function {
        if !out.is_empty() {
            out.push('|');
        }
        out.push_str(function);
        out.push_str("()");
    }
    Some(out).filter(|s| !s.is_empty())
}

/// OS error string for an errno value, without Rust's `(os error N)` suffix.
pub fn errno_string(code: u32) -> String {
    let full = std::io::Error::from_raw_os_error(code as i32).to_string();
    let suffix = format!(" (os error {})", code);
    match full.strip_suffix(&suffix) {
        Some(stripped) => stripped.to_string(),
        None => full,
    }
}

fn join_present<const N: usize>(parts: [Option<String>; N], sep: &str) -> Option<String> {
    let present: Vec<String> = parts
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect();
    if present.is_empty() {
        None
    } else {
        Some(present.join(sep))
    }
}
