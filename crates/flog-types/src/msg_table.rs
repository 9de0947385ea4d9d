//! Human-readable labels for message ids at or above the errno reservation.

use std::borrow::Cow;
use crate::identifiers::{MsgId, ERRNO_RESERVED};

/// Built-in labels in id order, starting at [`MsgId::LOWER_BOUND`].
///
/// Each entry is `(key, label)`; the key is the kebab-case name accepted
/// by `MsgId::from_str`.
const BUILTIN: &[(&str, &str)] = &[
    ("none", "none"),
    // Used internally by flog
    ("mark", "Mark"),
    ("assertion-failed", "Assertion failed"),
    ("function-start", "Function start"),
    ("function-end", "Function end"),
    // Extended
    ("cannot-read-from-stdin", "Cannot read from stdin"),
    ("cannot-read-file", "Cannot read from file"),
    ("cannot-open-socket", "Cannot open socket"),
    // stdio output
    ("cannot-write-to-stdout", "Cannot write to stdout"),
    ("cannot-write-to-stderr", "Cannot write to stderr"),
    // file output
    ("cannot-open-file", "Cannot open file"),
    ("cannot-write-file", "Cannot write to file"),
    ("set-output-file", "Please set output file"),
    // dispatch
    ("forwarding-cycle", "Forwarding cycle detected"),
];

pub(crate) fn builtin_by_key(key: &str) -> Option<MsgId> {
    BUILTIN
        .iter()
        .position(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|index| MsgId::new(ERRNO_RESERVED + index as u32))
}

/// Index-by-id table of message id labels.
///
/// The built-in entries are always present; an integrating application
/// appends its own with [`MsgIdTable::register`] and keeps the returned ids.
///
/// # Example
///
/// ```
/// use flog_types::{MsgId, MsgIdTable};
///
/// let mut table = MsgIdTable::new();
/// let id = table.register("Sensor offline");
/// assert_eq!(table.label(id), Some("Sensor offline"));
/// assert_eq!(table.label(MsgId::MARK), Some("Mark"));
/// ```
#[derive(Debug, Clone)]
pub struct MsgIdTable {
    custom: Vec<Cow<'static, str>>,
}

impl MsgIdTable {
    /// Create a table holding only the built-in labels.
    pub fn new() -> Self {
        Self { custom: Vec::new() }
    }

    /// Append a custom label and return the id assigned to it.
    pub fn register(&mut self, label: impl Into<Cow<'static, str>>) -> MsgId {
        self.custom.push(label.into());
        MsgId::new(ERRNO_RESERVED + (self.len() - 1) as u32)
    }

    /// Look up the label for an id in the table range.
    ///
    /// Returns `None` for ids below the reservation and for ids past the end
    /// of the table.
    pub fn label(&self, id: MsgId) -> Option<&str> {
        let index = id.table_index()?;
        match BUILTIN.get(index) {
            Some((_, label)) => Some(*label),
            None => self
                .custom
                .get(index - BUILTIN.len())
                .map(|label| label.as_ref()),
        }
    }

    /// Total number of entries, the "none" entry included.
    pub fn len(&self) -> usize {
        BUILTIN.len() + self.custom.len()
    }

    /// Always false: the built-in entries cannot be removed.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// One past the highest id currently in the table.
    pub fn upper_bound(&self) -> MsgId {
        MsgId::new(ERRNO_RESERVED + self.len() as u32)
    }
}

impl Default for MsgIdTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_labels_match_constants() {
        let table = MsgIdTable::new();
        assert_eq!(table.label(MsgId::LOWER_BOUND), Some("none"));
        assert_eq!(table.label(MsgId::MARK), Some("Mark"));
        assert_eq!(table.label(MsgId::ASSERTION_FAILED), Some("Assertion failed"));
        assert_eq!(table.label(MsgId::CANNOT_WRITE_TO_STDERR), Some("Cannot write to stderr"));
        assert_eq!(table.label(MsgId::SET_OUTPUT_FILE), Some("Please set output file"));
        assert_eq!(table.label(MsgId::FORWARDING_CYCLE), Some("Forwarding cycle detected"));
        assert_eq!(table.upper_bound(), MsgId::new(MsgId::FORWARDING_CYCLE.raw() + 1));
    }

    #[test]
    fn test_out_of_range_lookups() {
        let table = MsgIdTable::new();
        assert_eq!(table.label(MsgId::NONE), None);
        assert_eq!(table.label(MsgId::errno(2)), None);
        assert_eq!(table.label(table.upper_bound()), None);
    }

    #[test]
    fn test_custom_ids_are_appended() {
        let mut table = MsgIdTable::new();
        let first = table.register("Pump stalled");
        let second = table.register(String::from("Valve stuck"));

        assert_eq!(first, MsgId::new(MsgId::FORWARDING_CYCLE.raw() + 1));
        assert_eq!(second.raw(), first.raw() + 1);
        assert_eq!(table.label(first), Some("Pump stalled"));
        assert_eq!(table.label(second), Some("Valve stuck"));
        assert_eq!(table.upper_bound().raw(), second.raw() + 1);
    }
}
