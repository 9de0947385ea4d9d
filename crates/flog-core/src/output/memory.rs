//! In-memory sink.

use std::sync::Arc;
use parking_lot::Mutex;
use flog_types::Message;
use super::{Sink, SinkContext, SinkError};

/// One message captured by a [`MemorySink`].
#[derive(Debug, Clone)]
pub struct Record {
    /// The message as delivered (already relabelled)
    pub message: Message,
    /// The rendered line, if the message rendered to anything
    pub line: Option<String>,
}

/// Keeps delivered messages in memory.
///
/// Clones share the same storage, so a clone kept by the caller observes
/// everything written through the clone attached to a node.
///
/// # Example
///
/// ```
/// use flog_core::{LogTree, MsgType, MsgId};
/// use flog_core::output::MemorySink;
///
/// let mut tree = LogTree::default();
/// let capture = MemorySink::new();
/// let log = tree.create("app", MsgType::ACCEPT_ALL);
/// tree.set_sink(log, capture.clone()).unwrap();
///
/// tree.print(log, Some("init"), MsgType::INFO, MsgId::NONE, Some("ready")).unwrap();
/// assert_eq!(capture.messages()[0].subsystem.as_deref(), Some("app/init"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<Record>>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every captured record.
    pub fn records(&self) -> Vec<Record> {
        self.records.lock().clone()
    }

    /// Captured messages.
    pub fn messages(&self) -> Vec<Message> {
        self.records.lock().iter().map(|r| r.message.clone()).collect()
    }

    /// Captured rendered lines, skipping messages that rendered to nothing.
    pub fn lines(&self) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .filter_map(|r| r.line.clone())
            .collect()
    }

    /// Number of captured messages.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Whether nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Forget everything captured so far.
    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl Sink for MemorySink {
    fn write(&mut self, ctx: &SinkContext<'_>, msg: &Message) -> Result<(), SinkError> {
        let line = ctx.renderer.render(msg);
        self.records.lock().push(Record {
            message: msg.clone(),
            line,
        });
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}
