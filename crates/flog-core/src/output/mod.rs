//! Output sinks.
//!
//! A sink is the pluggable output capability of a log node. The dispatcher
//! hands it every message the node accepted, already relabelled with the
//! node's name. Sinks render lazily: nothing is formatted for messages that
//! were filtered out further up.
//!
//! Failures are returned as a [`SinkError`]. The dispatcher records the status
//! on the node, counts the failure and reports it through the node's error
//! log once the fan-out has finished.

use flog_types::{Message, MsgId, NodeId};
use thiserror::Error;
use crate::render::Renderer;

pub mod file;
pub mod memory;
pub mod stdio;

pub use file::FileSink;
pub use memory::MemorySink;
pub use stdio::{StderrSink, StdoutSink};

/// What a sink sees of the node it is attached to.
#[derive(Debug, Clone, Copy)]
pub struct SinkContext<'a> {
    /// The node whose sink is being invoked
    pub node: NodeId,
    /// Name of that node, if it has one
    pub name: Option<&'a str>,
    /// Renderer bound to the tree's settings and message id table
    pub renderer: Renderer<'a>,
}

/// A failed sink invocation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("output failed with status {code}")]
pub struct SinkError {
    /// Implementation-defined status, usually an OS error number; `-1` when
    /// no better value is known
    pub code: i32,
    /// Message id describing the failure
    pub msg_id: MsgId,
    /// Extra detail for the error log
    pub detail: Option<String>,
}

impl SinkError {
    /// Create a sink error.
    pub fn new(code: i32, msg_id: MsgId) -> Self {
        Self {
            code,
            msg_id,
            detail: None,
        }
    }

    /// Build from an I/O error, keeping its OS error number.
    pub fn from_io(err: &std::io::Error, msg_id: MsgId) -> Self {
        Self::new(err.raw_os_error().unwrap_or(-1), msg_id)
    }

    /// Attach detail text.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Pluggable output of a log node.
///
/// Resources a sink holds (a file path, an open handle) belong to the sink
/// and are released when the sink is dropped together with its node.
pub trait Sink: Send {
    /// Output one message.
    fn write(&mut self, ctx: &SinkContext<'_>, msg: &Message) -> Result<(), SinkError>;

    /// Short name of the sink kind (e.g., "stdout", "file").
    fn kind(&self) -> &'static str;
}

/// Sink backed by a closure, see [`from_fn`].
pub struct FromFn<F>(F);

impl<F> Sink for FromFn<F>
where
    F: FnMut(&SinkContext<'_>, &Message) -> Result<(), SinkError> + Send,
{
    fn write(&mut self, ctx: &SinkContext<'_>, msg: &Message) -> Result<(), SinkError> {
        (self.0)(ctx, msg)
    }

    fn kind(&self) -> &'static str {
        "fn"
    }
}

/// Use a closure as a sink.
///
/// # Example
///
/// ```
/// use flog_core::{LogTree, MsgType, MsgId};
/// use flog_core::output::from_fn;
///
/// let mut tree = LogTree::default();
/// let log = tree.create("app", MsgType::ACCEPT_ALL);
/// tree.set_sink(log, from_fn(|ctx, msg| {
///     if let Some(line) = ctx.renderer.render(msg) {
///         print!("{}", line);
///     }
///     Ok(())
/// })).unwrap();
/// ```
pub fn from_fn<F>(f: F) -> FromFn<F>
where
    F: FnMut(&SinkContext<'_>, &Message) -> Result<(), SinkError> + Send,
{
    FromFn(f)
}
