//! Arena of log nodes.
//!
//! Every node lives in a slot of the [`LogTree`] and is addressed by its
//! [`NodeId`]. Child lists hold ids, not ownership: a node may be forwarded to
//! from several parents, and destroying it simply empties its slot and prunes
//! every edge pointing at it. Slots are never reused, so a stale id can not
//! silently address a different node.

use std::fmt;
use std::path::Path;
use flog_types::{FlogConfig, FlogError, Message, MsgId, MsgIdTable, MsgType, NodeId, Result};
use crate::output::{FileSink, Sink, StderrSink, StdoutSink};

/// One node of a log tree.
pub struct LogNode {
    pub(crate) name: Option<String>,
    pub(crate) accept: MsgType,
    pub(crate) sink: Option<Box<dyn Sink>>,
    pub(crate) output_error: i32,
    pub(crate) stop_on_error: bool,
    pub(crate) error_log: Option<NodeId>,
    pub(crate) buffer: Vec<Message>,
    pub(crate) buffer_max: usize,
    pub(crate) children: Vec<NodeId>,
}

impl LogNode {
    fn new(name: &str, accept: MsgType) -> Self {
        Self {
            name: Some(name.to_string()).filter(|n| !n.is_empty()),
            accept,
            sink: None,
            output_error: 0,
            stop_on_error: true,
            error_log: None,
            buffer: Vec::new(),
            buffer_max: 0,
            children: Vec::new(),
        }
    }

    /// Name of the node, `None` for an unnamed node.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Accepted message types.
    pub fn accept(&self) -> MsgType {
        self.accept
    }

    /// Whether a sink is attached.
    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    /// Kind of the attached sink.
    pub fn sink_kind(&self) -> Option<&'static str> {
        self.sink.as_ref().map(|s| s.kind())
    }

    /// Status of the last sink invocation, 0 after a success.
    pub fn output_error(&self) -> i32 {
        self.output_error
    }

    /// Whether the sink is skipped after a failure.
    pub fn stop_on_error(&self) -> bool {
        self.stop_on_error
    }

    /// Whether the sink is currently skipped because of an earlier failure.
    pub fn is_suppressed(&self) -> bool {
        self.stop_on_error && self.output_error != 0
    }

    /// Whether a sink is attached and not suppressed.
    pub fn has_live_sink(&self) -> bool {
        self.sink.is_some() && !self.is_suppressed()
    }

    /// Node receiving this node's internal errors.
    pub fn error_log(&self) -> Option<NodeId> {
        self.error_log
    }

    /// Buffered messages, oldest first, as they were before relabelling.
    pub fn buffered(&self) -> &[Message] {
        &self.buffer
    }

    /// Buffer capacity, 0 when buffering is disabled.
    pub fn buffer_max(&self) -> usize {
        self.buffer_max
    }

    /// Whether the buffer can take another message.
    pub fn has_buffer_room(&self) -> bool {
        self.buffer.len() < self.buffer_max
    }

    /// Nodes this node forwards to, in delivery order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

impl fmt::Debug for LogNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogNode")
            .field("name", &self.name)
            .field("accept", &self.accept)
            .field("sink", &self.sink_kind())
            .field("output_error", &self.output_error)
            .field("stop_on_error", &self.stop_on_error)
            .field("error_log", &self.error_log)
            .field("buffered", &self.buffer.len())
            .field("buffer_max", &self.buffer_max)
            .field("children", &self.children)
            .finish()
    }
}

/// A forwarding graph of log nodes sharing one configuration.
///
/// # Example
///
/// ```
/// use flog_core::{LogTree, MsgType, MsgId};
///
/// let mut tree = LogTree::default();
/// let main = tree.create_stderr("main", MsgType::ACCEPT_INFO);
/// let net = tree.create("net", MsgType::ACCEPT_ALL);
/// tree.append_child(net, main).unwrap();
///
/// tree.print(net, Some("connect"), MsgType::WARNING, MsgId::NONE, Some("retrying")).unwrap();
/// ```
#[derive(Debug, Default)]
pub struct LogTree {
    pub(crate) nodes: Vec<Option<LogNode>>,
    pub(crate) config: FlogConfig,
    pub(crate) ids: MsgIdTable,
    pub(crate) reporting: bool,
}

impl LogTree {
    /// Create an empty tree.
    pub fn new(config: FlogConfig) -> Self {
        Self::with_ids(config, MsgIdTable::new())
    }

    /// Create an empty tree using a prepared message id table.
    pub fn with_ids(config: FlogConfig, ids: MsgIdTable) -> Self {
        Self {
            nodes: Vec::new(),
            config,
            ids,
            reporting: false,
        }
    }

    /// Message and rendering settings.
    pub fn config(&self) -> &FlogConfig {
        &self.config
    }

    /// Mutable settings; changes apply to the next print call.
    pub fn config_mut(&mut self) -> &mut FlogConfig {
        &mut self.config
    }

    /// The message id table.
    pub fn ids(&self) -> &MsgIdTable {
        &self.ids
    }

    /// Mutable message id table, for registering custom ids.
    pub fn ids_mut(&mut self) -> &mut MsgIdTable {
        &mut self.ids
    }

    /// Create a node without a sink.
    ///
    /// An empty name creates an unnamed node, which forwards messages
    /// without relabelling them.
    pub fn create(&mut self, name: &str, accept: MsgType) -> NodeId {
        let id = NodeId::from_raw(self.nodes.len());
        self.nodes.push(Some(LogNode::new(name, accept)));
        tracing::debug!(node = %id, name, accept = %accept, "Created log node");
        id
    }

    /// Create a node writing to stdout.
    pub fn create_stdout(&mut self, name: &str, accept: MsgType) -> NodeId {
        self.create_with(name, accept, StdoutSink)
    }

    /// Create a node writing to stderr.
    pub fn create_stderr(&mut self, name: &str, accept: MsgType) -> NodeId {
        self.create_with(name, accept, StderrSink)
    }

    /// Create a node appending to a file.
    pub fn create_file(&mut self, name: &str, accept: MsgType, path: impl AsRef<Path>) -> NodeId {
        self.create_with(name, accept, FileSink::new(path))
    }

    fn create_with(&mut self, name: &str, accept: MsgType, sink: impl Sink + 'static) -> NodeId {
        let id = self.create(name, accept);
        if let Some(node) = self.slot_mut(id) {
            node.sink = Some(Box::new(sink));
        }
        id
    }

    /// Remove a node.
    ///
    /// The node's buffer and sink are dropped with it and every edge
    /// pointing at it is pruned. Destroying an unknown or already destroyed
    /// node does nothing.
    pub fn destroy(&mut self, id: NodeId) {
        let removed = match self.nodes.get_mut(id.index()) {
            Some(slot) => slot.take(),
            None => None,
        };
        if removed.is_none() {
            return;
        }

        for node in self.nodes.iter_mut().flatten() {
            node.children.retain(|child| *child != id);
            if node.error_log == Some(id) {
                node.error_log = None;
            }
        }
        tracing::debug!(node = %id, "Destroyed log node");
    }

    /// Forward every message `parent` accepts to `child`.
    ///
    /// # Errors
    ///
    /// Fails with [`FlogError::UnknownNode`] for a missing node, and with
    /// [`FlogError::SelfAppend`] when `parent == child`; the latter is also
    /// reported through the parent's error log.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let error_log = self.get(parent)?.error_log;

        if parent == child {
            tracing::warn!(node = %parent, "Refused to append log to itself");
            if let Some(log) = error_log {
                self.report(
                    log,
                    "append_child",
                    MsgId::NONE,
                    "cannot append log to itself (causes circular dependency)".to_string(),
                );
            }
            return Err(FlogError::SelfAppend { node: parent });
        }

        self.get(child)?;
        self.get_mut(parent)?.children.push(child);
        tracing::debug!(parent = %parent, child = %child, "Appended child log");
        Ok(())
    }

    /// Drop every buffered message; the capacity is kept.
    pub fn clear_buffer(&mut self, id: NodeId) -> Result<()> {
        self.get_mut(id)?.buffer.clear();
        Ok(())
    }

    /// Attach a sink, replacing any previous one. Clears the output error.
    pub fn set_sink(&mut self, id: NodeId, sink: impl Sink + 'static) -> Result<()> {
        let node = self.get_mut(id)?;
        node.sink = Some(Box::new(sink));
        node.output_error = 0;
        Ok(())
    }

    /// Detach the sink and hand it back.
    pub fn take_sink(&mut self, id: NodeId) -> Result<Option<Box<dyn Sink>>> {
        Ok(self.get_mut(id)?.sink.take())
    }

    /// Set the node receiving internal errors; it may be the node itself.
    pub fn set_error_log(&mut self, id: NodeId, error_log: Option<NodeId>) -> Result<()> {
        if let Some(log) = error_log {
            self.get(log)?;
        }
        self.get_mut(id)?.error_log = error_log;
        Ok(())
    }

    /// Set the buffer capacity, dropping the newest messages past it.
    pub fn set_buffer_max(&mut self, id: NodeId, buffer_max: usize) -> Result<()> {
        let node = self.get_mut(id)?;
        node.buffer_max = buffer_max;
        node.buffer.truncate(buffer_max);
        Ok(())
    }

    /// Choose whether the sink is skipped after a failure.
    pub fn set_stop_on_error(&mut self, id: NodeId, stop_on_error: bool) -> Result<()> {
        self.get_mut(id)?.stop_on_error = stop_on_error;
        Ok(())
    }

    /// Change the accepted message types.
    pub fn set_accept(&mut self, id: NodeId, accept: MsgType) -> Result<()> {
        self.get_mut(id)?.accept = accept;
        Ok(())
    }

    /// Forget an earlier sink failure so a suppressed sink is used again.
    pub fn clear_output_error(&mut self, id: NodeId) -> Result<()> {
        self.get_mut(id)?.output_error = 0;
        Ok(())
    }

    /// Look up a live node.
    pub fn node(&self, id: NodeId) -> Option<&LogNode> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    /// First live node with the given name.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.iter()
            .find(|(_, node)| node.name() == Some(name))
            .map(|(id, _)| id)
    }

    /// Live nodes in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &LogNode)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|node| (NodeId::from_raw(index), node)))
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    /// Whether the tree has no live nodes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn get(&self, id: NodeId) -> Result<&LogNode> {
        self.node(id).ok_or(FlogError::UnknownNode(id))
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Result<&mut LogNode> {
        self.slot_mut(id).ok_or(FlogError::UnknownNode(id))
    }

    fn slot_mut(&mut self, id: NodeId) -> Option<&mut LogNode> {
        self.nodes.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Name of a node for diagnostics, its id when unnamed.
    pub(crate) fn describe(&self, id: NodeId) -> String {
        match self.node(id).and_then(LogNode::name) {
            Some(name) => format!("'{}'", name),
            None => id.to_string(),
        }
    }
}
