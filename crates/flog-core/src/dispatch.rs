//! Message dispatch through a log tree.
//!
//! A message injected at a node is filtered by the node's mask, relabelled
//! with the node's name, buffered, handed to the node's sink and then
//! forwarded to every child. Each node handles a given message at most once
//! per call, even when it is reachable through several parents, and a
//! forwarding cycle is cut where it closes instead of recursing forever.
//!
//! Sink failures and cycles are not reported while the fan-out is running:
//! they are queued and delivered to the relevant error log afterwards. While
//! those reports are being delivered, new failures are counted but not
//! reported again.

use std::collections::HashSet;
use flog_types::{FlogError, Message, MsgId, MsgType, NodeId, Result};
use crate::output::{SinkContext, SinkError};
use crate::render::Renderer;
use crate::tree::LogTree;

/// A failure waiting to be reported through an error log.
#[derive(Debug)]
struct Diagnostic {
    error_log: Option<NodeId>,
    subsystem: &'static str,
    msg_id: MsgId,
    text: String,
}

/// State of one `add_message` call.
#[derive(Debug, Default)]
struct Walk {
    visited: HashSet<NodeId>,
    path: Vec<NodeId>,
    pending: Vec<Diagnostic>,
}

/// Slots visited by [`LogTree::is_message_used`].
///
/// Trees of up to [`INLINE_SLOTS`] slots are tracked on the stack; larger
/// ones spill into a heap bitmap sized once up front.
struct Seen {
    inline: [u64; INLINE_SLOTS / 64],
    spill: Vec<u64>,
    #[cfg_attr(not(test), allow(dead_code))]
    visits: usize,
}

const INLINE_SLOTS: usize = 256;

impl Seen {
    fn for_slots(slots: usize) -> Self {
        let spill = if slots > INLINE_SLOTS {
            vec![0; (slots - INLINE_SLOTS).div_ceil(64)]
        } else {
            Vec::new()
        };
        Self {
            inline: [0; INLINE_SLOTS / 64],
            spill,
            visits: 0,
        }
    }

    /// Mark a slot, returning false if it was already marked.
    fn insert(&mut self, index: usize) -> bool {
        let (words, bit) = if index < INLINE_SLOTS {
            (&mut self.inline[..], index)
        } else {
            (&mut self.spill[..], index - INLINE_SLOTS)
        };
        let Some(word) = words.get_mut(bit / 64) else {
            return false;
        };
        let mask = 1u64 << (bit % 64);
        if *word & mask != 0 {
            return false;
        }
        *word |= mask;
        self.visits += 1;
        true
    }
}

impl LogTree {
    /// Deliver a message to a node and everything it forwards to.
    ///
    /// Returns the number of failures: failed sink invocations plus
    /// forwarding cycles. A type the node does not accept is not a failure.
    ///
    /// # Errors
    ///
    /// [`FlogError::UnknownNode`] when `node` does not exist.
    pub fn add_message(&mut self, node: NodeId, msg: &Message) -> Result<usize> {
        self.get(node)?;

        let mut walk = Walk::default();
        let mut failures = self.dispatch(node, msg, &mut walk);

        if walk.pending.is_empty() || self.reporting {
            return Ok(failures);
        }

        self.reporting = true;
        for diagnostic in walk.pending {
            if let Some(log) = diagnostic.error_log {
                failures += self.report(log, diagnostic.subsystem, diagnostic.msg_id, diagnostic.text);
            }
        }
        self.reporting = false;

        Ok(failures)
    }

    /// Whether printing a message of type `ty` at `node` would have any
    /// effect.
    ///
    /// True when the node accepts the type and has buffer room, a live sink,
    /// or a child for which this is true. Every node is examined at most
    /// once, and nothing is allocated for trees of up to 256 slots.
    pub fn is_message_used(&self, node: NodeId, ty: MsgType) -> bool {
        let mut seen = Seen::for_slots(self.nodes.len());
        self.used(node, ty, &mut seen)
    }

    // A node seen before either returned false or is still on the path.
    fn used(&self, id: NodeId, ty: MsgType, seen: &mut Seen) -> bool {
        let node = match self.node(id) {
            Some(node) => node,
            None => return false,
        };
        if !node.accept.accepts(ty) {
            return false;
        }
        if !seen.insert(id.index()) {
            return false;
        }
        if node.has_buffer_room() || node.has_live_sink() {
            return true;
        }

        node.children
            .iter()
            .any(|&child| self.used(child, ty, seen))
    }

    fn dispatch(&mut self, id: NodeId, msg: &Message, walk: &mut Walk) -> usize {
        let node = match self.nodes.get_mut(id.index()).and_then(Option::as_mut) {
            Some(node) => node,
            None => return 0,
        };
        if !node.accept.accepts(msg.msg_type) {
            return 0;
        }
        if !walk.visited.insert(id) {
            return 0;
        }

        let mut relabelled = msg.clone();
        if let Some(name) = node.name.as_deref() {
            relabelled.relabel(name);
        }

        if node.buffer.len() < node.buffer_max {
            node.buffer.push(msg.clone());
        }

        let mut failures = 0;
        let suppressed = node.stop_on_error && node.output_error != 0;
        if let (Some(sink), false) = (node.sink.as_mut(), suppressed) {
            let ctx = SinkContext {
                node: id,
                name: node.name.as_deref(),
                renderer: Renderer::new(&self.config, &self.ids),
            };
            match sink.write(&ctx, &relabelled) {
                Ok(()) => node.output_error = 0,
                Err(err) => {
                    tracing::warn!(node = %id, sink = sink.kind(), code = err.code, "Log output failed");
                    node.output_error = if err.code == 0 { -1 } else { err.code };
                    failures += 1;
                    walk.pending.push(Diagnostic::sink_failure(node.error_log, err));
                }
            }
        }

        let error_log = node.error_log;
        let children = node.children.clone();

        walk.path.push(id);
        for child in children {
            if walk.path.contains(&child) {
                tracing::warn!(from = %id, to = %child, "Forwarding cycle detected");
                failures += 1;
                walk.pending.push(Diagnostic {
                    error_log,
                    subsystem: "add_message",
                    msg_id: MsgId::FORWARDING_CYCLE,
                    text: format!("{} -> {}", self.describe(id), self.describe(child)),
                });
                continue;
            }
            failures += self.dispatch(child, &relabelled, walk);
        }
        walk.path.pop();

        failures
    }

    /// Print an internal error to `log`, returning the failures it caused.
    pub(crate) fn report(&mut self, log: NodeId, subsystem: &str, msg_id: MsgId, text: String) -> usize {
        let msg = match Message::create(&self.config, MsgType::ERROR, Some(subsystem), msg_id, Some(&text), None) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!(error = %e, "Could not build error report");
                return 0;
            }
        };

        let was_reporting = std::mem::replace(&mut self.reporting, true);
        let failures = match self.add_message(log, &msg) {
            Ok(failures) => failures,
            Err(FlogError::UnknownNode(_)) => 0,
            Err(e) => {
                tracing::warn!(error = %e, "Could not deliver error report");
                0
            }
        };
        self.reporting = was_reporting;
        failures
    }
}

impl Diagnostic {
    fn sink_failure(error_log: Option<NodeId>, err: SinkError) -> Self {
        let text = match err.detail {
            Some(detail) => detail,
            None => format!("output failed with status {}", err.code),
        };
        Self {
            error_log,
            subsystem: "output",
            msg_id: err.msg_id,
            text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{from_fn, MemorySink, Sink};
    use flog_types::FlogConfig;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn tree() -> LogTree {
        LogTree::new(FlogConfig {
            timestamp: false,
            src_info: false,
            ..FlogConfig::default()
        })
    }

    fn captured(tree: &mut LogTree, name: &str, accept: MsgType) -> (NodeId, MemorySink) {
        let sink = MemorySink::new();
        let id = tree.create(name, accept);
        tree.set_sink(id, sink.clone()).unwrap();
        (id, sink)
    }

    fn msg(ty: MsgType, subsystem: Option<&str>, text: &str) -> Message {
        let msg = Message::new(ty).with_text(text);
        match subsystem {
            Some(subsystem) => msg.with_subsystem(subsystem),
            None => msg,
        }
    }

    /// Sink failing every call and counting how often it ran.
    fn failing(calls: &Arc<AtomicUsize>) -> impl Sink + 'static {
        let calls = Arc::clone(calls);
        from_fn(move |_, _| {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(SinkError::new(5, MsgId::CANNOT_WRITE_FILE).with_detail("disk gone"))
        })
    }

    #[test]
    fn test_parent_and_child_masks() {
        let mut tree = tree();
        let (a, sink_a) = captured(&mut tree, "A", MsgType::ERROR | MsgType::WARNING);
        let (b, sink_b) = captured(&mut tree, "B", MsgType::ERROR);
        tree.append_child(a, b).unwrap();

        assert_eq!(tree.add_message(a, &msg(MsgType::WARNING, None, "careful")).unwrap(), 0);
        assert_eq!(sink_a.len(), 1);
        assert_eq!(sink_b.len(), 0);

        assert_eq!(tree.add_message(a, &msg(MsgType::ERROR, Some("io"), "broken")).unwrap(), 0);
        assert_eq!(sink_a.lines()[1], "[A/io] Error: broken\n");
        assert_eq!(sink_b.lines(), vec!["[B/A/io] Error: broken\n"]);
    }

    #[test]
    fn test_rejected_type_is_not_an_error() {
        let mut tree = tree();
        let (a, sink) = captured(&mut tree, "A", MsgType::ERROR);
        assert_eq!(tree.add_message(a, &msg(MsgType::DEBUG, None, "noise")).unwrap(), 0);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_parent_mask_gates_forwarding() {
        let mut tree = tree();
        let (a, _) = captured(&mut tree, "A", MsgType::ERROR);
        let (b, sink_b) = captured(&mut tree, "B", MsgType::ACCEPT_ALL);
        tree.append_child(a, b).unwrap();

        tree.add_message(a, &msg(MsgType::INFO, None, "hidden")).unwrap();
        assert!(sink_b.is_empty());
    }

    #[test]
    fn test_unknown_node() {
        let mut tree = tree();
        let result = tree.add_message(NodeId::from_raw(3), &msg(MsgType::ERROR, None, "x"));
        assert!(matches!(result, Err(FlogError::UnknownNode(_))));
    }

    #[test]
    fn test_relabel_chain() {
        let mut tree = tree();
        let (leaf, sink) = captured(&mut tree, "a", MsgType::ACCEPT_ALL);
        let b = tree.create("b", MsgType::ACCEPT_ALL);
        let c = tree.create("c", MsgType::ACCEPT_ALL);
        tree.append_child(c, b).unwrap();
        tree.append_child(b, leaf).unwrap();

        tree.add_message(c, &msg(MsgType::INFO, Some("orig"), "x")).unwrap();
        tree.add_message(c, &msg(MsgType::INFO, None, "y")).unwrap();

        let subsystems: Vec<_> = sink.messages().into_iter().map(|m| m.subsystem).collect();
        assert_eq!(subsystems, vec![Some("a/b/c/orig".to_string()), Some("a/b/c".to_string())]);
    }

    #[test]
    fn test_unnamed_node_keeps_subsystem() {
        let mut tree = tree();
        let (a, sink) = captured(&mut tree, "", MsgType::ACCEPT_ALL);
        tree.add_message(a, &msg(MsgType::INFO, Some("sub"), "x")).unwrap();
        tree.add_message(a, &msg(MsgType::INFO, None, "y")).unwrap();
        assert_eq!(sink.lines(), vec!["[sub] x\n", "y\n"]);
    }

    #[test]
    fn test_buffer_keeps_original_and_caps() {
        let mut tree = tree();
        let a = tree.create("A", MsgType::ACCEPT_ALL);
        tree.set_buffer_max(a, 3).unwrap();

        for i in 0..5 {
            tree.add_message(a, &msg(MsgType::INFO, Some("sub"), &i.to_string())).unwrap();
        }

        let node = tree.node(a).unwrap();
        assert_eq!(node.buffered().len(), 3);
        assert_eq!(node.buffered()[0].subsystem.as_deref(), Some("sub"));
        assert_eq!(node.buffered()[2].text.as_deref(), Some("2"));
    }

    #[test]
    fn test_stop_on_error_suppresses_sink() {
        let mut tree = tree();
        let calls = Arc::new(AtomicUsize::new(0));
        let x = tree.create("X", MsgType::ACCEPT_ALL);
        tree.set_sink(x, failing(&calls)).unwrap();
        let (child, sink) = captured(&mut tree, "child", MsgType::ACCEPT_ALL);
        tree.append_child(x, child).unwrap();

        assert_eq!(tree.add_message(x, &msg(MsgType::ERROR, None, "one")).unwrap(), 1);
        assert_eq!(tree.node(x).unwrap().output_error(), 5);
        assert_eq!(tree.add_message(x, &msg(MsgType::ERROR, None, "two")).unwrap(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Children are still visited while the sink is suppressed
        assert_eq!(sink.len(), 2);

        tree.clear_output_error(x).unwrap();
        assert_eq!(tree.add_message(x, &msg(MsgType::ERROR, None, "three")).unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_without_stop_on_error_sink_retries() {
        let mut tree = tree();
        let calls = Arc::new(AtomicUsize::new(0));
        let x = tree.create("X", MsgType::ACCEPT_ALL);
        tree.set_sink(x, failing(&calls)).unwrap();
        tree.set_stop_on_error(x, false).unwrap();

        assert_eq!(tree.add_message(x, &msg(MsgType::ERROR, None, "one")).unwrap(), 1);
        assert_eq!(tree.add_message(x, &msg(MsgType::ERROR, None, "two")).unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_success_resets_output_error() {
        let mut tree = tree();
        let fail_next = Arc::new(AtomicUsize::new(1));
        let flag = Arc::clone(&fail_next);
        let x = tree.create("X", MsgType::ACCEPT_ALL);
        tree.set_stop_on_error(x, false).unwrap();
        let sink = from_fn(move |_, _| {
            if flag.swap(0, Ordering::SeqCst) == 1 {
                Err(SinkError::new(-1, MsgId::NONE))
            } else {
                Ok(())
            }
        });
        tree.set_sink(x, sink).unwrap();

        tree.add_message(x, &msg(MsgType::ERROR, None, "one")).unwrap();
        assert_eq!(tree.node(x).unwrap().output_error(), -1);
        tree.add_message(x, &msg(MsgType::ERROR, None, "two")).unwrap();
        assert_eq!(tree.node(x).unwrap().output_error(), 0);
    }

    #[test]
    fn test_sink_failure_reported_to_error_log() {
        let mut tree = tree();
        let calls = Arc::new(AtomicUsize::new(0));
        let (errors, error_sink) = captured(&mut tree, "errors", MsgType::ACCEPT_ALL);
        let x = tree.create("X", MsgType::ACCEPT_ALL);
        tree.set_sink(x, failing(&calls)).unwrap();
        tree.set_error_log(x, Some(errors)).unwrap();

        assert_eq!(tree.add_message(x, &msg(MsgType::ERROR, None, "one")).unwrap(), 1);
        let reported = error_sink.messages();
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].msg_type, MsgType::ERROR);
        assert_eq!(reported[0].msg_id, MsgId::CANNOT_WRITE_FILE);
        assert_eq!(reported[0].subsystem.as_deref(), Some("errors/output"));
        assert_eq!(reported[0].text.as_deref(), Some("disk gone"));
    }

    #[test]
    fn test_failing_sink_as_own_error_log_does_not_storm() {
        let mut tree = tree();
        let calls = Arc::new(AtomicUsize::new(0));
        let x = tree.create("X", MsgType::ACCEPT_ALL);
        tree.set_sink(x, failing(&calls)).unwrap();
        tree.set_stop_on_error(x, false).unwrap();
        tree.set_error_log(x, Some(x)).unwrap();

        // The original failure plus the failed report of it
        assert_eq!(tree.add_message(x, &msg(MsgType::ERROR, None, "one")).unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_diamond_delivers_once() {
        let mut tree = tree();
        let root = tree.create("root", MsgType::ACCEPT_ALL);
        let left = tree.create("left", MsgType::ACCEPT_ALL);
        let right = tree.create("right", MsgType::ACCEPT_ALL);
        let (bottom, sink) = captured(&mut tree, "bottom", MsgType::ACCEPT_ALL);
        tree.append_child(root, left).unwrap();
        tree.append_child(root, right).unwrap();
        tree.append_child(left, bottom).unwrap();
        tree.append_child(right, bottom).unwrap();

        assert_eq!(tree.add_message(root, &msg(MsgType::INFO, None, "x")).unwrap(), 0);
        assert_eq!(sink.lines(), vec!["[bottom/left/root] x\n"]);
    }

    #[test]
    fn test_cycle_terminates_with_one_failure() {
        let mut tree = tree();
        let (errors, error_sink) = captured(&mut tree, "", MsgType::ACCEPT_ALL);
        let (a, sink_a) = captured(&mut tree, "a", MsgType::ACCEPT_ALL);
        let (b, sink_b) = captured(&mut tree, "b", MsgType::ACCEPT_ALL);
        tree.append_child(a, b).unwrap();
        tree.append_child(b, a).unwrap();
        tree.set_error_log(b, Some(errors)).unwrap();

        assert_eq!(tree.add_message(a, &msg(MsgType::INFO, None, "loop")).unwrap(), 1);
        assert_eq!(sink_a.len(), 1);
        assert_eq!(sink_b.len(), 1);

        let reported = error_sink.messages();
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].msg_id, MsgId::FORWARDING_CYCLE);
        assert_eq!(reported[0].text.as_deref(), Some("'b' -> 'a'"));
    }

    #[test]
    fn test_is_message_used() {
        let mut tree = tree();
        let a = tree.create("a", MsgType::ACCEPT_INFO);
        assert!(!tree.is_message_used(a, MsgType::ERROR));

        tree.set_buffer_max(a, 1).unwrap();
        assert!(tree.is_message_used(a, MsgType::ERROR));
        assert!(!tree.is_message_used(a, MsgType::DEBUG));
        assert!(!tree.is_message_used(a, MsgType::NONE));
        tree.add_message(a, &msg(MsgType::ERROR, None, "fills the buffer")).unwrap();
        assert!(!tree.is_message_used(a, MsgType::ERROR));

        let (b, _) = captured(&mut tree, "b", MsgType::ERROR);
        tree.append_child(a, b).unwrap();
        assert!(tree.is_message_used(a, MsgType::ERROR));
        assert!(!tree.is_message_used(a, MsgType::WARNING));
        assert!(!tree.is_message_used(NodeId::from_raw(40), MsgType::ERROR));
    }

    #[test]
    fn test_is_message_used_ignores_suppressed_sink_and_cycles() {
        let mut tree = tree();
        let calls = Arc::new(AtomicUsize::new(0));
        let a = tree.create("a", MsgType::ACCEPT_ALL);
        let b = tree.create("b", MsgType::ACCEPT_ALL);
        tree.append_child(a, b).unwrap();
        tree.append_child(b, a).unwrap();
        assert!(!tree.is_message_used(a, MsgType::ERROR));

        tree.set_sink(b, failing(&calls)).unwrap();
        assert!(tree.is_message_used(a, MsgType::ERROR));
        tree.add_message(b, &msg(MsgType::ERROR, None, "fail")).unwrap();
        assert!(tree.node(b).unwrap().is_suppressed());
        assert!(!tree.is_message_used(a, MsgType::ERROR));
    }

    /// Root followed by `layers` layers of two nodes, each layer fully
    /// connected to the next.
    fn layered(tree: &mut LogTree, layers: usize) -> (NodeId, Vec<NodeId>) {
        let root = tree.create("root", MsgType::ACCEPT_ALL);
        let mut previous = vec![root];
        for layer in 0..layers {
            let current: Vec<NodeId> = (0..2)
                .map(|i| tree.create(&format!("l{}n{}", layer, i), MsgType::ACCEPT_ALL))
                .collect();
            for &parent in &previous {
                for &child in &current {
                    tree.append_child(parent, child).unwrap();
                }
            }
            previous = current;
        }
        (root, previous)
    }

    #[test]
    fn test_is_message_used_visits_shared_children_once() {
        let mut tree = tree();
        let (root, last) = layered(&mut tree, 24);

        let mut seen = Seen::for_slots(tree.nodes.len());
        assert!(!tree.used(root, MsgType::ERROR, &mut seen));
        assert_eq!(seen.visits, 49);
        assert!(!tree.is_message_used(root, MsgType::ERROR));

        tree.set_sink(last[1], MemorySink::new()).unwrap();
        let mut seen = Seen::for_slots(tree.nodes.len());
        assert!(tree.used(root, MsgType::ERROR, &mut seen));
        assert!(seen.visits <= 49);
    }

    #[test]
    fn test_is_message_used_on_large_tree() {
        let mut tree = tree();
        let ids: Vec<NodeId> = (0..300)
            .map(|i| tree.create(&format!("n{}", i), MsgType::ACCEPT_ALL))
            .collect();
        for pair in ids.windows(2) {
            tree.append_child(pair[0], pair[1]).unwrap();
        }
        assert!(!tree.is_message_used(ids[0], MsgType::INFO));

        tree.set_buffer_max(ids[299], 1).unwrap();
        assert!(tree.is_message_used(ids[0], MsgType::INFO));
        assert!(tree.is_message_used(ids[280], MsgType::INFO));

        tree.append_child(ids[299], ids[260]).unwrap();
        tree.set_buffer_max(ids[299], 0).unwrap();
        assert!(!tree.is_message_used(ids[0], MsgType::INFO));
    }

    proptest! {
        #[test]
        fn prop_delivery_matches_reachability(
            masks in proptest::collection::vec(any::<u8>(), 2..7),
            edges in proptest::collection::vec((0usize..6, 0usize..6), 0..12),
            bit in 0u32..8,
        ) {
            let ty = MsgType::from_bits(1 << bit);
            let mut tree = tree();
            let nodes: Vec<(NodeId, MemorySink)> = masks
                .iter()
                .enumerate()
                .map(|(i, mask)| captured(&mut tree, &format!("n{}", i), MsgType::from_bits(*mask)))
                .collect();

            let n = nodes.len();
            let mut adjacency = vec![Vec::new(); n];
            for (from, to) in edges {
                let (from, to) = (from % n, to % n);
                if from < to {
                    tree.append_child(nodes[from].0, nodes[to].0).unwrap();
                    adjacency[from].push(to);
                }
            }

            // Forward-only edges keep the graph acyclic
            let mut reached = vec![false; n];
            let mut stack = vec![0usize];
            while let Some(i) = stack.pop() {
                if reached[i] || !MsgType::from_bits(masks[i]).accepts(ty) {
                    continue;
                }
                reached[i] = true;
                stack.extend(adjacency[i].iter().copied());
            }

            let failures = tree.add_message(nodes[0].0, &msg(ty, None, "x")).unwrap();
            prop_assert_eq!(failures, 0);
            for (i, (_, sink)) in nodes.iter().enumerate() {
                prop_assert_eq!(sink.len(), usize::from(reached[i]));
            }
        }
    }
}
