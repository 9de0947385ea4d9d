//! Print entry points.
//!
//! Every entry point first asks [`LogTree::is_message_used`] whether the
//! message would have any effect, and returns right away when it would not.
//! Nothing is allocated or formatted on that path.

use std::fmt::{self, Write};
use std::panic::Location;
use flog_types::{FlogError, Message, MsgId, MsgType, NodeId, Result, SourceInfo};
use crate::tree::LogTree;

impl LogTree {
    /// Print a message at `node`, recording the caller's file and line.
    ///
    /// # Errors
    ///
    /// - [`FlogError::UnknownNode`] if `node` does not exist
    /// - [`FlogError::NullMessage`] for a message without id and text when
    ///   null messages are not allowed
    /// - [`FlogError::Output`] with the number of failed outputs
    #[track_caller]
    pub fn print(
        &mut self,
        node: NodeId,
        subsystem: Option<&str>,
        ty: MsgType,
        msg_id: MsgId,
        text: Option<&str>,
    ) -> Result<()> {
        let source = SourceInfo::from_location(Location::caller());
        self.print_with_source(node, subsystem, ty, msg_id, text, Some(source))
    }

    /// Print a message with an explicit source location.
    pub fn print_with_source(
        &mut self,
        node: NodeId,
        subsystem: Option<&str>,
        ty: MsgType,
        msg_id: MsgId,
        text: Option<&str>,
        source: Option<SourceInfo>,
    ) -> Result<()> {
        if !self.should_print(node, ty)? {
            return Ok(());
        }
        let msg = Message::create(&self.config, ty, subsystem, msg_id, text, source)?;
        self.deliver(node, &msg)
    }

    /// Print a formatted message at `node`, recording the caller's file and
    /// line.
    ///
    /// The arguments are only formatted when the message would be used.
    ///
    /// # Errors
    ///
    /// As [`LogTree::print`], plus [`FlogError::Format`] when a `Display`
    /// implementation fails.
    #[track_caller]
    pub fn print_fmt(
        &mut self,
        node: NodeId,
        subsystem: Option<&str>,
        ty: MsgType,
        msg_id: MsgId,
        args: fmt::Arguments<'_>,
    ) -> Result<()> {
        let source = SourceInfo::from_location(Location::caller());
        self.print_fmt_with_source(node, subsystem, ty, msg_id, args, Some(source))
    }

    /// Print a formatted message with an explicit source location.
    pub fn print_fmt_with_source(
        &mut self,
        node: NodeId,
        subsystem: Option<&str>,
        ty: MsgType,
        msg_id: MsgId,
        args: fmt::Arguments<'_>,
        source: Option<SourceInfo>,
    ) -> Result<()> {
        if !self.should_print(node, ty)? {
            return Ok(());
        }
        let mut text = String::new();
        text.write_fmt(args)?;
        let msg = Message::create(&self.config, ty, subsystem, msg_id, Some(&text), source)?;
        self.deliver(node, &msg)
    }

    /// Print one message of every type, starting with one that must never
    /// be visible, followed by a debug-build-only message.
    pub fn self_test(&mut self, node: NodeId) -> Result<()> {
        self.get(node)?;

        let mut failures = 0;
        let mut tally = |result: Result<()>| match result {
            Ok(()) => Ok(()),
            Err(FlogError::Output { failures: n }) => {
                failures += n;
                Ok(())
            }
            Err(e) => Err(e),
        };

        tally(self.print_with_source(
            node,
            Some("self_test"),
            MsgType::NONE,
            MsgId::NONE,
            Some("This message should NEVER be visible"),
            Some(crate::flog_source!()),
        ))?;

        for ty in MsgType::all() {
            tally(self.print_fmt_with_source(
                node,
                Some("self_test"),
                ty,
                MsgId::NONE,
                format_args!(
                    "This is a test message with {} (0x{:02x}) as type",
                    ty.name().unwrap_or("?"),
                    ty.bits()
                ),
                Some(crate::flog_source!()),
            ))?;
        }

        tally(crate::flog_dprint!(
            self,
            node,
            MsgType::DEBUG,
            "self_test",
            "This message is only printed in debug builds"
        ))?;

        match failures {
            0 => Ok(()),
            failures => Err(FlogError::Output { failures }),
        }
    }

    fn should_print(&self, node: NodeId, ty: MsgType) -> Result<bool> {
        self.get(node)?;
        Ok(self.is_message_used(node, ty))
    }

    fn deliver(&mut self, node: NodeId, msg: &Message) -> Result<()> {
        match self.add_message(node, msg)? {
            0 => Ok(()),
            failures => Err(FlogError::Output { failures }),
        }
    }
}
