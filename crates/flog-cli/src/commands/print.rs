//! Print a single message.

use anyhow::Result;
use flog_core::config::TreeConfig;
use flog_types::{MsgId, MsgType};

pub fn execute(
    config: &TreeConfig,
    log: Option<&str>,
    msg_type: MsgType,
    subsystem: Option<&str>,
    msg_id: MsgId,
    text: &str,
) -> Result<()> {
    let mut built = super::build_tree(config)?;
    let node = super::target(&built, log)?;

    tracing::debug!(node = %node, msg_type = %msg_type, "Printing message");
    built.tree.print_with_source(node, subsystem, msg_type, msg_id, Some(text), None)?;
    Ok(())
}
