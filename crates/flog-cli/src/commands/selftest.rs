//! Print one message of every type through a log.

use anyhow::Result;
use flog_core::config::TreeConfig;

pub fn execute(config: &TreeConfig, log: Option<&str>) -> Result<()> {
    let mut built = super::build_tree(config)?;
    let node = super::target(&built, log)?;
    super::warn_on_output(built.tree.self_test(node))
}
