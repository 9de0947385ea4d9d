//! CLI command implementations.

pub mod demo;
pub mod print;
pub mod render_config;
pub mod selftest;
pub mod version;

use anyhow::{Context, Result};
use colored::Colorize;
use flog_core::config::{ConfiguredTree, TreeConfig};
use flog_types::{FlogError, LogConfig, NodeId, OutputConfig};

/// Build the configured tree, or a single stdout log when none is configured.
pub(crate) fn build_tree(config: &TreeConfig) -> Result<ConfiguredTree> {
    let mut config = config.clone();
    if config.logs.is_empty() {
        config.logs.push(LogConfig {
            name: "flog".to_string(),
            accept: flog_types::MsgType::ACCEPT_DEEP_DEBUG,
            output: OutputConfig::Stdout,
            buffer_max: 0,
            stop_on_error: true,
            error_log: None,
            children: Vec::new(),
        });
    }
    config.build().context("Failed to build log tree")
}

/// Resolve `--log`, defaulting to the first configured log.
pub(crate) fn target(built: &ConfiguredTree, log: Option<&str>) -> Result<NodeId> {
    match log {
        Some(name) => Ok(built.node(name)?),
        None => built.entry().context("No logs configured"),
    }
}

/// Turn failed outputs into a warning, keep every other error.
pub(crate) fn warn_on_output(result: flog_types::Result<()>) -> Result<()> {
    match result {
        Err(FlogError::Output { failures }) => {
            eprintln!("{} {} output(s) failed", "Warning:".yellow().bold(), failures);
            Ok(())
        }
        other => Ok(other?),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use flog_types::{FlogConfig, MsgType};
    use std::path::Path;

    /// A single file log named `app`, rendering without timestamps.
    pub(crate) fn file_config(path: &Path, accept: MsgType) -> TreeConfig {
        let mut config = TreeConfig::default();
        config.settings = FlogConfig {
            timestamp: false,
            src_info: false,
            ..FlogConfig::default()
        };
        config.logs.push(LogConfig {
            name: "app".to_string(),
            accept,
            output: OutputConfig::File {
                path: Some(path.to_path_buf()),
            },
            buffer_max: 0,
            stop_on_error: true,
            error_log: None,
            children: Vec::new(),
        });
        config
    }

    #[test]
    fn test_build_tree_falls_back_to_stdout() {
        let built = build_tree(&TreeConfig::default()).unwrap();
        let node = target(&built, None).unwrap();
        assert_eq!(built.tree.node(node).unwrap().name(), Some("flog"));
        assert_eq!(built.tree.node(node).unwrap().sink_kind(), Some("stdout"));
        assert!(target(&built, Some("missing")).is_err());
    }

    #[test]
    fn test_warn_on_output_keeps_other_errors() {
        assert!(warn_on_output(Err(FlogError::Output { failures: 2 })).is_ok());
        assert!(warn_on_output(Err(FlogError::NullMessage)).is_err());
        assert!(warn_on_output(Ok(())).is_ok());
    }
}
