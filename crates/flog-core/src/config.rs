//! Configuration management for flog.
//!
//! A [`TreeConfig`] describes the message settings, flog's own diagnostics
//! and a set of named log nodes with their outputs and forwarding edges.
//!
//! ## Configuration Layers
//!
//! Values are resolved in this priority order:
//! 1. Environment variables (`FLOG_TIMESTAMP`, `FLOG_SRC_INFO`, ...)
//! 2. Values loaded from file
//! 3. Default values
//!
//! ## Example
//!
//! ```rust
//! use flog_core::config::TreeConfig;
//! use flog_core::MsgType;
//!
//! let config = TreeConfig::from_yaml(r#"
//! logs:
//!   - name: main
//!     accept: info
//!     children: [console]
//!   - name: console
//!     output: { type: memory }
//! "#).unwrap();
//!
//! let mut built = config.build().unwrap();
//! let main = built.node("main").unwrap();
//! built.tree.print(main, None, MsgType::INFO, flog_core::MsgId::NONE, Some("hello")).unwrap();
//! assert_eq!(built.memory["console"].len(), 1);
//! ```

use flog_types::{bail, bug};
use flog_types::{
    FlogConfig, FlogError, LogConfig, NodeId, OutputConfig, Result, TracingConfig,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use crate::output::{FileSink, MemorySink};
use crate::tree::LogTree;

/// Enables or disables timestamps.
pub const ENV_TIMESTAMP: &str = "FLOG_TIMESTAMP";
/// Enables or disables source info.
pub const ENV_SRC_INFO: &str = "FLOG_SRC_INFO";
/// Enables or disables microsecond timestamps.
pub const ENV_TIMESTAMP_USEC: &str = "FLOG_TIMESTAMP_USEC";
/// Enables or disables numeric message ids in front of their labels.
pub const ENV_SHOW_MSG_ID: &str = "FLOG_SHOW_MSG_ID";
/// Enables or disables null messages.
pub const ENV_ALLOW_NULL: &str = "FLOG_ALLOW_NULL";

/// Configuration layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigLayer {
    /// Default values
    Default = 0,
    /// Values loaded from file
    Loaded = 1,
    /// Values from environment variables
    Environment = 2,
}

/// Settings plus a description of a log tree.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Message and rendering settings
    pub settings: FlogConfig,
    /// flog's own diagnostics
    pub tracing: TracingConfig,
    /// Log nodes, created in this order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<LogConfig>,
    #[serde(skip)]
    file_path: Option<PathBuf>,
    #[serde(skip)]
    layers: Vec<ConfigLayer>,
}

/// A log tree built from a [`TreeConfig`].
#[derive(Debug)]
pub struct ConfiguredTree {
    /// The tree itself
    pub tree: LogTree,
    /// Node ids by configured name, in configuration order
    pub nodes: IndexMap<String, NodeId>,
    /// Memory outputs by node name
    pub memory: IndexMap<String, MemorySink>,
}

impl ConfiguredTree {
    /// Id of a configured node.
    pub fn node(&self, name: &str) -> Result<NodeId> {
        self.nodes
            .get(name)
            .copied()
            .ok_or_else(|| FlogError::Config(format!("No log named '{}'", name)))
    }

    /// The first configured node, where messages are usually printed.
    pub fn entry(&self) -> Option<NodeId> {
        self.nodes.values().next().copied()
    }
}

impl TreeConfig {
    /// Load a configuration file and apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            FlogError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        let mut config = Self::from_yaml(&content)?;
        config.file_path = Some(path.to_path_buf());
        config.apply_env()?;
        Ok(config)
    }

    /// Load the file at [`TreeConfig::default_path`] if it exists, the
    /// defaults otherwise, then apply environment overrides.
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(path),
            _ => {
                let mut config = Self::default();
                config.apply_env()?;
                Ok(config)
            }
        }
    }

    /// Parse YAML without environment overrides.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let mut config: Self = serde_yaml::from_str(content)
            .map_err(|e| FlogError::Config(format!("Failed to parse config: {}", e)))?;
        config.layers = vec![ConfigLayer::Default, ConfigLayer::Loaded];
        Ok(config)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Write the configuration to `path`, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    /// `~/.config/flog/flog.yml`, or the platform equivalent.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("flog").join("flog.yml"))
    }

    /// File this configuration was loaded from.
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Layers that contributed values, lowest priority first.
    pub fn layers(&self) -> &[ConfigLayer] {
        if self.layers.is_empty() {
            &[ConfigLayer::Default]
        } else {
            &self.layers
        }
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let toggles: [(&str, &mut bool); 5] = [
            (ENV_TIMESTAMP, &mut self.settings.timestamp),
            (ENV_SRC_INFO, &mut self.settings.src_info),
            (ENV_TIMESTAMP_USEC, &mut self.settings.timestamp_usec),
            (ENV_SHOW_MSG_ID, &mut self.settings.show_msg_id),
            (ENV_ALLOW_NULL, &mut self.settings.allow_null_messages),
        ];

        let mut applied = false;
        for (key, target) in toggles {
            if let Some(value) = lookup(key) {
                *target = parse_bool(key, &value)?;
                applied = true;
            }
        }

        if applied && !self.layers.contains(&ConfigLayer::Environment) {
            if self.layers.is_empty() {
                self.layers.push(ConfigLayer::Default);
            }
            self.layers.push(ConfigLayer::Environment);
        }
        Ok(())
    }

    /// Check names and references.
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for log in &self.logs {
            if log.name.is_empty() {
                bail!(Config, "Log names must not be empty");
            }
            if !names.insert(log.name.as_str()) {
                bail!(Config, "Duplicate log name '{}'", log.name);
            }
        }

        for log in &self.logs {
            for child in &log.children {
                if child == &log.name {
                    bail!(Config, "Log '{}' cannot forward to itself", log.name);
                }
                if !names.contains(child.as_str()) {
                    bail!(Config, "Log '{}' forwards to unknown log '{}'", log.name, child);
                }
            }
            if let Some(error_log) = &log.error_log {
                if !names.contains(error_log.as_str()) {
                    bail!(Config, "Log '{}' uses unknown error log '{}'", log.name, error_log);
                }
            }
        }
        Ok(())
    }

    /// Create the described tree.
    pub fn build(&self) -> Result<ConfiguredTree> {
        self.validate()?;

        let mut tree = LogTree::new(self.settings.clone());
        let mut nodes = IndexMap::new();
        let mut memory = IndexMap::new();

        for log in &self.logs {
            let id = match &log.output {
                OutputConfig::None => tree.create(&log.name, log.accept),
                OutputConfig::Stdout => tree.create_stdout(&log.name, log.accept),
                OutputConfig::Stderr => tree.create_stderr(&log.name, log.accept),
                OutputConfig::File { path: Some(path) } => tree.create_file(&log.name, log.accept, path),
                OutputConfig::File { path: None } => {
                    let id = tree.create(&log.name, log.accept);
                    tree.set_sink(id, FileSink::unset())?;
                    id
                }
                OutputConfig::Memory => {
                    let sink = MemorySink::new();
                    let id = tree.create(&log.name, log.accept);
                    tree.set_sink(id, sink.clone())?;
                    memory.insert(log.name.clone(), sink);
                    id
                }
            };
            tree.set_buffer_max(id, log.buffer_max)?;
            tree.set_stop_on_error(id, log.stop_on_error)?;
            nodes.insert(log.name.clone(), id);
        }

        let lookup = |name: &str| -> Result<NodeId> {
            match nodes.get(name) {
                Some(id) => Ok(*id),
                None => bug!("Log '{}' passed validation but was not created", name),
            }
        };
        for log in &self.logs {
            let id = lookup(&log.name)?;
            for child in &log.children {
                tree.append_child(id, lookup(child)?)?;
            }
            if let Some(error_log) = &log.error_log {
                tree.set_error_log(id, Some(lookup(error_log)?))?;
            }
        }

        tracing::debug!(logs = nodes.len(), "Built log tree from configuration");
        Ok(ConfiguredTree { tree, nodes, memory })
    }

    /// A small tree showing the main features.
    ///
    /// `subfunc` forwards to `main`, which fans out to a stdout log taking
    /// only errors, a stderr log taking everything and a file log without a
    /// file, whose first failure is reported through `main`.
    pub fn demo() -> Self {
        let log = |name: &str, accept, output| LogConfig {
            name: name.to_string(),
            accept,
            output,
            buffer_max: 0,
            stop_on_error: true,
            error_log: Some("main".to_string()),
            children: Vec::new(),
        };

        let mut main = log("main", flog_types::MsgType::ACCEPT_ALL, OutputConfig::None);
        main.children = vec!["stdout".to_string(), "stderr".to_string(), "file".to_string()];
        let mut subfunc = log("subfunc", flog_types::MsgType::ACCEPT_ALL, OutputConfig::None);
        subfunc.children = vec!["main".to_string()];

        Self {
            logs: vec![
                subfunc,
                main,
                log("stdout", flog_types::MsgType::ACCEPT_ONLY_ERROR, OutputConfig::Stdout),
                log("stderr", flog_types::MsgType::ACCEPT_ALL, OutputConfig::Stderr),
                log("file", flog_types::MsgType::ACCEPT_ALL, OutputConfig::File { path: None }),
            ],
            ..Self::default()
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(FlogError::Config(format!(
            "Invalid value '{}' for {}, expected a boolean",
            other, key
        ))),
    }
}
