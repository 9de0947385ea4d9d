//! Sink appending rendered lines to a file.
//!
//! The file is opened in append mode for every message and closed again
//! right after, so it can be moved or truncated by other tools while the
//! program keeps running.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use flog_types::{Message, MsgId};
use super::{Sink, SinkContext, SinkError};
use crate::render::errno_string;

/// Appends every message to a file.
#[derive(Debug, Clone, Default)]
pub struct FileSink {
    path: Option<PathBuf>,
}

impl FileSink {
    /// Create a sink writing to `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
        }
    }

    /// Create a sink without a file; every write fails until a path is set.
    pub fn unset() -> Self {
        Self { path: None }
    }

    /// The configured path.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Change the target file.
    pub fn set_path(&mut self, path: impl AsRef<Path>) {
        self.path = Some(path.as_ref().to_path_buf());
    }

    fn failure(path: &Path, err: &std::io::Error, msg_id: MsgId) -> SinkError {
        let reason = match err.raw_os_error() {
            Some(code) if code > 0 => errno_string(code as u32),
            _ => err.to_string(),
        };
        SinkError::from_io(err, msg_id).with_detail(format!("{} ({})", path.display(), reason))
    }
}

impl Sink for FileSink {
    fn write(&mut self, ctx: &SinkContext<'_>, msg: &Message) -> Result<(), SinkError> {
        let path = match &self.path {
            Some(path) => path,
            None => return Err(SinkError::new(-1, MsgId::SET_OUTPUT_FILE)),
        };

        let line = match ctx.renderer.render(msg) {
            Some(line) => line,
            None => return Ok(()),
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| Self::failure(path, &e, MsgId::CANNOT_OPEN_FILE))?;

        file.write_all(line.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| Self::failure(path, &e, MsgId::CANNOT_WRITE_FILE))
    }

    fn kind(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Renderer;
    use flog_types::{FlogConfig, MsgIdTable, MsgType, NodeId};
    use tempfile::TempDir;

    fn write(sink: &mut FileSink, msg: &Message) -> Result<(), SinkError> {
        let config = FlogConfig {
            timestamp: false,
            src_info: false,
            ..FlogConfig::default()
        };
        let ids = MsgIdTable::new();
        let ctx = SinkContext {
            node: NodeId::from_raw(0),
            name: Some("file"),
            renderer: Renderer::new(&config, &ids),
        };
        sink.write(&ctx, msg)
    }

    #[test]
    fn test_appends_lines() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("flog.log");
        let mut sink = FileSink::new(&path);

        write(&mut sink, &Message::new(MsgType::ERROR).with_text("first")).unwrap();
        write(&mut sink, &Message::new(MsgType::INFO).with_subsystem("file").with_text("second")).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Error: first\n[file] second\n");
    }

    #[test]
    fn test_missing_path() {
        let mut sink = FileSink::unset();
        let err = write(&mut sink, &Message::new(MsgType::ERROR).with_text("lost")).unwrap_err();
        assert_eq!(err.code, -1);
        assert_eq!(err.msg_id, MsgId::SET_OUTPUT_FILE);
    }

    #[test]
    fn test_set_path_after_unset() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("late.log");
        let mut sink = FileSink::unset();
        assert!(sink.path().is_none());
        assert!(write(&mut sink, &Message::new(MsgType::ERROR).with_text("lost")).is_err());

        sink.set_path(&path);
        assert_eq!(sink.path(), Some(path.as_path()));
        write(&mut sink, &Message::new(MsgType::ERROR).with_text("kept")).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Error: kept\n");
    }

    #[test]
    fn test_open_failure_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("no-such-dir").join("flog.log");
        let mut sink = FileSink::new(&path);

        let err = write(&mut sink, &Message::new(MsgType::ERROR).with_text("lost")).unwrap_err();
        assert_eq!(err.msg_id, MsgId::CANNOT_OPEN_FILE);
        assert!(err.code > 0);
        assert!(err.detail.unwrap().starts_with(&path.display().to_string()));
    }
}
