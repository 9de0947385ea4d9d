//! Sinks writing rendered lines to stdout and stderr.

use std::io::{self, Write};
use flog_types::{Message, MsgId};
use super::{Sink, SinkContext, SinkError};
use crate::render::errno_string;

fn write_line<W: Write>(mut out: W, line: &str, failure: MsgId) -> Result<(), SinkError> {
    out.write_all(line.as_bytes()).map_err(|e| io_failure(&e, failure))
}

fn io_failure(err: &io::Error, failure: MsgId) -> SinkError {
    let error = SinkError::from_io(err, failure);
    match err.raw_os_error() {
        Some(code) if code > 0 => error.with_detail(errno_string(code as u32)),
        _ => error.with_detail(err.to_string()),
    }
}

/// Writes every message to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl Sink for StdoutSink {
    fn write(&mut self, ctx: &SinkContext<'_>, msg: &Message) -> Result<(), SinkError> {
        match ctx.renderer.render(msg) {
            Some(line) => write_line(io::stdout().lock(), &line, MsgId::CANNOT_WRITE_TO_STDOUT),
            None => Ok(()),
        }
    }

    fn kind(&self) -> &'static str {
        "stdout"
    }
}

/// Writes every message to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl Sink for StderrSink {
    fn write(&mut self, ctx: &SinkContext<'_>, msg: &Message) -> Result<(), SinkError> {
        match ctx.renderer.render(msg) {
            Some(line) => write_line(io::stderr().lock(), &line, MsgId::CANNOT_WRITE_TO_STDERR),
            None => Ok(()),
        }
    }

    fn kind(&self) -> &'static str {
        "stderr"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from_raw_os_error(32))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_line_success() {
        let mut buf = Vec::new();
        write_line(&mut buf, "hello\n", MsgId::CANNOT_WRITE_TO_STDOUT).unwrap();
        assert_eq!(buf, b"hello\n");
    }

    #[test]
    fn test_write_line_failure_keeps_errno() {
        let err = write_line(Broken, "hello\n", MsgId::CANNOT_WRITE_TO_STDERR).unwrap_err();
        assert_eq!(err.code, 32);
        assert_eq!(err.msg_id, MsgId::CANNOT_WRITE_TO_STDERR);
        assert_eq!(err.detail, Some(errno_string(32)));
    }
}
