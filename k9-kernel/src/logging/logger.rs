//! The `log` facade backend
//!
//! Formats each record into a stack buffer, pushes it to the ring, and
//! echoes it to the console sink while one is installed. Formatting
//! takes no locks; the ring push is lock-free.

use core::fmt::Write;
use log::{LevelFilter, Log, Metadata, Record};

use crate::logging::buffer;
use crate::logging::{console_installed, console_put_str, last_stamp};

/// Stack buffer for formatting one record before it is pushed.
struct MessageBuffer {
    data: [u8; buffer::ENTRY_CONTENT_SIZE],
    len: usize,
}

impl MessageBuffer {
    const fn new() -> Self {
        Self {
            data: [0u8; buffer::ENTRY_CONTENT_SIZE],
            len: 0,
        }
    }

    fn as_str(&self) -> &str {
        core::str::from_utf8(&self.data[..self.len]).unwrap_or("<invalid>")
    }
}

impl Write for MessageBuffer {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let bytes = s.as_bytes();
        let remaining = buffer::ENTRY_CONTENT_SIZE - self.len;
        let to_copy = bytes.len().min(remaining);
        self.data[self.len..self.len + to_copy].copy_from_slice(&bytes[..to_copy]);
        self.len += to_copy;
        Ok(())
    }
}

struct KernelLogger;

impl Log for KernelLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let ticks = last_stamp();

        let mut msg = MessageBuffer::new();
        let _ = write!(msg, "{}", record.args());

        buffer::push(ticks, record.level(), record.target(), msg.as_str());

        if console_installed() {
            let level_str = match record.level() {
                log::Level::Error => "\x1b[31mERROR\x1b[0m",
                log::Level::Warn => "\x1b[33m WARN\x1b[0m",
                log::Level::Info => "\x1b[32m INFO\x1b[0m",
                log::Level::Debug => "\x1b[34mDEBUG\x1b[0m",
                log::Level::Trace => "\x1b[35mTRACE\x1b[0m",
            };
            let mut line = MessageBuffer::new();
            let _ = writeln!(
                line,
                "[{:>12}] {} {}: {}",
                ticks,
                level_str,
                record.target(),
                msg.as_str()
            );
            console_put_str(line.as_str());
        }
    }

    fn flush(&self) {}
}

static LOGGER: KernelLogger = KernelLogger;

/// Install the logger and set the maximum level.
///
/// Safe to call more than once; only the first call takes effect.
pub fn init(level: LevelFilter) {
    log::set_logger(&LOGGER)
        .map(|()| log::set_max_level(level))
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_buffer_truncates() {
        let mut buf = MessageBuffer::new();
        for _ in 0..30 {
            let _ = write!(buf, "0123456789");
        }
        assert_eq!(buf.len, buffer::ENTRY_CONTENT_SIZE);
        assert_eq!(buf.as_str().len(), buffer::ENTRY_CONTENT_SIZE);
        assert!(buf.as_str().starts_with("0123456789"));
    }
}
