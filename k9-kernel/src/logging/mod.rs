//! Kernel logging
//!
//! Log records go two places: a lock-free ring of formatted entries for
//! the surrounding kernel to drain to userspace, and an optional console
//! sink echoed line by line while one is installed. The `log` crate
//! macros are the only producer interface; [`init`] wires them up.
//!
//! Records are stamped with the tick count of the latest trap entry
//! rather than a fresh timer read, so logging never touches the clock.

pub mod buffer;
mod logger;

use core::sync::atomic::{AtomicU64, Ordering};

pub use buffer::{available, drain, pop, u8_to_level, LogEntry, ENTRY_CONTENT_SIZE, RING_SLOTS};
pub use logger::init;

/// A byte sink for console echo.
///
/// Implemented over whatever UART or semihosting channel the platform
/// provides. Installed once during early boot; before that, echo is
/// silently skipped and records only reach the ring.
pub trait ConsoleSink: Sync {
    /// Write one byte. Must not block indefinitely.
    fn put_char(&self, byte: u8);
}

static CONSOLE: spin::Once<&'static dyn ConsoleSink> = spin::Once::new();

/// Install the console sink. The first installation wins.
pub fn install_console(sink: &'static dyn ConsoleSink) {
    CONSOLE.call_once(|| sink);
}

pub(crate) fn console_installed() -> bool {
    CONSOLE.get().is_some()
}

/// Write one byte to the console, if one is installed.
pub fn console_put_char(byte: u8) {
    if let Some(sink) = CONSOLE.get() {
        sink.put_char(byte);
    }
}

pub(crate) fn console_put_str(s: &str) {
    if let Some(sink) = CONSOLE.get() {
        for byte in s.bytes() {
            sink.put_char(byte);
        }
    }
}

// Tick count of the latest trap entry, stored by the budget gate.
static LAST_STAMP: AtomicU64 = AtomicU64::new(0);

pub(crate) fn stamp_time(ticks: u64) {
    LAST_STAMP.store(ticks, Ordering::Relaxed);
}

pub(crate) fn last_stamp() -> u64 {
    LAST_STAMP.load(Ordering::Relaxed)
}
