//! Log entry ring
//!
//! Formatted log records sit in a lock-free MPMC ring until the
//! surrounding kernel drains them to its console service. Entries are
//! fixed size; the ring never allocates and is safe to push from any
//! context, interrupt paths included. Overflow drops the new record.

use thingbuf::StaticThingBuf;

/// Maximum bytes of one entry's content (target + message).
pub const ENTRY_CONTENT_SIZE: usize = 240;

/// Entry slots in the ring.
pub const RING_SLOTS: usize = 64;

/// One formatted log record.
#[derive(Clone)]
pub struct LogEntry {
    /// Tick count of the trap entry during which the record was made.
    pub ticks: u64,
    /// Level (0=Error, 1=Warn, 2=Info, 3=Debug, 4=Trace).
    pub level: u8,
    /// Length of the target prefix inside `content`.
    pub target_len: u8,
    /// Length of the message following the target.
    pub message_len: u16,
    /// Target bytes then message bytes.
    pub content: [u8; ENTRY_CONTENT_SIZE],
}

impl Default for LogEntry {
    fn default() -> Self {
        Self {
            ticks: 0,
            level: 0,
            target_len: 0,
            message_len: 0,
            content: [0u8; ENTRY_CONTENT_SIZE],
        }
    }
}

impl LogEntry {
    /// Build a record, truncating target and message to what fits.
    pub fn new(ticks: u64, level: log::Level, target: &str, message: &str) -> Self {
        let mut entry = Self {
            ticks,
            level: level_to_u8(level),
            ..Self::default()
        };

        let target_bytes = target.as_bytes();
        let target_len = target_bytes.len().min(255).min(ENTRY_CONTENT_SIZE);
        entry.content[..target_len].copy_from_slice(&target_bytes[..target_len]);
        entry.target_len = target_len as u8;

        let message_bytes = message.as_bytes();
        let message_len = message_bytes.len().min(ENTRY_CONTENT_SIZE - target_len);
        entry.content[target_len..target_len + message_len]
            .copy_from_slice(&message_bytes[..message_len]);
        entry.message_len = message_len as u16;

        entry
    }

    /// Get the target string.
    pub fn target(&self) -> &str {
        let len = self.target_len as usize;
        core::str::from_utf8(&self.content[..len]).unwrap_or("<invalid>")
    }

    /// Get the message string.
    pub fn message(&self) -> &str {
        let start = self.target_len as usize;
        let end = start + self.message_len as usize;
        core::str::from_utf8(&self.content[start..end]).unwrap_or("<invalid>")
    }

    /// Get the level.
    pub fn level(&self) -> log::Level {
        u8_to_level(self.level)
    }
}

fn level_to_u8(level: log::Level) -> u8 {
    match level {
        log::Level::Error => 0,
        log::Level::Warn => 1,
        log::Level::Info => 2,
        log::Level::Debug => 3,
        log::Level::Trace => 4,
    }
}

/// Convert a stored level byte back to a level.
pub fn u8_to_level(val: u8) -> log::Level {
    match val {
        0 => log::Level::Error,
        1 => log::Level::Warn,
        2 => log::Level::Info,
        3 => log::Level::Debug,
        _ => log::Level::Trace,
    }
}

static RING: StaticThingBuf<LogEntry, RING_SLOTS> = StaticThingBuf::new();

/// Push a record; false when the ring is full.
pub(crate) fn push(ticks: u64, level: log::Level, target: &str, message: &str) -> bool {
    RING.push(LogEntry::new(ticks, level, target, message)).is_ok()
}

/// Pop the oldest record, `None` when the ring is empty.
pub fn pop() -> Option<LogEntry> {
    RING.pop()
}

/// Number of records waiting to be drained.
pub fn available() -> usize {
    RING.len()
}

/// Drain records into `out` as "[LEVEL] target: message" lines.
///
/// Stops when the next record would not fit; that record is lost, so
/// callers should size `out` for at least one full entry. Returns the
/// bytes written.
pub fn drain(out: &mut [u8]) -> usize {
    let mut written = 0;

    while let Some(entry) = RING.pop() {
        let level_str = match entry.level {
            0 => "[ERROR]",
            1 => "[WARN ]",
            2 => "[INFO ]",
            3 => "[DEBUG]",
            _ => "[TRACE]",
        };
        let target = entry.target();
        let message = entry.message();

        let needed = level_str.len() + 1 + target.len() + 2 + message.len() + 1;
        if written + needed > out.len() {
            break;
        }

        out[written..written + level_str.len()].copy_from_slice(level_str.as_bytes());
        written += level_str.len();

        out[written] = b' ';
        written += 1;

        out[written..written + target.len()].copy_from_slice(target.as_bytes());
        written += target.len();

        out[written..written + 2].copy_from_slice(b": ");
        written += 2;

        out[written..written + message.len()].copy_from_slice(message.as_bytes());
        written += message.len();

        out[written] = b'\n';
        written += 1;
    }

    written
}
