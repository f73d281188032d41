//! Syscall numbers
//!
//! Defines the syscall ABI for the K9 microkernel. Following seL4 conventions:
//! - r7: syscall number
//! - r0: capability pointer (badge on delivery)
//! - r1: message info
//! - r2-r5: message registers
//!
//! Numbers outside the [`Syscall`] range are handed to the unknown-syscall
//! path; the debug/benchmark numbers in [`DebugCall`] live there so that a
//! release kernel treats them like any other unknown number.

/// Syscall numbers.
///
/// Low numbers are reserved for high-frequency IPC operations.
#[repr(u64)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Syscall {
    /// Send message to a capability (blocks until delivered).
    Send = 0,
    /// Receive message from an endpoint or notification (blocks).
    Recv = 1,
    /// Combined send + wait for reply (call pattern).
    Call = 2,
    /// Reply to caller then wait for the next message.
    ReplyRecv = 3,
    /// Non-blocking send (dropped if it would block).
    NBSend = 4,
    /// Non-blocking receive (polls).
    NBRecv = 5,
    /// Yield the remaining budget to the scheduler.
    Yield = 6,
    /// Reply to caller without waiting.
    Reply = 7,
}

impl Syscall {
    /// Try to convert from a raw syscall number.
    ///
    /// Returns `None` for every number outside the table; the kernel routes
    /// those through the unknown-syscall entry instead of this dispatch.
    pub fn from_number(num: u64) -> Option<Self> {
        match num {
            0 => Some(Self::Send),
            1 => Some(Self::Recv),
            2 => Some(Self::Call),
            3 => Some(Self::ReplyRecv),
            4 => Some(Self::NBSend),
            5 => Some(Self::NBRecv),
            6 => Some(Self::Yield),
            7 => Some(Self::Reply),
            _ => None,
        }
    }

    /// Get the syscall name for logging.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Send => "Send",
            Self::Recv => "Recv",
            Self::Call => "Call",
            Self::ReplyRecv => "ReplyRecv",
            Self::NBSend => "NBSend",
            Self::NBRecv => "NBRecv",
            Self::Yield => "Yield",
            Self::Reply => "Reply",
        }
    }

    /// Whether this syscall expects a reply (call form).
    ///
    /// Only call-form invocations receive synchronous kernel replies on
    /// decode errors or empty success.
    #[inline]
    #[must_use]
    pub const fn is_call(self) -> bool {
        matches!(self, Self::Call)
    }

    /// Whether this syscall may block the calling thread.
    ///
    /// Non-blocking forms drop the operation instead of faulting when the
    /// invoked capability cannot be resolved.
    #[inline]
    #[must_use]
    pub const fn is_blocking(self) -> bool {
        match self {
            Self::Send | Self::Recv | Self::Call | Self::ReplyRecv => true,
            Self::NBSend | Self::NBRecv => false,
            // Reply and Yield never reach a blocking decision point.
            Self::Reply | Self::Yield => false,
        }
    }
}

/// Debug and benchmark syscall numbers.
///
/// These are deliberately placed outside the [`Syscall`] range: they reach
/// the kernel as unknown syscalls and are intercepted there when the
/// kernel is built with the `instrument` feature. Without the feature they
/// fault like any other bad number.
#[repr(u64)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebugCall {
    /// Clear the kernel event log and resume recording.
    EventReset = 240,
    /// Stop event recording; returns the entry count in r0.
    EventFinalize = 241,
    /// Copy event log entries into the caller's IPC buffer.
    EventDump = 242,
    /// Return the event log entry count in r0.
    EventSize = 243,
    /// Identify the capability named by r0; returns its type tag in r0.
    CapIdentify = 252,
    /// Halt the kernel.
    Halt = 253,
    /// Write the low byte of r0 to the kernel console.
    PutChar = 255,
}

impl DebugCall {
    /// Try to convert from a raw syscall number.
    pub fn from_number(num: u64) -> Option<Self> {
        match num {
            240 => Some(Self::EventReset),
            241 => Some(Self::EventFinalize),
            242 => Some(Self::EventDump),
            243 => Some(Self::EventSize),
            252 => Some(Self::CapIdentify),
            253 => Some(Self::Halt),
            255 => Some(Self::PutChar),
            _ => None,
        }
    }

    /// Get the name for logging.
    pub const fn name(self) -> &'static str {
        match self {
            Self::EventReset => "EventReset",
            Self::EventFinalize => "EventFinalize",
            Self::EventDump => "EventDump",
            Self::EventSize => "EventSize",
            Self::CapIdentify => "CapIdentify",
            Self::Halt => "Halt",
            Self::PutChar => "PutChar",
        }
    }
}
