//! Per-core execution context
//!
//! Everything one trap is allowed to touch, gathered into a single borrow.
//! The architecture trap stub builds an [`ExecContext`] on entry from the
//! per-core state it owns (current thread, saved registers, mapped IPC
//! buffer) and tears it down on exit; while the kernel runs, the context
//! is the only route to the current thread.

use k9_cap::{ObjectRef, SchedContext, Tcb, Ticks};
use k9_syscall::{IpcBuffer, MSG_REGISTERS};

use core::fmt;

/// Identity of an execution core.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct CoreId(u32);

impl CoreId {
    /// Create a core identity from its index.
    #[inline]
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get the core index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for CoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CoreId({})", self.0)
    }
}

impl fmt::Display for CoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Saved user-level register file, as the trap stub hands it over.
///
/// Register convention:
///
/// - `gpr[0]`: capability pointer on entry; badge or instrumentation
///   result on return
/// - `gpr[1]`: message-info word
/// - `gpr[2..6]`: message registers (`MSG_REGISTERS` of them)
/// - `gpr[6]`, `gpr[7]`: syscall-specific extras
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UserContext {
    /// General-purpose argument registers.
    pub gpr: [u64; 8],
    /// Program counter at the trap instruction.
    pub pc: u64,
}

impl UserContext {
    /// Create a zeroed register file.
    #[must_use]
    pub const fn new() -> Self {
        Self { gpr: [0; 8], pc: 0 }
    }

    /// Read the capability-pointer register.
    #[inline]
    #[must_use]
    pub const fn cap_reg(&self) -> u64 {
        self.gpr[0]
    }

    /// Write the capability/badge/result register.
    #[inline]
    pub fn set_cap_reg(&mut self, value: u64) {
        self.gpr[0] = value;
    }

    /// Read the message-info register.
    #[inline]
    #[must_use]
    pub const fn msg_info_reg(&self) -> u64 {
        self.gpr[1]
    }

    /// Write the message-info register.
    #[inline]
    pub fn set_msg_info_reg(&mut self, value: u64) {
        self.gpr[1] = value;
    }

    /// Read message register `index`.
    #[inline]
    #[must_use]
    pub const fn msg_reg(&self, index: usize) -> u64 {
        debug_assert!(index < MSG_REGISTERS);
        self.gpr[2 + index]
    }

    /// Write message register `index`.
    #[inline]
    pub fn set_msg_reg(&mut self, index: usize, value: u64) {
        debug_assert!(index < MSG_REGISTERS);
        self.gpr[2 + index] = value;
    }
}

impl Default for UserContext {
    fn default() -> Self {
        Self::new()
    }
}

/// The state one trap borrows exclusively, for exactly one kernel entry.
///
/// `cur_time` and `consumed` are the per-core billing accumulators; the
/// embedder persists them across traps and copies them back on exit. The
/// thread, its scheduling context, and its register file are mutably
/// borrowed for the whole entry, which is what makes mid-pipeline
/// reentry unrepresentable.
pub struct ExecContext<'a> {
    /// The core this trap arrived on.
    pub core: CoreId,
    /// The current thread's identity.
    pub current: ObjectRef,
    /// The current thread's control block.
    pub thread: &'a mut Tcb,
    /// The scheduling context funding the current thread.
    pub sched: &'a mut SchedContext,
    /// The saved user register file.
    pub regs: &'a mut UserContext,
    /// The thread's IPC buffer, if one is mapped.
    pub ipc_buffer: Option<&'a mut IpcBuffer>,
    /// Time of the last timestamp update on this core.
    pub cur_time: Ticks,
    /// Ticks consumed since the last budget charge.
    pub consumed: Ticks,
}

impl ExecContext<'_> {
    /// Whether the current thread has an IPC buffer mapped.
    #[inline]
    #[must_use]
    pub fn has_ipc_buffer(&self) -> bool {
        self.ipc_buffer.is_some()
    }
}
