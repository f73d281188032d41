//! Thread control blocks

use crate::{Capability, Fault, ObjectRef};

/// Thread scheduling priority. Higher values run first.
pub type Priority = u8;

/// The highest priority a thread can hold.
pub const MAX_PRIORITY: Priority = 255;

/// Priority assigned to threads that do not request one.
pub const DEFAULT_PRIORITY: Priority = 128;

/// Scheduler-visible state of a thread.
///
/// `Restart` marks a thread whose current operation must be re-executed
/// from the beginning the next time it runs: the kernel rewinds to the
/// trap instruction instead of completing the operation now. Budget
/// exhaustion and faults both park threads here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ThreadState {
    /// Not schedulable; no operation in flight.
    Inactive = 0,
    /// Schedulable and making forward progress.
    Running = 1,
    /// Schedulable; re-executes the trapped operation when resumed.
    Restart = 2,
    /// Blocked sending on an endpoint.
    BlockedOnSend = 3,
    /// Blocked receiving on an endpoint.
    BlockedOnReceive = 4,
    /// Blocked awaiting a reply to a call.
    BlockedOnReply = 5,
    /// Blocked waiting on a notification.
    BlockedOnNotification = 6,
    /// The per-core idle thread.
    Idle = 7,
}

impl ThreadState {
    /// Convert a raw state number back to a state.
    #[must_use]
    pub const fn from_number(num: u8) -> Option<Self> {
        match num {
            0 => Some(Self::Inactive),
            1 => Some(Self::Running),
            2 => Some(Self::Restart),
            3 => Some(Self::BlockedOnSend),
            4 => Some(Self::BlockedOnReceive),
            5 => Some(Self::BlockedOnReply),
            6 => Some(Self::BlockedOnNotification),
            7 => Some(Self::Idle),
            _ => None,
        }
    }

    /// Get the state name for diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Inactive => "Inactive",
            Self::Running => "Running",
            Self::Restart => "Restart",
            Self::BlockedOnSend => "BlockedOnSend",
            Self::BlockedOnReceive => "BlockedOnReceive",
            Self::BlockedOnReply => "BlockedOnReply",
            Self::BlockedOnNotification => "BlockedOnNotification",
            Self::Idle => "Idle",
        }
    }

    /// Check if a thread in this state may be picked by the scheduler.
    #[inline]
    #[must_use]
    pub const fn is_runnable(self) -> bool {
        matches!(self, Self::Running | Self::Restart)
    }

    /// Check if a thread in this state is blocked on an IPC object.
    #[inline]
    #[must_use]
    pub const fn is_blocked(self) -> bool {
        matches!(
            self,
            Self::BlockedOnSend
                | Self::BlockedOnReceive
                | Self::BlockedOnReply
                | Self::BlockedOnNotification
        )
    }
}

/// A thread control block.
///
/// Holds the fields the dispatch core reads and writes on every trap.
/// Register state lives in the per-core execution context, not here.
#[derive(Clone, Debug)]
pub struct Tcb {
    /// Current scheduler-visible state.
    pub state: ThreadState,
    /// Scheduling context funding this thread, if any.
    pub sched_context: ObjectRef,
    /// Capability invoked to deliver this thread's faults.
    pub fault_handler: Capability,
    /// Caller slot: holds the reply capability minted when another thread
    /// calls this one. `Capability::Null` when no caller is waiting.
    pub caller: Capability,
    /// Fault being delivered to the handler, if one is in flight.
    pub pending_fault: Option<Fault>,
    /// User virtual address of the thread's IPC buffer, zero if unmapped.
    pub ipc_buffer_addr: u64,
    /// Scheduling priority.
    pub priority: Priority,
    /// Short name for diagnostics, NUL-padded UTF-8.
    pub name: [u8; 16],
}

impl Tcb {
    /// Create an inactive thread with no bindings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: ThreadState::Inactive,
            sched_context: ObjectRef::NULL,
            fault_handler: Capability::Null,
            caller: Capability::Null,
            pending_fault: None,
            ipc_buffer_addr: 0,
            priority: DEFAULT_PRIORITY,
            name: [0; 16],
        }
    }

    /// Set the diagnostic name, truncating to the field size.
    pub fn set_name(&mut self, name: &str) {
        self.name = [0; 16];
        let bytes = name.as_bytes();
        let len = bytes.len().min(16);
        self.name[..len].copy_from_slice(&bytes[..len]);
    }

    /// Get the diagnostic name as a string slice.
    #[must_use]
    pub fn name_str(&self) -> &str {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(16);
        core::str::from_utf8(&self.name[..end]).unwrap_or("<invalid>")
    }

    /// Check if this thread has a scheduling context bound.
    #[inline]
    #[must_use]
    pub const fn has_sched_context(&self) -> bool {
        !self.sched_context.is_null()
    }
}

impl Default for Tcb {
    fn default() -> Self {
        Self::new()
    }
}
