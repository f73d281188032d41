//! IPC buffer
//!
//! A per-thread shared memory region for message payload beyond the four
//! message registers. Word 0 mirrors the message-info word; the payload
//! words follow; the tail carries the capability-transfer fields.
//!
//! The kernel only touches the buffer of the current thread, through the
//! mapping resolved at kernel entry. Whether a thread has a buffer at all
//! is optional; operations that need one fail with `IllegalOperation`
//! when it is absent.

/// Maximum number of payload words in the buffer.
pub const MSG_MAX_LENGTH: usize = 120;

/// Maximum number of extra capabilities per message (2-bit field).
pub const MAX_EXTRA_CAPS: usize = 3;

/// Size of the IPC buffer in bytes.
pub const IPC_BUFFER_SIZE: usize = 1024;

/// IPC buffer layout.
///
/// Exactly 128 words. The kernel reads `extra_caps` during send-phase
/// lookup and writes `badges` on delivery; everything else is message
/// payload owned by whichever side is currently transferring.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct IpcBuffer {
    /// Mirror of the message-info word.
    pub info: u64,
    /// Message payload beyond the message registers.
    pub msg: [u64; MSG_MAX_LENGTH],
    /// Capability pointers to transfer with the message (send phase).
    pub extra_caps: [u64; MAX_EXTRA_CAPS],
    /// Badges of capabilities unwrapped on delivery (receive phase).
    pub badges: [u64; MAX_EXTRA_CAPS],
    /// Capability pointer naming the slot where received caps land.
    pub recv_slot: u64,
}

impl IpcBuffer {
    /// Create a new zeroed IPC buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            info: 0,
            msg: [0; MSG_MAX_LENGTH],
            extra_caps: [0; MAX_EXTRA_CAPS],
            badges: [0; MAX_EXTRA_CAPS],
            recv_slot: 0,
        }
    }

    /// Read a payload word, `None` past the end.
    #[inline]
    #[must_use]
    pub fn word(&self, index: usize) -> Option<u64> {
        self.msg.get(index).copied()
    }

    /// Write a payload word; out-of-range writes are ignored.
    #[inline]
    pub fn set_word(&mut self, index: usize, value: u64) {
        if let Some(slot) = self.msg.get_mut(index) {
            *slot = value;
        }
    }
}

impl Default for IpcBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// The buffer must stay exactly one kernel-visible block.
const _: () = assert!(
    core::mem::size_of::<IpcBuffer>() == IPC_BUFFER_SIZE,
    "IpcBuffer layout drifted"
);

const _: () = assert!(
    core::mem::align_of::<IpcBuffer>() == 8,
    "IpcBuffer must be word-aligned"
);
