//! Debug and benchmark syscall interception
//!
//! With the `instrument` feature enabled, syscall numbers in the
//! [`DebugCall`] range are intercepted before the budget gate and served
//! from here; the kernel also keeps a fixed-size log of trap entries for
//! offline analysis. Without the feature every debug number is an
//! unknown syscall and faults normally.
//!
//! Interception happens before `update_timestamp`, so debug traffic is
//! never billed to the calling thread's budget.

use crate::context::ExecContext;
use crate::services::KernelServices;

#[cfg(feature = "instrument")]
use k9_cap::CPtr;
#[cfg(feature = "instrument")]
use k9_syscall::{DebugCall, SyscallError, MSG_MAX_LENGTH};

/// Kind tag of one recorded trap entry.
#[repr(u64)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    /// A syscall trap; the value is the syscall number.
    Syscall = 1,
    /// An interrupt trap; the value is the interrupt line.
    Interrupt = 2,
    /// An unknown-syscall trap; the value is the raw word.
    UnknownSyscall = 3,
    /// A user-level exception; the value is the exception number.
    UserFault = 4,
    /// A VM fault; the value is the faulting address.
    VmFault = 5,
}

/// Entries the trap log can hold before it drops new ones.
#[cfg(feature = "instrument")]
pub const EVENT_LOG_CAPACITY: usize = 256;

/// One recorded trap entry.
#[cfg(feature = "instrument")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventEntry {
    /// What kind of trap this was.
    pub kind: EventKind,
    /// Kind-specific detail word.
    pub value: u64,
}

/// Fixed-capacity trap entry log. Full means new entries are dropped,
/// never overwritten; a dump after a burst shows the start of the burst.
#[cfg(feature = "instrument")]
struct EventLog {
    entries: [EventEntry; EVENT_LOG_CAPACITY],
    len: usize,
    recording: bool,
}

#[cfg(feature = "instrument")]
impl EventLog {
    const fn new() -> Self {
        Self {
            entries: [EventEntry {
                kind: EventKind::Syscall,
                value: 0,
            }; EVENT_LOG_CAPACITY],
            len: 0,
            recording: false,
        }
    }

    fn note(&mut self, kind: EventKind, value: u64) {
        if !self.recording || self.len == EVENT_LOG_CAPACITY {
            return;
        }
        self.entries[self.len] = EventEntry { kind, value };
        self.len += 1;
    }

    fn reset(&mut self) {
        self.len = 0;
        self.recording = true;
    }

    fn finalize(&mut self) -> usize {
        self.recording = false;
        self.len
    }
}

#[cfg(feature = "instrument")]
static EVENT_LOG: spin::Mutex<EventLog> = spin::Mutex::new(EventLog::new());

/// Record one trap entry. Dropped unless recording is on.
#[cfg(feature = "instrument")]
pub fn note_entry(kind: EventKind, value: u64) {
    EVENT_LOG.lock().note(kind, value);
}

/// Trap entry recording is compiled out.
#[cfg(not(feature = "instrument"))]
#[inline]
pub fn note_entry(_kind: EventKind, _value: u64) {}

/// Serve `word` as a debug call if it is one; true when intercepted.
///
/// An intercepted call bypasses the budget gate and the fault path
/// entirely: the result goes in the capability register and the thread
/// continues as if the trap never happened.
#[cfg(feature = "instrument")]
pub fn intercept<S: KernelServices>(
    ctx: &mut ExecContext<'_>,
    services: &mut S,
    word: u64,
) -> bool {
    let Some(call) = DebugCall::from_number(word) else {
        return false;
    };
    log::trace!("{} from {}", call.name(), ctx.thread.name_str());
    match call {
        DebugCall::PutChar => {
            crate::logging::console_put_char(ctx.regs.cap_reg() as u8);
        }
        DebugCall::Halt => crate::fatal::halt(),
        DebugCall::CapIdentify => {
            let cptr = CPtr::from_raw(ctx.regs.cap_reg());
            let tag = match services.lookup_cap(ctx.current, cptr) {
                Ok(loc) => loc.cap.tag(),
                Err(_) => 0,
            };
            ctx.regs.set_cap_reg(tag);
        }
        DebugCall::EventReset => {
            EVENT_LOG.lock().reset();
        }
        DebugCall::EventFinalize => {
            let count = EVENT_LOG.lock().finalize();
            ctx.regs.set_cap_reg(count as u64);
        }
        DebugCall::EventSize => {
            let count = EVENT_LOG.lock().len;
            ctx.regs.set_cap_reg(count as u64);
        }
        DebugCall::EventDump => match dump_events(ctx) {
            Ok(count) => ctx.regs.set_cap_reg(count as u64),
            Err(err) => crate::entry::invoke::write_error_reply(ctx, &err),
        },
    }
    true
}

/// Debug calls are compiled out; nothing is intercepted.
#[cfg(not(feature = "instrument"))]
#[inline]
pub fn intercept<S: KernelServices>(
    _ctx: &mut ExecContext<'_>,
    _services: &mut S,
    _word: u64,
) -> bool {
    false
}

/// Copy log entries into the caller's IPC buffer as (kind, value) pairs.
///
/// The capability register names the first entry; at most half a message
/// of pairs fits per dump. Returns the number of entries written.
#[cfg(feature = "instrument")]
fn dump_events(ctx: &mut ExecContext<'_>) -> Result<usize, SyscallError> {
    if !ctx.has_ipc_buffer() {
        return Err(SyscallError::IllegalOperation);
    }
    let start = ctx.regs.cap_reg() as usize;
    let log = EVENT_LOG.lock();
    if start > log.len {
        return Err(SyscallError::InvalidArgument { index: 0 });
    }
    let count = core::cmp::min(log.len - start, MSG_MAX_LENGTH / 2);
    if let Some(buffer) = ctx.ipc_buffer.as_deref_mut() {
        for (i, entry) in log.entries[start..start + count].iter().enumerate() {
            buffer.set_word(2 * i, entry.kind as u64);
            buffer.set_word(2 * i + 1, entry.value);
        }
    }
    Ok(count)
}

#[cfg(all(test, feature = "instrument"))]
mod tests {
    use super::*;
    use crate::logging::{install_console, ConsoleSink};
    use crate::testing::{endpoint_cap, ExecFixture, MockKernel};
    use core::sync::atomic::{AtomicU8, Ordering};
    use k9_cap::{CapRights, LookupFault};
    use k9_syscall::{ErrorCode, MessageInfo};

    #[test]
    fn test_log_note_reset_finalize() {
        let mut log = EventLog::new();
        log.note(EventKind::Syscall, 2);
        assert_eq!(log.len, 0);

        log.reset();
        log.note(EventKind::Syscall, 2);
        log.note(EventKind::Interrupt, 7);
        assert_eq!(log.len, 2);
        assert_eq!(
            log.entries[1],
            EventEntry {
                kind: EventKind::Interrupt,
                value: 7
            }
        );

        assert_eq!(log.finalize(), 2);
        log.note(EventKind::Syscall, 2);
        assert_eq!(log.len, 2);
    }

    #[test]
    fn test_log_full_drops_new_entries() {
        let mut log = EventLog::new();
        log.reset();
        for i in 0..EVENT_LOG_CAPACITY + 10 {
            log.note(EventKind::Syscall, i as u64);
        }
        assert_eq!(log.len, EVENT_LOG_CAPACITY);
        assert_eq!(log.entries[EVENT_LOG_CAPACITY - 1].value, 255);
    }

    // The one test driving the shared static log. Concurrent tests may
    // append while recording is on, so counts are lower bounds and the
    // dump is scanned for our entries rather than compared whole.
    #[test]
    fn test_event_syscalls_lifecycle() {
        let mut fx = ExecFixture::new();
        fx.with_buffer = true;
        let mut mock = MockKernel::new();

        let mut ctx = fx.ctx();
        assert!(intercept(&mut ctx, &mut mock, DebugCall::EventReset as u64));
        note_entry(EventKind::UserFault, 0xaaa1);
        note_entry(EventKind::UserFault, 0xaaa2);
        note_entry(EventKind::UserFault, 0xaaa3);

        assert!(intercept(&mut ctx, &mut mock, DebugCall::EventSize as u64));
        assert!(ctx.regs.cap_reg() >= 3);

        assert!(intercept(
            &mut ctx,
            &mut mock,
            DebugCall::EventFinalize as u64
        ));
        let total = ctx.regs.cap_reg();
        assert!(total >= 3);

        // Recording stopped: no further growth.
        note_entry(EventKind::UserFault, 0xaaa4);
        ctx.regs.set_cap_reg(0);
        assert!(intercept(&mut ctx, &mut mock, DebugCall::EventSize as u64));
        assert_eq!(ctx.regs.cap_reg(), total);

        // Dump from 0 and find our three entries, in order.
        ctx.regs.set_cap_reg(0);
        assert!(intercept(&mut ctx, &mut mock, DebugCall::EventDump as u64));
        let written = ctx.regs.cap_reg() as usize;
        assert!(written >= 3);
        let buffer = ctx.ipc_buffer.as_deref_mut().unwrap();
        let mut wanted = 0xaaa1;
        for i in 0..written {
            let kind = buffer.word(2 * i).unwrap();
            let value = buffer.word(2 * i + 1).unwrap();
            if kind == EventKind::UserFault as u64 && value == wanted {
                wanted += 1;
            }
        }
        assert_eq!(wanted, 0xaaa4);

        // Start past the end is refused.
        ctx.regs.set_cap_reg(total + 1);
        assert!(intercept(&mut ctx, &mut mock, DebugCall::EventDump as u64));
        let reply = MessageInfo::from_word(ctx.regs.msg_info_reg());
        assert_eq!(reply.label(), ErrorCode::InvalidArgument as u64);
    }

    #[test]
    fn test_event_dump_needs_ipc_buffer() {
        let mut fx = ExecFixture::new();
        let mut mock = MockKernel::new();

        let mut ctx = fx.ctx();
        assert!(intercept(&mut ctx, &mut mock, DebugCall::EventDump as u64));
        let reply = MessageInfo::from_word(ctx.regs.msg_info_reg());
        assert_eq!(reply.label(), ErrorCode::IllegalOperation as u64);
    }

    #[test]
    fn test_cap_identify_returns_tag() {
        let mut fx = ExecFixture::new();
        fx.regs.set_cap_reg(0x40);
        let mut mock = MockKernel::new();
        mock.lookup_result = Ok(endpoint_cap(CapRights::RW));

        let mut ctx = fx.ctx();
        assert!(intercept(&mut ctx, &mut mock, DebugCall::CapIdentify as u64));
        assert_eq!(ctx.regs.cap_reg(), 1);
    }

    #[test]
    fn test_cap_identify_null_on_lookup_failure() {
        let mut fx = ExecFixture::new();
        fx.regs.set_cap_reg(0x40);
        let mut mock = MockKernel::new();
        mock.lookup_result = Err(LookupFault::InvalidRoot);

        let mut ctx = fx.ctx();
        assert!(intercept(&mut ctx, &mut mock, DebugCall::CapIdentify as u64));
        assert_eq!(ctx.regs.cap_reg(), 0);
        // Identification never faults the caller.
        assert_eq!(mock.deliveries, 0);
    }

    struct RecordingSink {
        last: AtomicU8,
    }

    impl ConsoleSink for RecordingSink {
        fn put_char(&self, byte: u8) {
            self.last.store(byte, Ordering::Relaxed);
        }
    }

    static SINK: RecordingSink = RecordingSink {
        last: AtomicU8::new(0),
    };

    #[test]
    fn test_put_char_reaches_console() {
        install_console(&SINK);
        let mut fx = ExecFixture::new();
        fx.regs.set_cap_reg(u64::from(b'k'));
        let mut mock = MockKernel::new();

        let mut ctx = fx.ctx();
        assert!(intercept(&mut ctx, &mut mock, DebugCall::PutChar as u64));
        assert_eq!(SINK.last.load(Ordering::Relaxed), b'k');
    }

    #[test]
    fn test_non_debug_word_not_intercepted() {
        let mut fx = ExecFixture::new();
        let mut mock = MockKernel::new();

        let mut ctx = fx.ctx();
        assert!(!intercept(&mut ctx, &mut mock, 0x30));
        assert!(!intercept(&mut ctx, &mut mock, 8));
    }

    #[test]
    #[should_panic(expected = "kernel halted")]
    fn test_halt_panics() {
        let mut fx = ExecFixture::new();
        let mut mock = MockKernel::new();

        let mut ctx = fx.ctx();
        intercept(&mut ctx, &mut mock, DebugCall::Halt as u64);
    }
}
