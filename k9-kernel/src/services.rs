//! Collaborator seams
//!
//! The dispatch core decides *what* happens on a trap; the surrounding
//! kernel owns *how*. Capability-space walks, object invocation bodies,
//! IPC rendezvous, scheduling queues, the interrupt controller, and page
//! tables sit behind the traits below. Host tests implement all of them
//! with a recording mock.
//!
//! [`KernelServices`] bundles the lot; every entry point takes one `&mut`
//! implementor alongside the [`ExecContext`] borrow.

use k9_cap::{CPtr, CapLocation, Capability, Fault, LookupFault, ObjectRef, SlotRef, Ticks};
use k9_syscall::{MAX_EXTRA_CAPS, SyscallError};

use core::fmt;

use crate::context::ExecContext;

/// An interrupt line identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(transparent)]
pub struct IrqNumber(u32);

impl IrqNumber {
    /// Create an interrupt identifier from its line number.
    #[inline]
    #[must_use]
    pub const fn new(line: u32) -> Self {
        Self(line)
    }

    /// Get the line number.
    #[inline]
    #[must_use]
    pub const fn line(self) -> u32 {
        self.0
    }
}

impl fmt::Display for IrqNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The extra capabilities resolved for one invocation.
///
/// Fixed capacity; the 2-bit extra-caps field of the message-info word
/// cannot declare more than [`MAX_EXTRA_CAPS`].
#[derive(Clone, Copy, Debug)]
pub struct ExtraCaps {
    entries: [CapLocation; MAX_EXTRA_CAPS],
    len: usize,
}

impl ExtraCaps {
    /// No extra capabilities.
    pub const EMPTY: Self = Self {
        entries: [CapLocation::new(Capability::Null, SlotRef::NULL); MAX_EXTRA_CAPS],
        len: 0,
    };

    /// Append a resolved capability; false when full.
    pub fn push(&mut self, loc: CapLocation) -> bool {
        if self.len == MAX_EXTRA_CAPS {
            return false;
        }
        self.entries[self.len] = loc;
        self.len += 1;
        true
    }

    /// Number of resolved capabilities.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// True when no extra capabilities were declared.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get entry `index`, `None` past the end.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&CapLocation> {
        self.entries[..self.len].get(index)
    }

    /// Iterate the resolved capabilities in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &CapLocation> {
        self.entries[..self.len].iter()
    }
}

impl Default for ExtraCaps {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Result of decoding and invoking a capability.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use = "the outcome decides replies and preemption handling"]
pub enum InvocationOutcome {
    /// The operation ran to completion, or blocked the thread itself.
    Completed,
    /// Decode refused the operation; call forms get the error replied.
    Failed(SyscallError),
    /// A pending interrupt cut the operation short. The syscall will be
    /// re-executed from the top on the thread's next entry; resumption
    /// state belongs to the invoked subsystem.
    Preempted,
}

/// Why a fault could not be delivered to a handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaultDelivery {
    /// The thread has no fault handler registered.
    NoHandler,
    /// The registered handler capability is not a sendable endpoint.
    BadHandler,
}

/// Kernel time source, sampled once per gated trap.
pub trait Clock {
    /// Current time in ticks. Monotonic.
    fn now(&mut self) -> Ticks;
}

/// Capability-space resolution for the current thread.
pub trait CapSpace {
    /// Resolve `cptr` in `thread`'s capability space to a capability and
    /// the slot holding it.
    fn lookup_cap(&mut self, thread: ObjectRef, cptr: CPtr) -> Result<CapLocation, LookupFault>;

    /// Resolve the `count` extra capabilities named in the current
    /// thread's IPC buffer.
    ///
    /// A failure names the extra capability pointer that did not resolve;
    /// the pipeline raises the capability fault against that pointer, not
    /// the invoked one.
    fn lookup_extra_caps(
        &mut self,
        ctx: &ExecContext<'_>,
        count: usize,
    ) -> Result<ExtraCaps, (CPtr, LookupFault)>;
}

/// Decode and execution of capability invocations.
pub trait ObjectInvoker {
    /// Decode the message against `dest` and perform the operation.
    ///
    /// Contract: a restartable operation sets the thread to `Restart`
    /// before starting; an operation that blocks sets the blocked state
    /// itself; a decode error leaves the state untouched.
    #[allow(clippy::too_many_arguments)]
    fn decode_invoke(
        &mut self,
        ctx: &mut ExecContext<'_>,
        dest: CapLocation,
        extras: &ExtraCaps,
        label: u64,
        length: usize,
        is_call: bool,
        is_blocking: bool,
    ) -> InvocationOutcome;
}

/// IPC rendezvous bodies: queue surgery, payload copy, fault marshalling.
pub trait IpcTransfer {
    /// Transfer the reply payload from the current thread to `target`
    /// and wake it.
    fn reply_transfer(&mut self, ctx: &mut ExecContext<'_>, target: ObjectRef, grant: bool);

    /// Receive on an endpoint, blocking or polling.
    fn receive_endpoint(&mut self, ctx: &mut ExecContext<'_>, ep: ObjectRef, is_blocking: bool);

    /// Wait on a notification, blocking or polling.
    fn receive_signal(&mut self, ctx: &mut ExecContext<'_>, ntfn: ObjectRef, is_blocking: bool);

    /// Deliver `fault` to the current thread's registered fault handler.
    fn deliver_fault(
        &mut self,
        ctx: &mut ExecContext<'_>,
        fault: Fault,
    ) -> Result<(), FaultDelivery>;
}

/// Ready queues, the release queue, and thread selection.
pub trait Scheduler {
    /// Pick the next thread to run.
    fn schedule(&mut self);

    /// Install the picked thread on this core.
    fn activate(&mut self, ctx: &mut ExecContext<'_>);

    /// Request a scheduling decision before the return to user level.
    fn reschedule(&mut self);

    /// Append `thread` to the back of its priority's ready queue.
    fn append_ready(&mut self, thread: ObjectRef);

    /// Park `thread` until its scheduling context replenishes.
    fn postpone(&mut self, thread: ObjectRef);

    /// Whether `thread` currently sits in a ready queue.
    fn is_queued(&self, thread: ObjectRef) -> bool;
}

/// Interrupt controller access.
pub trait IrqControl {
    /// Acknowledge and return the active interrupt, if any.
    fn active_irq(&mut self) -> Option<IrqNumber>;

    /// Deliver one interrupt to its handling subsystem.
    fn handle_irq(&mut self, irq: IrqNumber);

    /// Hook for an entry with no active interrupt.
    fn spurious_irq(&mut self) {}
}

/// In-kernel VM fault resolution, tried before handler escalation.
pub trait VmHandler {
    /// Try to resolve the fault without involving the fault handler.
    #[allow(clippy::result_unit_err)]
    fn resolve_vm_fault(
        &mut self,
        ctx: &mut ExecContext<'_>,
        addr: u64,
        instruction: bool,
    ) -> Result<(), ()>;
}

/// Everything the dispatch core needs from the surrounding kernel.
pub trait KernelServices:
    Clock + CapSpace + ObjectInvoker + IpcTransfer + Scheduler + IrqControl + VmHandler
{
}

impl<T> KernelServices for T where
    T: Clock + CapSpace + ObjectInvoker + IpcTransfer + Scheduler + IrqControl + VmHandler
{
}
