//! Shared test fixtures
//!
//! One recording mock stands in for the whole surrounding kernel, and
//! one fixture owns the state an [`ExecContext`] borrows. Tests set the
//! scripted results they care about and read the recorders afterwards.

use k9_cap::{
    Badge, CPtr, CapLocation, CapRights, Capability, Fault, LookupFault, ObjectRef, SchedContext,
    SlotRef, Tcb, ThreadState, Ticks,
};
use k9_syscall::IpcBuffer;

use crate::context::{CoreId, ExecContext, UserContext};
use crate::services::{
    CapSpace, Clock, ExtraCaps, FaultDelivery, InvocationOutcome, IpcTransfer, IrqControl,
    IrqNumber, ObjectInvoker, Scheduler, VmHandler,
};

/// What `decode_invoke` saw.
#[derive(Clone, Copy, Debug)]
pub(crate) struct InvokeRecord {
    pub label: u64,
    pub length: usize,
    pub is_call: bool,
    pub is_blocking: bool,
    pub extras_len: usize,
}

/// Recording implementation of every collaborator trait.
///
/// Scripted results are plain public fields; recorders likewise. The
/// default script resolves every lookup to a null capability, completes
/// every invocation, delivers every fault, and resolves every VM fault.
pub(crate) struct MockKernel {
    pub now: Ticks,
    pub lookup_result: Result<CapLocation, LookupFault>,
    pub extras_result: Result<ExtraCaps, (CPtr, LookupFault)>,
    pub invoke_outcome: InvocationOutcome,
    pub invoke_blocks: bool,
    pub deliver_result: Result<(), FaultDelivery>,
    pub vm_resolves: bool,
    pub queued: bool,
    pub pending_irq: Option<IrqNumber>,

    pub lookups: usize,
    pub last_cptr: Option<CPtr>,
    pub extra_lookups: usize,
    pub invokes: usize,
    pub last_invoke: Option<InvokeRecord>,
    pub reply_transfers: usize,
    pub last_reply: Option<(ObjectRef, bool)>,
    pub endpoint_recvs: usize,
    pub last_endpoint_recv: Option<(ObjectRef, bool)>,
    pub signal_recvs: usize,
    pub last_signal_recv: Option<(ObjectRef, bool)>,
    pub deliveries: usize,
    pub delivered: Option<Fault>,
    pub schedules: usize,
    pub activations: usize,
    pub reschedules: usize,
    pub appended: Option<ObjectRef>,
    pub postponed: Option<ObjectRef>,
    pub handled_irq: Option<IrqNumber>,
    pub spurious: usize,
    pub vm_fault_calls: usize,
}

impl MockKernel {
    pub fn new() -> Self {
        Self {
            now: 0,
            lookup_result: Ok(CapLocation::new(Capability::Null, SlotRef::NULL)),
            extras_result: Ok(ExtraCaps::EMPTY),
            invoke_outcome: InvocationOutcome::Completed,
            invoke_blocks: false,
            deliver_result: Ok(()),
            vm_resolves: true,
            queued: false,
            pending_irq: None,

            lookups: 0,
            last_cptr: None,
            extra_lookups: 0,
            invokes: 0,
            last_invoke: None,
            reply_transfers: 0,
            last_reply: None,
            endpoint_recvs: 0,
            last_endpoint_recv: None,
            signal_recvs: 0,
            last_signal_recv: None,
            deliveries: 0,
            delivered: None,
            schedules: 0,
            activations: 0,
            reschedules: 0,
            appended: None,
            postponed: None,
            handled_irq: None,
            spurious: 0,
            vm_fault_calls: 0,
        }
    }
}

impl Clock for MockKernel {
    fn now(&mut self) -> Ticks {
        self.now
    }
}

impl CapSpace for MockKernel {
    fn lookup_cap(&mut self, _thread: ObjectRef, cptr: CPtr) -> Result<CapLocation, LookupFault> {
        self.lookups += 1;
        self.last_cptr = Some(cptr);
        self.lookup_result
    }

    fn lookup_extra_caps(
        &mut self,
        _ctx: &ExecContext<'_>,
        _count: usize,
    ) -> Result<ExtraCaps, (CPtr, LookupFault)> {
        self.extra_lookups += 1;
        self.extras_result
    }
}

impl ObjectInvoker for MockKernel {
    fn decode_invoke(
        &mut self,
        ctx: &mut ExecContext<'_>,
        _dest: CapLocation,
        extras: &ExtraCaps,
        label: u64,
        length: usize,
        is_call: bool,
        is_blocking: bool,
    ) -> InvocationOutcome {
        self.invokes += 1;
        self.last_invoke = Some(InvokeRecord {
            label,
            length,
            is_call,
            is_blocking,
            extras_len: extras.len(),
        });
        // Mirror the state contract: a restartable operation sets
        // Restart, a blocking one sets its blocked state, a decode
        // error touches nothing.
        match self.invoke_outcome {
            InvocationOutcome::Completed => {
                ctx.thread.state = if self.invoke_blocks {
                    ThreadState::BlockedOnSend
                } else {
                    ThreadState::Restart
                };
            }
            InvocationOutcome::Preempted => {
                ctx.thread.state = ThreadState::Restart;
            }
            InvocationOutcome::Failed(_) => {}
        }
        self.invoke_outcome
    }
}

impl IpcTransfer for MockKernel {
    fn reply_transfer(&mut self, _ctx: &mut ExecContext<'_>, target: ObjectRef, grant: bool) {
        self.reply_transfers += 1;
        self.last_reply = Some((target, grant));
    }

    fn receive_endpoint(&mut self, _ctx: &mut ExecContext<'_>, ep: ObjectRef, is_blocking: bool) {
        self.endpoint_recvs += 1;
        self.last_endpoint_recv = Some((ep, is_blocking));
    }

    fn receive_signal(&mut self, _ctx: &mut ExecContext<'_>, ntfn: ObjectRef, is_blocking: bool) {
        self.signal_recvs += 1;
        self.last_signal_recv = Some((ntfn, is_blocking));
    }

    fn deliver_fault(
        &mut self,
        _ctx: &mut ExecContext<'_>,
        fault: Fault,
    ) -> Result<(), FaultDelivery> {
        self.deliveries += 1;
        self.delivered = Some(fault);
        self.deliver_result
    }
}

impl Scheduler for MockKernel {
    fn schedule(&mut self) {
        self.schedules += 1;
    }

    fn activate(&mut self, _ctx: &mut ExecContext<'_>) {
        self.activations += 1;
    }

    fn reschedule(&mut self) {
        self.reschedules += 1;
    }

    fn append_ready(&mut self, thread: ObjectRef) {
        self.appended = Some(thread);
    }

    fn postpone(&mut self, thread: ObjectRef) {
        self.postponed = Some(thread);
    }

    fn is_queued(&self, _thread: ObjectRef) -> bool {
        self.queued
    }
}

impl IrqControl for MockKernel {
    fn active_irq(&mut self) -> Option<IrqNumber> {
        self.pending_irq.take()
    }

    fn handle_irq(&mut self, irq: IrqNumber) {
        self.handled_irq = Some(irq);
    }

    fn spurious_irq(&mut self) {
        self.spurious += 1;
    }
}

impl VmHandler for MockKernel {
    fn resolve_vm_fault(
        &mut self,
        _ctx: &mut ExecContext<'_>,
        _addr: u64,
        _instruction: bool,
    ) -> Result<(), ()> {
        self.vm_fault_calls += 1;
        if self.vm_resolves {
            Ok(())
        } else {
            Err(())
        }
    }
}

/// Owns the state one [`ExecContext`] borrows.
///
/// The thread starts Running with a 100-tick budget over a 1000-tick
/// period and no IPC buffer mapped.
pub(crate) struct ExecFixture {
    pub tcb: Tcb,
    pub sched: SchedContext,
    pub regs: UserContext,
    pub buffer: IpcBuffer,
    pub with_buffer: bool,
    pub cur_time: Ticks,
    pub consumed: Ticks,
}

impl ExecFixture {
    pub const THREAD: ObjectRef = ObjectRef::from_index(1);
    pub const EP: ObjectRef = ObjectRef::from_index(2);
    pub const NTFN: ObjectRef = ObjectRef::from_index(3);

    pub fn new() -> Self {
        let mut tcb = Tcb::new();
        tcb.state = ThreadState::Running;
        tcb.set_name("fixture");
        Self {
            tcb,
            sched: SchedContext::new(100, 1_000),
            regs: UserContext::new(),
            buffer: IpcBuffer::new(),
            with_buffer: false,
            cur_time: 0,
            consumed: 0,
        }
    }

    pub fn ctx(&mut self) -> ExecContext<'_> {
        ExecContext {
            core: CoreId::new(0),
            current: Self::THREAD,
            thread: &mut self.tcb,
            sched: &mut self.sched,
            regs: &mut self.regs,
            ipc_buffer: if self.with_buffer {
                Some(&mut self.buffer)
            } else {
                None
            },
            cur_time: self.cur_time,
            consumed: self.consumed,
        }
    }
}

/// An endpoint capability to [`ExecFixture::EP`] with the given rights.
pub(crate) fn endpoint_cap(rights: CapRights) -> CapLocation {
    CapLocation::new(
        Capability::Endpoint {
            ep: ExecFixture::EP,
            badge: Badge::NONE,
            rights,
        },
        SlotRef::from_raw(0x100),
    )
}

/// A notification capability to [`ExecFixture::NTFN`], bound as given.
pub(crate) fn notification_cap(rights: CapRights, bound: ObjectRef) -> CapLocation {
    CapLocation::new(
        Capability::Notification {
            ntfn: ExecFixture::NTFN,
            badge: Badge::NONE,
            rights,
            bound,
        },
        SlotRef::from_raw(0x100),
    )
}

/// A granting reply capability for `target`.
pub(crate) fn reply_cap(target: ObjectRef, master: bool) -> CapLocation {
    CapLocation::new(
        Capability::Reply {
            target,
            master,
            can_grant: true,
        },
        SlotRef::from_raw(0x100),
    )
}
