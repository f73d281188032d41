//! Trap entry points
//!
//! One function per hardware trap kind. The architecture stub decodes the
//! trap frame, builds the [`ExecContext`](crate::context::ExecContext),
//! and calls exactly one of these; each runs to completion and ends in
//! the unconditional scheduler handoff, budget-denied paths included.
//!
//! ```text
//! syscall        gate -> invocation pipeline | reply/recv/yield
//! interrupt      (ungated) deliver or spurious hook
//! unknown        intercept -> gate -> UnknownSyscall fault
//! user fault     gate -> UserException fault
//! vm fault       gate -> resolve in kernel | VmFault fault
//! ```

pub mod control;
pub mod invoke;

use k9_cap::Fault;
use k9_syscall::Syscall;

use crate::budget;
use crate::context::ExecContext;
use crate::fault;
use crate::instrument::{self, EventKind};
use crate::services::{InvocationOutcome, KernelServices};

/// Handle an interrupt trap.
///
/// The one ungated path: interrupt work is not billed to whichever
/// thread happened to be running.
pub fn handle_interrupt_entry<S: KernelServices>(ctx: &mut ExecContext<'_>, services: &mut S) {
    match services.active_irq() {
        Some(irq) => {
            instrument::note_entry(EventKind::Interrupt, u64::from(irq.line()));
            services.handle_irq(irq);
        }
        None => {
            log::warn!("spurious interrupt on core {}", ctx.core);
            services.spurious_irq();
        }
    }
    schedule_handoff(ctx, services);
}

/// Handle a trap whose syscall number is outside the ABI table.
///
/// Instrumentation sees the word first, before the entry timestamp is
/// recorded, so debug calls are never billed. Anything not intercepted
/// raises an `UnknownSyscall` fault under the budget gate.
pub fn handle_unknown_syscall<S: KernelServices>(
    ctx: &mut ExecContext<'_>,
    services: &mut S,
    word: u64,
) {
    if instrument::intercept(ctx, services, word) {
        schedule_handoff(ctx, services);
        return;
    }
    instrument::note_entry(EventKind::UnknownSyscall, word);
    budget::update_timestamp(ctx, services);
    if budget::check_budget_restart(ctx, services) {
        fault::route_fault(ctx, services, Fault::UnknownSyscall { word });
    }
    schedule_handoff(ctx, services);
}

/// Handle a user-level exception, reported with two words of detail.
pub fn handle_user_fault_entry<S: KernelServices>(
    ctx: &mut ExecContext<'_>,
    services: &mut S,
    number: u64,
    code: u64,
) {
    instrument::note_entry(EventKind::UserFault, number);
    budget::update_timestamp(ctx, services);
    if budget::check_budget_restart(ctx, services) {
        fault::route_fault(ctx, services, Fault::UserException { number, code });
    }
    schedule_handoff(ctx, services);
}

/// Handle a VM fault.
///
/// In-kernel resolution runs first; the thread's handler is involved
/// only when that fails.
pub fn handle_vm_fault_entry<S: KernelServices>(
    ctx: &mut ExecContext<'_>,
    services: &mut S,
    addr: u64,
    fsr: u64,
    instruction: bool,
) {
    instrument::note_entry(EventKind::VmFault, addr);
    budget::update_timestamp(ctx, services);
    if budget::check_budget_restart(ctx, services)
        && services.resolve_vm_fault(ctx, addr, instruction).is_err()
    {
        fault::route_fault(
            ctx,
            services,
            Fault::VmFault {
                addr,
                fsr,
                instruction,
            },
        );
    }
    schedule_handoff(ctx, services);
}

/// Handle a syscall trap.
///
/// `word` is the raw syscall number from the trap frame. Numbers outside
/// the [`Syscall`] table take the unknown-syscall path, which keeps the
/// dispatch below exhaustive over a closed enum with no fatal default.
pub fn handle_syscall_entry<S: KernelServices>(
    ctx: &mut ExecContext<'_>,
    services: &mut S,
    word: u64,
) {
    let Some(syscall) = Syscall::from_number(word) else {
        handle_unknown_syscall(ctx, services, word);
        return;
    };
    instrument::note_entry(EventKind::Syscall, word);
    budget::update_timestamp(ctx, services);
    if budget::check_budget_restart(ctx, services) {
        dispatch_syscall(ctx, services, syscall);
    }
    schedule_handoff(ctx, services);
}

fn dispatch_syscall<S: KernelServices>(
    ctx: &mut ExecContext<'_>,
    services: &mut S,
    syscall: Syscall,
) {
    log::trace!("{} from {}", syscall.name(), ctx.thread.name_str());
    match syscall {
        Syscall::Send | Syscall::NBSend | Syscall::Call => {
            let outcome =
                invoke::handle_invocation(ctx, services, syscall.is_call(), syscall.is_blocking());
            match outcome {
                InvocationOutcome::Preempted => preemption_point(services),
                // Completed and Failed are fully resolved inside the
                // pipeline, replies included.
                InvocationOutcome::Completed | InvocationOutcome::Failed(_) => {}
            }
        }
        Syscall::Recv => control::handle_recv(ctx, services, true),
        Syscall::NBRecv => control::handle_recv(ctx, services, false),
        Syscall::Reply => control::handle_reply(ctx, services),
        Syscall::ReplyRecv => {
            control::handle_reply(ctx, services);
            control::handle_recv(ctx, services, true);
        }
        Syscall::Yield => control::handle_yield(ctx, services),
    }
}

/// Service one pending interrupt at an invocation preemption point.
///
/// Runs strictly before the return to user level, so a long invocation
/// can never hold off a pending interrupt past one of its steps.
fn preemption_point<S: KernelServices>(services: &mut S) {
    if let Some(irq) = services.active_irq() {
        log::trace!("irq {} serviced at preemption point", irq);
        services.handle_irq(irq);
    }
}

/// The unconditional end of every trap: pick and install the next thread.
fn schedule_handoff<S: KernelServices>(ctx: &mut ExecContext<'_>, services: &mut S) {
    services.schedule();
    services.activate(ctx);
}
