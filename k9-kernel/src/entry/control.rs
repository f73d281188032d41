//! Reply, receive and yield
//!
//! The three syscall forms that move the current thread around IPC
//! rendezvous points without invoking an object. Reply consumes the
//! capability in the thread's caller slot; receive validates the waited
//! capability and enters the rendezvous; yield forfeits the rest of the
//! current budget.

use k9_cap::{CPtr, Capability, Fault, LookupFault};

use crate::context::ExecContext;
use crate::fatal::fatal;
use crate::fault;
use crate::services::KernelServices;

/// Reply to the thread whose call populated the caller slot.
///
/// An empty slot is a harmless race (the caller was deleted or timed
/// out) and is ignored. Anything other than a plain reply capability in
/// the slot means kernel state is corrupt.
pub fn handle_reply<S: KernelServices>(ctx: &mut ExecContext<'_>, services: &mut S) {
    match ctx.thread.caller {
        Capability::Reply { master: true, .. } => {
            fatal!(
                "master reply cap in caller slot of {}",
                ctx.thread.name_str()
            );
        }
        Capability::Reply { target, .. } if target == ctx.current => {
            fatal!("{} holds a reply cap to itself", ctx.thread.name_str());
        }
        Capability::Reply {
            target, can_grant, ..
        } => {
            services.reply_transfer(ctx, target, can_grant);
            ctx.thread.caller = Capability::Null;
        }
        Capability::Null => {
            log::warn!("{} replied with an empty caller slot", ctx.thread.name_str());
        }
        ref other => {
            fatal!(
                "{} cap in caller slot of {}",
                other.name(),
                ctx.thread.name_str()
            );
        }
    }
}

/// Wait on the endpoint or notification named by the capability register.
///
/// Unlike the send-phase lookup, a receive-phase failure faults even
/// for a poll: there is no outcome register to report through, and a
/// thread waiting on garbage would otherwise hang silently.
pub fn handle_recv<S: KernelServices>(
    ctx: &mut ExecContext<'_>,
    services: &mut S,
    is_blocking: bool,
) {
    let cptr = CPtr::from_raw(ctx.regs.cap_reg());
    let loc = match services.lookup_cap(ctx.current, cptr) {
        Ok(loc) => loc,
        Err(lookup) => {
            fault::route_fault(
                ctx,
                services,
                Fault::CapFault {
                    cptr,
                    in_receive_phase: true,
                    lookup,
                },
            );
            return;
        }
    };
    match loc.cap {
        Capability::Endpoint { ep, rights, .. } if rights.has_read() => {
            delete_caller_cap(ctx);
            services.receive_endpoint(ctx, ep, is_blocking);
        }
        Capability::Notification {
            ntfn,
            rights,
            bound,
            ..
        } if rights.has_read() && (bound.is_null() || bound == ctx.current) => {
            services.receive_signal(ctx, ntfn, is_blocking);
        }
        _ => {
            // Wrong type, no read right, or a notification bound to
            // another thread. All surface as a missing capability.
            fault::route_fault(
                ctx,
                services,
                Fault::CapFault {
                    cptr,
                    in_receive_phase: true,
                    lookup: LookupFault::MissingCapability { bits_left: 0 },
                },
            );
        }
    }
}

/// Step aside voluntarily in favour of same-priority peers.
///
/// A context that is still ready is recharged and re-appended at the
/// back of its priority's queue; this is a fairness yield, not a block.
/// An exhausted context is parked until its next replenishment.
pub fn handle_yield<S: KernelServices>(ctx: &mut ExecContext<'_>, services: &mut S) {
    if services.is_queued(ctx.current) {
        fatal!("{} yielded from a ready queue", ctx.thread.name_str());
    }
    log::trace!(
        "{} yields with {} ticks left",
        ctx.thread.name_str(),
        ctx.sched.remaining
    );
    if ctx.sched.is_ready(ctx.cur_time) {
        ctx.sched.replenish(ctx.cur_time);
        services.append_ready(ctx.current);
    } else {
        services.postpone(ctx.current);
    }
    ctx.consumed = 0;
    services.reschedule();
}

/// Drop any pending caller capability before entering a receive.
///
/// A thread that starts waiting can no longer service the call that
/// produced the capability, so the caller must not stay blocked on it.
fn delete_caller_cap(ctx: &mut ExecContext<'_>) {
    if !ctx.thread.caller.is_null() {
        log::trace!(
            "dropping caller cap of {} before receive",
            ctx.thread.name_str()
        );
        ctx.thread.caller = Capability::Null;
    }
}
