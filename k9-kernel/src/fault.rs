//! Fault routing
//!
//! Turns a detected anomaly into a delivery to the faulting thread's
//! handler. The record is parked in the thread's pending-fault slot for
//! the transfer layer to marshal; it lives there for one delivery and
//! never longer. A thread whose fault cannot be delivered goes Inactive,
//! so a double fault never loops.

use k9_cap::{Fault, ThreadState};

use crate::context::ExecContext;
use crate::services::KernelServices;

/// Route `fault` to the current thread's fault handler.
///
/// The faulting thread never sees a return value from the offending
/// operation: it either blocks on its handler or, when delivery fails,
/// is made Inactive with the failure logged.
pub fn route_fault<S: KernelServices>(ctx: &mut ExecContext<'_>, services: &mut S, fault: Fault) {
    log::debug!(
        "{} on {}, routing to handler",
        fault.name(),
        ctx.thread.name_str()
    );
    ctx.thread.pending_fault = Some(fault);
    if let Err(reason) = services.deliver_fault(ctx, fault) {
        log::error!(
            "dropping {} for {}: {:?}",
            fault.name(),
            ctx.thread.name_str(),
            reason
        );
        ctx.thread.pending_fault = None;
        ctx.thread.state = ThreadState::Inactive;
    }
}
