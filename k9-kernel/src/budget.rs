//! Budget gate
//!
//! Every gated trap entry bills the time since the previous kernel entry
//! to the current thread's scheduling context before doing anything user
//! visible. A thread whose budget is exhausted has the trapped operation
//! deferred: its scheduling context is replenished or postponed, a
//! reschedule is requested, and the thread re-executes the trap once it
//! runs again. Exhaustion is never an error delivered to the thread.
//!
//! The interrupt entry is the one path with no gate: interrupt work is
//! not billed to the interrupted thread.

use k9_cap::ThreadState;

use crate::context::ExecContext;
use crate::logging;
use crate::services::{Clock, KernelServices};

/// Record the trap entry time and accumulate consumed ticks.
///
/// Called exactly once per gated trap, before the budget check.
/// Instrumentation intercepts skip it so debug work is never billed.
pub fn update_timestamp<C: Clock>(ctx: &mut ExecContext<'_>, clock: &mut C) {
    let now = clock.now();
    ctx.consumed += now.saturating_sub(ctx.cur_time);
    ctx.cur_time = now;
    logging::stamp_time(now);
}

/// Charge accumulated time to the scheduling context; true iff budget
/// remains for this entry.
///
/// On exhaustion the context is replenished and re-queued if its period
/// has elapsed, postponed to the release queue otherwise, and a
/// reschedule is requested. Thread state is the caller's concern.
pub fn check_budget<S: KernelServices>(ctx: &mut ExecContext<'_>, services: &mut S) -> bool {
    if ctx.sched.budget_sufficient(ctx.consumed) {
        ctx.sched.consume(ctx.consumed);
        ctx.consumed = 0;
        return true;
    }
    charge_and_defer(ctx, services);
    false
}

/// Budget check for trap entries that must re-execute when denied.
///
/// Sets the thread to `Restart` on exhaustion so the same trap runs
/// again once the context is replenished.
pub fn check_budget_restart<S: KernelServices>(
    ctx: &mut ExecContext<'_>,
    services: &mut S,
) -> bool {
    let granted = check_budget(ctx, services);
    if !granted && ctx.thread.state.is_runnable() {
        ctx.thread.state = ThreadState::Restart;
    }
    granted
}

fn charge_and_defer<S: KernelServices>(ctx: &mut ExecContext<'_>, services: &mut S) {
    log::trace!(
        "budget exhausted for {} ({} ticks over)",
        ctx.thread.name_str(),
        ctx.consumed - ctx.sched.remaining
    );
    ctx.sched.consume(ctx.consumed);
    ctx.consumed = 0;
    if ctx.sched.is_ready(ctx.cur_time) {
        ctx.sched.replenish(ctx.cur_time);
        services.append_ready(ctx.current);
    } else {
        services.postpone(ctx.current);
    }
    services.reschedule();
}
