//! Kernel object state
//!
//! The object types the dispatch core manipulates directly: threads, their
//! scheduling contexts, and the fault values routed to handlers. Everything
//! else (endpoints, notifications, frames) is reached only through
//! capability invocation and stays behind the collaborator seams.

pub mod fault;
pub mod sched;
pub mod tcb;

pub use fault::{Fault, LookupFault};
pub use sched::{SchedContext, Ticks, MIN_BUDGET, MIN_PERIOD};
pub use tcb::{Priority, Tcb, ThreadState, DEFAULT_PRIORITY, MAX_PRIORITY};
