//! K9 Kernel Entry Dispatch
//!
//! The code that runs on every trap into the kernel: system calls,
//! interrupts, VM faults, unknown syscalls, and user-level exceptions.
//! Each trap kind has one entry point in [`entry`]; all of them share the
//! same shape:
//!
//! ```text
//! budget gate -> dispatch or defer -> scheduler handoff
//! ```
//!
//! Time is billed to the current thread's scheduling context before any
//! user-visible work happens; a thread that has exhausted its budget gets
//! its trapped operation deferred (state `Restart`) rather than an error.
//! The capability-invocation pipeline and the reply/receive/yield control
//! flow sit behind the gate; every path ends in the unconditional
//! `schedule()` / `activate()` handoff.
//!
//! The dispatch core owns no data structures. Capability spaces, ready
//! queues, IPC rendezvous bodies, the interrupt controller, and VM fault
//! resolution are reached through the narrow traits in [`services`],
//! implemented by the surrounding kernel and mocked in tests. One trap
//! borrows the current thread's state exactly once, through
//! [`context::ExecContext`].

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod budget;
pub mod context;
pub mod entry;
pub mod fatal;
pub mod fault;
pub mod instrument;
pub mod logging;
pub mod services;

#[cfg(test)]
mod testing;

pub use context::{CoreId, ExecContext, UserContext};
pub use services::{InvocationOutcome, KernelServices};
