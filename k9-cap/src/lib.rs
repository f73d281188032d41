//! K9 Capability Model
//!
//! Capability and kernel-object types consumed by the K9 dispatch core.
//!
//! # Overview
//!
//! A **capability** is an unforgeable token naming a kernel object together
//! with the rights the holder has over it. Capabilities are the only way to
//! reach kernel resources; they are granted, never guessed.
//!
//! This crate deliberately covers only what kernel-entry dispatch reads and
//! writes: the capability value itself, the thread and scheduling-context
//! state the dispatcher mutates, and the fault records it creates. Storage,
//! derivation, and revocation belong to the surrounding kernel.
//!
//! # Core Types
//!
//! - [`Capability`]: closed sum over the object kinds a trap can touch
//! - [`CapLocation`]: a resolved capability plus the slot it occupies
//! - [`CapRights`]: access permissions (read, write, grant, grant-reply)
//! - [`Badge`]: sender-identification value carried by endpoint/notification caps
//! - [`CPtr`]: userspace capability pointer, opaque to this crate
//! - [`Tcb`] / [`ThreadState`]: thread control block and its state tag
//! - [`SchedContext`]: budget/period accounting for one thread
//! - [`Fault`] / [`LookupFault`]: anomaly records routed to fault handlers

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

mod badge;
mod capability;
mod cptr;
pub mod objects;
mod rights;
mod slot;

pub use badge::Badge;
pub use capability::{CapLocation, Capability};
pub use cptr::CPtr;
pub use objects::fault::{Fault, LookupFault};
pub use objects::sched::{MIN_BUDGET, MIN_PERIOD, SchedContext, Ticks};
pub use objects::tcb::{DEFAULT_PRIORITY, MAX_PRIORITY, Priority, Tcb, ThreadState};
pub use rights::CapRights;
pub use slot::{ObjectRef, SlotRef};
