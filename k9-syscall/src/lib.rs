//! K9 Syscall ABI
//!
//! Shared definitions for kernel-userspace communication.
//! This crate is `no_std` and has no dependencies, allowing it to be used
//! in both the kernel and userspace.
//!
//! # Modules
//!
//! - [`numbers`] - Syscall numbers and dispatch attributes
//! - [`message`] - The packed message-info word
//! - [`error`] - Error codes returned in kernel error replies
//! - [`ipc_buffer`] - IPC buffer for arguments beyond the message registers

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod error;
pub mod ipc_buffer;
pub mod message;
pub mod numbers;

// Re-export commonly used items
pub use error::{ErrorCode, SyscallError};
pub use ipc_buffer::{IPC_BUFFER_SIZE, IpcBuffer, MAX_EXTRA_CAPS, MSG_MAX_LENGTH};
pub use message::{MSG_REGISTERS, MessageInfo};
pub use numbers::{DebugCall, Syscall};
