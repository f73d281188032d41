//! Fault records
//!
//! A fault is a kernel-detected anomaly delivered to the faulting thread's
//! handler endpoint instead of being returned synchronously. Fault records
//! are created at the point of detection, routed exactly once, and never
//! retained afterwards.

use crate::CPtr;

/// Why a capability lookup failed.
///
/// Carried inside a capability fault so the handler can tell a missing
/// slot from a malformed address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LookupFault {
    /// The root capability was not a valid capability space.
    InvalidRoot,
    /// Resolution ran out of capability slots.
    MissingCapability {
        /// Address bits left unresolved.
        bits_left: u64,
    },
    /// The address was shorter or longer than the space it named.
    DepthMismatch {
        /// Address bits left unresolved.
        bits_left: u64,
        /// Bits the node at the mismatch would have resolved.
        bits_found: u64,
    },
    /// A guard along the resolution path did not match.
    GuardMismatch {
        /// Address bits left unresolved.
        bits_left: u64,
        /// The guard value that was found.
        guard: u64,
        /// Size of that guard in bits.
        guard_size: u64,
    },
}

impl LookupFault {
    /// Get the fault kind name for diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::InvalidRoot => "InvalidRoot",
            Self::MissingCapability { .. } => "MissingCapability",
            Self::DepthMismatch { .. } => "DepthMismatch",
            Self::GuardMismatch { .. } => "GuardMismatch",
        }
    }
}

/// A fault awaiting delivery to a thread's fault handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fault {
    /// A capability lookup failed during an invocation or receive.
    CapFault {
        /// The capability pointer that failed to resolve.
        cptr: CPtr,
        /// True if the failure occurred while setting up a receive.
        in_receive_phase: bool,
        /// Why the lookup failed.
        lookup: LookupFault,
    },
    /// A virtual-memory fault the kernel could not resolve.
    VmFault {
        /// Faulting virtual address.
        addr: u64,
        /// Architecture fault status word.
        fsr: u64,
        /// True for an instruction fetch, false for a data access.
        instruction: bool,
    },
    /// The thread trapped with a syscall number outside the ABI.
    UnknownSyscall {
        /// The raw syscall word.
        word: u64,
    },
    /// A user-level exception (undefined instruction, alignment, ...).
    UserException {
        /// Architecture exception number.
        number: u64,
        /// Architecture exception code.
        code: u64,
    },
}

impl Fault {
    /// Get the message label under which this fault is delivered.
    #[must_use]
    pub const fn label(&self) -> u64 {
        match self {
            Self::CapFault { .. } => 1,
            Self::VmFault { .. } => 2,
            Self::UnknownSyscall { .. } => 3,
            Self::UserException { .. } => 4,
        }
    }

    /// Get the fault kind name for diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CapFault { .. } => "CapFault",
            Self::VmFault { .. } => "VmFault",
            Self::UnknownSyscall { .. } => "UnknownSyscall",
            Self::UserException { .. } => "UserException",
        }
    }
}
