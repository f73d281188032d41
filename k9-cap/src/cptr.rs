//! Capability pointers
//!
//! A capability pointer (CPtr) is the user-visible name for a capability: an
//! opaque word the thread passes in its capability register on every
//! invocation. Resolution against the thread's capability space happens in
//! the lookup layer; the dispatch core only carries the value through and
//! reports it back on lookup faults.

use core::fmt;

/// A capability pointer: a thread-relative name for a capability slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct CPtr(u64);

impl CPtr {
    /// The null capability pointer.
    pub const NULL: Self = Self(0);

    /// Create from a raw register word.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw word, as reported in fault messages.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Check if this is the null pointer.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for CPtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CPtr({:#x})", self.0)
    }
}

impl fmt::Display for CPtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl fmt::LowerHex for CPtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl From<u64> for CPtr {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}
