//! Object and slot references
//!
//! The dispatch core never follows pointers into kernel object storage; it
//! names objects by table index ([`ObjectRef`]) and capability slots by an
//! opaque identity ([`SlotRef`]). The surrounding kernel owns the tables
//! these indices resolve against.

use core::fmt;

/// Object reference - kernel-internal index to the actual object.
///
/// An index into the kernel's object table rather than a raw pointer:
/// bounds-checkable, revocation-safe (clearing the entry invalidates every
/// holder), and compact enough to embed in capability values.
///
/// Index 0 is reserved; [`ObjectRef::NULL`] means no object.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ObjectRef(u32);

impl ObjectRef {
    /// Null reference (no object).
    pub const NULL: Self = Self(0);

    /// Create an object reference from a raw index.
    ///
    /// Valid object indices start at 1; index 0 is [`Self::NULL`].
    #[inline]
    #[must_use]
    pub const fn from_index(index: u32) -> Self {
        Self(index)
    }

    /// Get the raw index value.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }

    /// Check if this is a null reference.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Check if this is a valid (non-null) reference.
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "ObjectRef::NULL")
        } else {
            write!(f, "ObjectRef({})", self.0)
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "null")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

/// Identity of the capability slot a lookup resolved through.
///
/// Carried alongside a resolved [`Capability`](crate::Capability) so that
/// later surgery (deleting a consumed reply cap, unbadging on revoke) can
/// find the slot again without re-walking the capability space. The value
/// is meaningful only to the kernel that produced it.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
#[repr(transparent)]
pub struct SlotRef(u64);

impl SlotRef {
    /// Identity of no slot.
    pub const NULL: Self = Self(0);

    /// Wrap a raw slot identity.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw identity value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Check if this names no slot.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for SlotRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "SlotRef::NULL")
        } else {
            write!(f, "SlotRef({:#x})", self.0)
        }
    }
}
