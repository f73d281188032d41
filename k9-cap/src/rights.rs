//! Capability access rights
//!
//! Rights are orthogonal and can be independently attenuated but never
//! escalated. Interpretation is object-type specific:
//!
//! - **Read**: receive from an endpoint or notification
//! - **Write**: send to an endpoint or signal a notification
//! - **Grant**: transfer capabilities through IPC
//! - **GrantReply**: transfer reply capabilities only
//!
//! The dispatch core consults Read on every receive path and Grant when a
//! call creates a reply capability; the remaining checks happen inside the
//! transfer layer.

use core::fmt;

/// Access rights for capabilities, packed into one byte.
///
/// - Bit 0: Read
/// - Bit 1: Write
/// - Bit 2: Grant
/// - Bit 3: GrantReply
/// - Bits 4-7: reserved, zero
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
#[repr(transparent)]
pub struct CapRights(u8);

impl CapRights {
    /// No rights.
    pub const NONE: Self = Self(0);
    /// Read permission (receive for IPC objects).
    pub const READ: Self = Self(1 << 0);
    /// Write permission (send for IPC objects).
    pub const WRITE: Self = Self(1 << 1);
    /// Grant permission (capability transfer through IPC).
    pub const GRANT: Self = Self(1 << 2);
    /// Grant-reply permission (reply-capability transfer only).
    pub const GRANT_REPLY: Self = Self(1 << 3);
    /// All rights.
    pub const ALL: Self = Self(0x0F);
    /// Read and write.
    pub const RW: Self = Self(Self::READ.0 | Self::WRITE.0);

    /// Create rights from individual flags.
    #[inline]
    #[must_use]
    pub const fn new(read: bool, write: bool, grant: bool, grant_reply: bool) -> Self {
        let mut bits = 0u8;
        if read {
            bits |= Self::READ.0;
        }
        if write {
            bits |= Self::WRITE.0;
        }
        if grant {
            bits |= Self::GRANT.0;
        }
        if grant_reply {
            bits |= Self::GRANT_REPLY.0;
        }
        Self(bits)
    }

    /// Create rights from raw bits; reserved bits are masked off.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0x0F)
    }

    /// Get the raw bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Check for the Read right.
    #[inline]
    #[must_use]
    pub const fn has_read(self) -> bool {
        (self.0 & Self::READ.0) != 0
    }

    /// Check for the Write right.
    #[inline]
    #[must_use]
    pub const fn has_write(self) -> bool {
        (self.0 & Self::WRITE.0) != 0
    }

    /// Check for the Grant right.
    #[inline]
    #[must_use]
    pub const fn has_grant(self) -> bool {
        (self.0 & Self::GRANT.0) != 0
    }

    /// Check for the GrantReply right.
    #[inline]
    #[must_use]
    pub const fn has_grant_reply(self) -> bool {
        (self.0 & Self::GRANT_REPLY.0) != 0
    }

    /// Check if all rights in `other` are present.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Intersect rights, as minting a derived capability does.
    #[inline]
    #[must_use]
    pub const fn intersect(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }
}

impl fmt::Debug for CapRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CapRights({self})")
    }
}

impl fmt::Display for CapRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}",
            if self.has_read() { "R" } else { "-" },
            if self.has_write() { "W" } else { "-" },
            if self.has_grant() { "G" } else { "-" },
            if self.has_grant_reply() { "g" } else { "-" },
        )
    }
}
