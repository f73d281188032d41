//! Badge values for sender identification
//!
//! A badge is an immutable value attached to an endpoint or notification
//! capability when it is minted. The receiver of a message sees the badge
//! of the capability it arrived through, which identifies the sender
//! without a separate authentication step. Notification badges from
//! concurrent signals are OR'd together.

use core::fmt;

/// A badge value carried by an endpoint or notification capability.
///
/// Zero ([`Badge::NONE`]) means the capability is unbadged, the default
/// for original (non-minted) capabilities.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Badge(u64);

impl Badge {
    /// No badge (unbadged capability).
    pub const NONE: Self = Self(0);

    /// Create a new badge with the given value.
    #[inline]
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the raw badge value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Check if this capability is unbadged.
    #[inline]
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Check if this capability carries a badge.
    #[inline]
    #[must_use]
    pub const fn is_some(self) -> bool {
        self.0 != 0
    }

    /// Combine badges by OR, as notification signal aggregation does.
    #[inline]
    #[must_use]
    pub const fn combine(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl fmt::Debug for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "Badge::NONE")
        } else {
            write!(f, "Badge({:#x})", self.0)
        }
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "none")
        } else {
            write!(f, "{:#x}", self.0)
        }
    }
}

impl From<u64> for Badge {
    #[inline]
    fn from(value: u64) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_none() {
        assert!(Badge::NONE.is_none());
        assert_eq!(Badge::NONE.value(), 0);
    }

    #[test]
    fn test_badge_combine() {
        let combined = Badge::new(0x01).combine(Badge::new(0x02));
        assert_eq!(combined.value(), 0x03);
        assert!(combined.is_some());
    }
}
