//! Capability values
//!
//! A capability is a slot-resident token naming a kernel object together
//! with the access it confers. The dispatch core matches exhaustively on
//! the variants below; invocation semantics for each object live behind
//! the invoker seam.

use crate::{Badge, CapRights, ObjectRef, SlotRef};

/// A capability value as stored in a capability slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    /// Empty slot.
    Null,
    /// Send/receive rights to an endpoint object.
    Endpoint {
        /// The endpoint object.
        ep: ObjectRef,
        /// Badge delivered to the receiver on send.
        badge: Badge,
        /// Access rights conferred by this capability.
        rights: CapRights,
    },
    /// Signal/wait rights to a notification object.
    Notification {
        /// The notification object.
        ntfn: ObjectRef,
        /// Badge OR-ed into the notification word on signal.
        badge: Badge,
        /// Access rights conferred by this capability.
        rights: CapRights,
        /// Thread the notification is bound to, `ObjectRef::NULL` if
        /// unbound. Only the bound thread may wait on a bound
        /// notification.
        bound: ObjectRef,
    },
    /// Single-use right to reply to a caller blocked on this thread.
    Reply {
        /// The thread awaiting the reply.
        target: ObjectRef,
        /// Master reply capabilities are minted at thread creation and
        /// never consumed; only non-master copies are invoked.
        master: bool,
        /// Whether the reply may carry capabilities.
        can_grant: bool,
    },
    /// Control over a thread object.
    Thread(ObjectRef),
    /// Control over a scheduling context.
    SchedContext(ObjectRef),
    /// A mappable frame of physical memory.
    Frame(ObjectRef),
}

impl Capability {
    /// Check if this is the null capability.
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Get the numeric type tag, as reported by capability identification.
    #[must_use]
    pub const fn tag(&self) -> u64 {
        match self {
            Self::Null => 0,
            Self::Endpoint { .. } => 1,
            Self::Notification { .. } => 2,
            Self::Reply { .. } => 3,
            Self::Thread(_) => 4,
            Self::SchedContext(_) => 5,
            Self::Frame(_) => 6,
        }
    }

    /// Get the capability type name for diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Endpoint { .. } => "Endpoint",
            Self::Notification { .. } => "Notification",
            Self::Reply { .. } => "Reply",
            Self::Thread(_) => "Thread",
            Self::SchedContext(_) => "SchedContext",
            Self::Frame(_) => "Frame",
        }
    }

    /// Get the referenced object, if any.
    #[must_use]
    pub const fn object(&self) -> Option<ObjectRef> {
        match self {
            Self::Null => None,
            Self::Endpoint { ep, .. } => Some(*ep),
            Self::Notification { ntfn, .. } => Some(*ntfn),
            Self::Reply { target, .. } => Some(*target),
            Self::Thread(obj) | Self::SchedContext(obj) | Self::Frame(obj) => Some(*obj),
        }
    }
}

impl Default for Capability {
    fn default() -> Self {
        Self::Null
    }
}

/// A capability together with the slot it was looked up from.
///
/// Slot identity matters to the dispatch core in two places: clearing a
/// consumed reply capability, and deleting a stale caller capability found
/// in a receive slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CapLocation {
    /// The capability value.
    pub cap: Capability,
    /// The slot it resides in.
    pub slot: SlotRef,
}

impl CapLocation {
    /// Create a location from a capability and its slot.
    #[inline]
    #[must_use]
    pub const fn new(cap: Capability, slot: SlotRef) -> Self {
        Self { cap, slot }
    }
}
