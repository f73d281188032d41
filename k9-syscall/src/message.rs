//! Message info word
//!
//! Every IPC operation carries a message-info word in r1 describing the
//! message: an operation label, the number of message registers used, how
//! many extra capabilities accompany the message, and (on delivery) how
//! many of those were unwrapped into badges.
//!
//! # Layout
//!
//! | Bits  | Field          | Width |
//! |-------|----------------|-------|
//! | 0-6   | length         | 7     |
//! | 7-8   | extra caps     | 2     |
//! | 9-11  | caps unwrapped | 3     |
//! | 12-63 | label          | 52    |

/// Number of message registers transferred without an IPC buffer.
pub const MSG_REGISTERS: usize = 4;

const LENGTH_BITS: u64 = 7;
const EXTRA_CAPS_BITS: u64 = 2;
const UNWRAPPED_BITS: u64 = 3;

const LENGTH_MASK: u64 = (1 << LENGTH_BITS) - 1;
const EXTRA_CAPS_SHIFT: u64 = LENGTH_BITS;
const EXTRA_CAPS_MASK: u64 = (1 << EXTRA_CAPS_BITS) - 1;
const UNWRAPPED_SHIFT: u64 = LENGTH_BITS + EXTRA_CAPS_BITS;
const UNWRAPPED_MASK: u64 = (1 << UNWRAPPED_BITS) - 1;
const LABEL_SHIFT: u64 = LENGTH_BITS + EXTRA_CAPS_BITS + UNWRAPPED_BITS;

// The three low fields must leave 52 bits for the label.
const _: () = assert!(LABEL_SHIFT == 12);

/// Packed message-info word.
///
/// The kernel consumes this on invocation entry and produces it when
/// writing kernel replies. Field setters mask their argument; callers that
/// care about overflow validate lengths before packing.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
#[repr(transparent)]
pub struct MessageInfo(u64);

impl MessageInfo {
    /// Pack a message-info word from its fields.
    #[inline]
    #[must_use]
    pub const fn new(label: u64, length: u64, extra_caps: u64, unwrapped: u64) -> Self {
        Self(
            (label << LABEL_SHIFT)
                | ((unwrapped & UNWRAPPED_MASK) << UNWRAPPED_SHIFT)
                | ((extra_caps & EXTRA_CAPS_MASK) << EXTRA_CAPS_SHIFT)
                | (length & LENGTH_MASK),
        )
    }

    /// Reinterpret a raw register value.
    #[inline]
    #[must_use]
    pub const fn from_word(word: u64) -> Self {
        Self(word)
    }

    /// Get the raw word for a register write.
    #[inline]
    #[must_use]
    pub const fn to_word(self) -> u64 {
        self.0
    }

    /// Operation label.
    #[inline]
    #[must_use]
    pub const fn label(self) -> u64 {
        self.0 >> LABEL_SHIFT
    }

    /// Number of message registers the sender declared.
    #[inline]
    #[must_use]
    pub const fn length(self) -> u64 {
        self.0 & LENGTH_MASK
    }

    /// Number of extra capabilities accompanying the message.
    #[inline]
    #[must_use]
    pub const fn extra_caps(self) -> u64 {
        (self.0 >> EXTRA_CAPS_SHIFT) & EXTRA_CAPS_MASK
    }

    /// Number of capabilities unwrapped into badges on delivery.
    #[inline]
    #[must_use]
    pub const fn caps_unwrapped(self) -> u64 {
        (self.0 >> UNWRAPPED_SHIFT) & UNWRAPPED_MASK
    }

    /// Copy with the declared length replaced.
    ///
    /// Used by the invocation pipeline to clamp oversized lengths when the
    /// sender has no IPC buffer mapped.
    #[inline]
    #[must_use]
    pub const fn with_length(self, length: u64) -> Self {
        Self((self.0 & !LENGTH_MASK) | (length & LENGTH_MASK))
    }
}

impl core::fmt::Debug for MessageInfo {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MessageInfo")
            .field("label", &self.label())
            .field("length", &self.length())
            .field("extra_caps", &self.extra_caps())
            .field("caps_unwrapped", &self.caps_unwrapped())
            .finish()
    }
}
