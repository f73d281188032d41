//! Syscall error codes
//!
//! A syscall error is a well-formed invocation the kernel refuses: bad
//! arguments, a mistyped capability, an operation the object does not
//! support. It is returned synchronously in the caller's reply registers
//! (call form only) and is distinct from a fault, which goes to the fault
//! handler instead.
//!
//! The reply encoding is: message-info label = [`ErrorCode`], message
//! registers = the detail words of the variant.

/// Wire-level error codes, used as the label of kernel error replies.
#[repr(u64)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    /// The object does not support the requested operation.
    IllegalOperation = 1,
    /// A message argument is invalid; detail is the argument index.
    InvalidArgument = 2,
    /// A transferred capability is the wrong type; detail is its index.
    InvalidCapability = 3,
    /// A numeric argument is outside its allowed range; detail is min, max.
    RangeError = 4,
    /// The message declared fewer registers than the operation needs.
    TruncatedMessage = 5,
    /// A capability argument failed to resolve.
    FailedLookup = 6,
    /// The operation needs more untyped memory than is available.
    NotEnoughMemory = 7,
}

impl ErrorCode {
    /// Try to convert from a reply label.
    pub fn from_number(num: u64) -> Option<Self> {
        match num {
            1 => Some(Self::IllegalOperation),
            2 => Some(Self::InvalidArgument),
            3 => Some(Self::InvalidCapability),
            4 => Some(Self::RangeError),
            5 => Some(Self::TruncatedMessage),
            6 => Some(Self::FailedLookup),
            7 => Some(Self::NotEnoughMemory),
            _ => None,
        }
    }

    /// Get the code name for logging.
    pub const fn name(self) -> &'static str {
        match self {
            Self::IllegalOperation => "IllegalOperation",
            Self::InvalidArgument => "InvalidArgument",
            Self::InvalidCapability => "InvalidCapability",
            Self::RangeError => "RangeError",
            Self::TruncatedMessage => "TruncatedMessage",
            Self::FailedLookup => "FailedLookup",
            Self::NotEnoughMemory => "NotEnoughMemory",
        }
    }
}

/// A syscall error with its detail payload.
///
/// Produced by decode/invocation and by the instrumentation syscalls;
/// consumed by the kernel error-reply writer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use = "syscall errors must be replied or dropped explicitly"]
pub enum SyscallError {
    /// The object does not support the requested operation.
    IllegalOperation,
    /// Argument `index` is invalid.
    InvalidArgument {
        /// Zero-based index of the offending argument.
        index: u64,
    },
    /// Transferred capability `index` is unsuitable.
    InvalidCapability {
        /// Zero-based index into the extra capabilities.
        index: u64,
    },
    /// A numeric argument fell outside `min..=max`.
    RangeError {
        /// Smallest accepted value.
        min: u64,
        /// Largest accepted value.
        max: u64,
    },
    /// The message is shorter than the operation requires.
    TruncatedMessage,
    /// A capability argument failed to resolve.
    FailedLookup {
        /// Whether the failure occurred in the receive phase.
        in_receive_phase: bool,
    },
    /// Not enough untyped memory; detail is the bytes available.
    NotEnoughMemory {
        /// Bytes actually available.
        available: u64,
    },
}

impl SyscallError {
    /// The wire-level code for the reply label.
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::IllegalOperation => ErrorCode::IllegalOperation,
            Self::InvalidArgument { .. } => ErrorCode::InvalidArgument,
            Self::InvalidCapability { .. } => ErrorCode::InvalidCapability,
            Self::RangeError { .. } => ErrorCode::RangeError,
            Self::TruncatedMessage => ErrorCode::TruncatedMessage,
            Self::FailedLookup { .. } => ErrorCode::FailedLookup,
            Self::NotEnoughMemory { .. } => ErrorCode::NotEnoughMemory,
        }
    }

    /// The code name for logging.
    pub const fn name(&self) -> &'static str {
        self.code().name()
    }

    /// Detail words for the reply message registers.
    ///
    /// Returns the words and how many of them are meaningful.
    pub const fn detail_words(&self) -> ([u64; 2], u64) {
        match *self {
            Self::IllegalOperation | Self::TruncatedMessage => ([0; 2], 0),
            Self::InvalidArgument { index } => ([index, 0], 1),
            Self::InvalidCapability { index } => ([index, 0], 1),
            Self::RangeError { min, max } => ([min, max], 2),
            Self::FailedLookup { in_receive_phase } => ([in_receive_phase as u64, 0], 1),
            Self::NotEnoughMemory { available } => ([available, 0], 1),
        }
    }
}
