//! Fatal kernel aborts
//!
//! A violated kernel invariant cannot be handled as an error value: the
//! state needed to recover is exactly the state found corrupt. Every such
//! violation funnels through [`fatal!`] into one abort point, which the
//! embedding kernel's panic handler maps to a halt.
//!
//! None of these paths are reachable through user input against a correct
//! kernel. Tests pin the abort behaviour itself with `#[should_panic]`;
//! reaching an abort from any other test is a defect.

/// Abort on a violated kernel invariant.
macro_rules! fatal {
    ($($arg:tt)*) => {
        $crate::fatal::abort(core::format_args!($($arg)*))
    };
}
pub(crate) use fatal;

/// The single abort point behind [`fatal!`].
#[cold]
#[track_caller]
pub(crate) fn abort(args: core::fmt::Arguments<'_>) -> ! {
    panic!("{} - this is a kernel bug", args)
}

/// Orderly halt, reached through the instrumentation Halt call.
#[cold]
pub fn halt() -> ! {
    log::error!("kernel halt requested");
    panic!("kernel halted")
}
